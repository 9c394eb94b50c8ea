use std::fs;
use std::path::Path;

use clinic_core::{PatientRow, QueueRow};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::StoreError;

pub const PATIENT_HEADERS: [&str; 6] = [
    "patient_id",
    "name",
    "age",
    "disease",
    "doctor",
    "registered_at",
];
pub const QUEUE_HEADERS: [&str; 1] = ["patient_id"];

/// Raw bytes of a table file; empty when the file does not exist yet.
pub fn read_table_bytes(path: &Path) -> Result<Vec<u8>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    fs::read(path).map_err(|err| StoreError::Io(format!("read {}: {}", path.display(), err)))
}

pub fn decode_patient_rows(bytes: &[u8]) -> Result<Vec<PatientRow>, StoreError> {
    decode_rows(bytes, &PATIENT_HEADERS)
}

pub fn decode_queue_rows(bytes: &[u8]) -> Result<Vec<QueueRow>, StoreError> {
    decode_rows(bytes, &QUEUE_HEADERS)
}

pub fn encode_patient_rows(rows: &[PatientRow]) -> Result<Vec<u8>, StoreError> {
    encode_rows(rows, &PATIENT_HEADERS)
}

pub fn encode_queue_rows(rows: &[QueueRow]) -> Result<Vec<u8>, StoreError> {
    encode_rows(rows, &QUEUE_HEADERS)
}

fn decode_rows<T: DeserializeOwned>(bytes: &[u8], headers: &[&str]) -> Result<Vec<T>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let found = reader
        .headers()
        .map_err(|err| StoreError::Csv(err.to_string()))?;
    for header in headers {
        if !found.iter().any(|column| column == *header) {
            return Err(StoreError::Csv(format!("missing column: {}", header)));
        }
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record.map_err(|err| StoreError::Csv(err.to_string()))?);
    }
    Ok(rows)
}

/// Header row first, always, so an empty table still carries its columns.
fn encode_rows<T: Serialize>(rows: &[T], headers: &[&str]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(headers)
        .map_err(|err| StoreError::Csv(err.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| StoreError::Csv(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Csv(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, name: &str) -> PatientRow {
        PatientRow {
            patient_id: id,
            name: name.to_string(),
            age: 30,
            disease: "flu".to_string(),
            doctor: "Lee".to_string(),
            registered_at: "2026-01-02 03:04:05".to_string(),
        }
    }

    #[test]
    fn empty_tables_still_have_headers() {
        let bytes = encode_patient_rows(&[]).expect("encode");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            "patient_id,name,age,disease,doctor,registered_at\n"
        );
        let queue = encode_queue_rows(&[]).expect("encode");
        assert_eq!(String::from_utf8(queue).expect("utf8"), "patient_id\n");
    }

    #[test]
    fn patient_rows_are_written_in_header_order() {
        let bytes = encode_patient_rows(&[row(1, "Ada, Jr.")]).expect("encode");
        let text = String::from_utf8(bytes.clone()).expect("utf8");
        assert!(text.ends_with("1,\"Ada, Jr.\",30,flu,Lee,2026-01-02 03:04:05\n"));
        assert_eq!(decode_patient_rows(&bytes).expect("decode"), vec![row(1, "Ada, Jr.")]);
    }

    #[test]
    fn reads_header_only_and_blank_files_as_empty() {
        assert!(decode_patient_rows(b"").expect("blank").is_empty());
        assert!(decode_queue_rows(b"patient_id\n").expect("header only").is_empty());
        assert_eq!(
            decode_queue_rows(b"patient_id\n3\n1\n3\n").expect("queue"),
            vec![
                QueueRow { patient_id: 3 },
                QueueRow { patient_id: 1 },
                QueueRow { patient_id: 3 }
            ]
        );
    }

    #[test]
    fn malformed_numbers_and_missing_columns_are_errors() {
        let bad_age = b"patient_id,name,age,disease,doctor,registered_at\n1,Ada,old,flu,Lee,2026-01-02 03:04:05\n";
        assert!(matches!(decode_patient_rows(bad_age), Err(StoreError::Csv(_))));

        let missing = b"patient_id,name\n1,Ada\n";
        let err = decode_patient_rows(missing).expect_err("missing columns");
        assert!(err.to_string().contains("missing column: age"));
    }
}
