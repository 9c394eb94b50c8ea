use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, ClinicResult};
use crate::patient::{
    format_timestamp, parse_timestamp, required, validate_age, Patient, PatientId,
};

/// One row of the persisted patient table. Column names match the on-disk
/// header `patient_id,name,age,disease,doctor,registered_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRow {
    pub patient_id: PatientId,
    pub name: String,
    pub age: i64,
    pub disease: String,
    pub doctor: String,
    pub registered_at: String,
}

impl From<&Patient> for PatientRow {
    fn from(patient: &Patient) -> Self {
        Self {
            patient_id: patient.id,
            name: patient.name.clone(),
            age: i64::from(patient.age),
            disease: patient.disease.clone(),
            doctor: patient.doctor.clone(),
            registered_at: format_timestamp(&patient.registered_at),
        }
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = ClinicError;

    fn try_from(row: PatientRow) -> ClinicResult<Self> {
        Ok(Patient {
            id: row.patient_id,
            name: required("name", &row.name)?,
            age: validate_age(row.age)?,
            disease: required("disease", &row.disease)?,
            doctor: required("doctor", &row.doctor)?,
            registered_at: parse_timestamp(&row.registered_at)?,
        })
    }
}

/// One row of the persisted appointment table (header `patient_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRow {
    pub patient_id: PatientId,
}

/// Both row sets, in record order and FIFO order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateRows {
    pub patients: Vec<PatientRow>,
    pub appointments: Vec<QueueRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> PatientRow {
        PatientRow {
            patient_id: 12,
            name: "Ada".to_string(),
            age: 30,
            disease: "flu".to_string(),
            doctor: "Lee".to_string(),
            registered_at: "2025-12-31 23:59:59".to_string(),
        }
    }

    #[test]
    fn row_converts_to_patient_and_back() {
        let patient = Patient::try_from(row()).expect("valid row");
        assert_eq!(patient.id, 12);
        assert_eq!(patient.registered_at_display(), "2025-12-31 23:59:59");
        assert_eq!(PatientRow::from(&patient), row());
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let mut bad_time = row();
        bad_time.registered_at = "yesterday".to_string();
        assert_eq!(
            Patient::try_from(bad_time),
            Err(ClinicError::MalformedTimestamp("yesterday".to_string()))
        );

        let mut bad_age = row();
        bad_age.age = -1;
        assert_eq!(Patient::try_from(bad_age), Err(ClinicError::NonPositiveAge(-1)));

        let mut blank = row();
        blank.doctor = "  ".to_string();
        assert_eq!(Patient::try_from(blank), Err(ClinicError::EmptyField("doctor")));
    }
}
