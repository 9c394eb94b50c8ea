use std::fs;
use std::io::Write;
use std::path::Path;

use clinic_core::{PatientId, UndoAction};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::StoreError;

pub const JOURNAL_SCHEMA_ID: &str = "clinic-undo-journal/1";

/// First line of the undo journal. `state_sha256` binds the journal to the
/// table files it was written next to. `id_high_water` outlives the tables:
/// ids spent by deleted or undone registrations stay spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalHeader {
    pub schema_id: String,
    pub state_sha256: String,
    #[serde(default)]
    pub id_high_water: PatientId,
}

impl JournalHeader {
    pub fn for_state(state_sha256: impl Into<String>, id_high_water: PatientId) -> Self {
        Self {
            schema_id: JOURNAL_SCHEMA_ID.to_string(),
            state_sha256: state_sha256.into(),
            id_high_water,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    pub header: JournalHeader,
    pub actions: Vec<UndoAction>,
}

/// SHA-256 over both table payloads, length-prefixed so the boundary between
/// them is unambiguous.
pub fn state_sha256(patients_csv: &[u8], appointments_csv: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for payload in [patients_csv, appointments_csv] {
        hasher.update((payload.len() as u64).to_be_bytes());
        hasher.update(payload);
    }
    format!("{:x}", hasher.finalize())
}

pub fn write_journal(
    path: &Path,
    header: &JournalHeader,
    actions: &[UndoAction],
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))?;
        }
    }

    let mut out = Vec::new();
    let header_line =
        serde_json::to_string(header).map_err(|err| StoreError::Json(err.to_string()))?;
    writeln!(out, "{}", header_line).map_err(|err| StoreError::Io(err.to_string()))?;
    for action in actions {
        let line =
            serde_json::to_string(action).map_err(|err| StoreError::Json(err.to_string()))?;
        writeln!(out, "{}", line).map_err(|err| StoreError::Io(err.to_string()))?;
    }
    fs::write(path, out)
        .map_err(|err| StoreError::Io(format!("write {}: {}", path.display(), err)))
}

/// `Ok(None)` when no journal has been written yet.
pub fn read_journal(path: &Path) -> Result<Option<Journal>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .map_err(|err| StoreError::Io(format!("read {}: {}", path.display(), err)))?;
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    let header: JournalHeader =
        serde_json::from_str(first).map_err(|err| StoreError::Json(err.to_string()))?;
    if header.schema_id != JOURNAL_SCHEMA_ID {
        return Err(StoreError::JournalSchemaMismatch {
            expected: JOURNAL_SCHEMA_ID.to_string(),
            found: header.schema_id,
        });
    }

    let mut actions = Vec::new();
    for line in lines {
        let action: UndoAction =
            serde_json::from_str(line).map_err(|err| StoreError::Json(err.to_string()))?;
        actions.push(action);
    }
    Ok(Some(Journal { header, actions }))
}
