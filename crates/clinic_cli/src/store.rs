use std::fs;
use std::path::Path;

use clinic_core::Clinic;
use tracing::{info, warn};

use super::config::DataPaths;
use super::error::StoreError;
use super::journal::{read_journal, state_sha256, write_journal, JournalHeader};
use super::tables::{
    decode_patient_rows, decode_queue_rows, encode_patient_rows, encode_queue_rows,
    read_table_bytes,
};

/// What happened to the persisted undo journal during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalStatus {
    Missing,
    Restored,
    /// The tables changed since the journal was written; history dropped.
    DiscardedStale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub patients: usize,
    pub appointments: usize,
    pub undo_depth: usize,
    pub journal: JournalStatus,
    /// Journal entries that no longer applied to the loaded tables.
    pub undo_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub patients: usize,
    pub appointments: usize,
    pub undo_depth: usize,
    pub state_sha256: String,
}

/// Reads and writes the clinic state under one data directory.
#[derive(Debug, Clone)]
pub struct ClinicStore {
    paths: DataPaths,
}

impl ClinicStore {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Hydrate `clinic` from disk. Missing files mean an empty clinic.
    pub fn load(&self, clinic: &mut Clinic) -> Result<LoadReport, StoreError> {
        let patients_csv = read_table_bytes(&self.paths.patients)?;
        let appointments_csv = read_table_bytes(&self.paths.appointments)?;
        let patient_rows = decode_patient_rows(&patients_csv)?;
        let queue_rows = decode_queue_rows(&appointments_csv)?;
        clinic.load_all(patient_rows, queue_rows)?;

        let current = state_sha256(&patients_csv, &appointments_csv);
        let mut undo_dropped = 0;
        let journal = match read_journal(&self.paths.undo_journal)? {
            None => JournalStatus::Missing,
            Some(journal) if journal.header.state_sha256 == current => {
                clinic.raise_id_high_water(journal.header.id_high_water);
                undo_dropped = clinic.restore_undo_log(journal.actions);
                JournalStatus::Restored
            }
            Some(journal) => {
                clinic.raise_id_high_water(journal.header.id_high_water);
                warn!(
                    path = %self.paths.undo_journal.display(),
                    entries = journal.actions.len(),
                    "undo journal does not match the saved tables; discarding undo history"
                );
                JournalStatus::DiscardedStale
            }
        };

        let report = LoadReport {
            patients: clinic.patients().len(),
            appointments: clinic.queue().len(),
            undo_depth: clinic.undo_depth(),
            journal,
            undo_dropped,
        };
        info!(
            dir = %self.paths.dir.display(),
            patients = report.patients,
            appointments = report.appointments,
            undo_depth = report.undo_depth,
            "loaded data directory"
        );
        Ok(report)
    }

    /// Write both tables and the undo journal bound to them.
    pub fn save(&self, clinic: &Clinic) -> Result<SaveReport, StoreError> {
        let rows = clinic.save_all();
        let patients_csv = encode_patient_rows(&rows.patients)?;
        let appointments_csv = encode_queue_rows(&rows.appointments)?;
        let digest = state_sha256(&patients_csv, &appointments_csv);

        ensure_dir(&self.paths.dir)?;
        write_file(&self.paths.patients, &patients_csv)?;
        write_file(&self.paths.appointments, &appointments_csv)?;
        write_journal(
            &self.paths.undo_journal,
            &JournalHeader::for_state(digest.clone(), clinic.id_high_water()),
            clinic.undo_actions(),
        )?;

        let report = SaveReport {
            patients: rows.patients.len(),
            appointments: rows.appointments.len(),
            undo_depth: clinic.undo_depth(),
            state_sha256: digest,
        };
        info!(
            dir = %self.paths.dir.display(),
            patients = report.patients,
            appointments = report.appointments,
            "saved data directory"
        );
        Ok(report)
    }

    /// Create the data directory and header-only tables when missing.
    /// Returns the labels of the files that were created.
    pub fn ensure_data_files(&self) -> Result<Vec<String>, StoreError> {
        ensure_dir(&self.paths.dir)?;
        let mut created = Vec::new();
        if !self.paths.patients.exists() {
            write_file(&self.paths.patients, &encode_patient_rows(&[])?)?;
            created.push(self.paths.patients.display().to_string());
        }
        if !self.paths.appointments.exists() {
            write_file(&self.paths.appointments, &encode_queue_rows(&[])?)?;
            created.push(self.paths.appointments.display().to_string());
        }
        Ok(created)
    }
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .map_err(|err| StoreError::Io(format!("create {}: {}", dir.display(), err)))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    fs::write(path, bytes).map_err(|err| StoreError::Io(format!("write {}: {}", path.display(), err)))
}
