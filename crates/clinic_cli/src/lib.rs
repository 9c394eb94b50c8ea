//! Persistence, configuration and console front end for `clinic_core`.

pub mod config;
pub mod display;
pub mod error;
pub mod journal;
pub mod logging;
pub mod project_init;
pub mod shell;
pub mod status_summary;
pub mod store;
pub mod tables;

pub use config::{
    resolve_config, resolve_config_with_env, ClinicConfig, DataPaths, CONFIG_FILE_NAME,
    DATA_DIR_ENV,
};
pub use error::StoreError;
pub use journal::{read_journal, state_sha256, write_journal, Journal, JournalHeader};
pub use logging::init_logging;
pub use project_init::{init_project, InitProjectInput, InitProjectOutput};
pub use shell::Shell;
pub use status_summary::{summarize_clinic, ClinicStatus, NextAppointmentSummary};
pub use store::{ClinicStore, JournalStatus, LoadReport, SaveReport};
