use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::StoreError;

pub const CONFIG_FILE_NAME: &str = "clinic.toml";
pub const DATA_DIR_ENV: &str = "CLINIC_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PATIENTS_FILE: &str = "patients.csv";
const DEFAULT_APPOINTMENTS_FILE: &str = "appointments.csv";
const DEFAULT_UNDO_JOURNAL: &str = "undo.jsonl";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Resolved on-disk locations of the clinic state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub dir: PathBuf,
    pub patients: PathBuf,
    pub appointments: PathBuf,
    pub undo_journal: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            patients: dir.join(DEFAULT_PATIENTS_FILE),
            appointments: dir.join(DEFAULT_APPOINTMENTS_FILE),
            undo_journal: dir.join(DEFAULT_UNDO_JOURNAL),
            dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    pub paths: DataPaths,
    pub log_filter: String,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClinicTomlConfig {
    data: Option<ClinicTomlDataSection>,
    logging: Option<ClinicTomlLoggingSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClinicTomlDataSection {
    dir: Option<PathBuf>,
    patients_file: Option<String>,
    appointments_file: Option<String>,
    undo_journal: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClinicTomlLoggingSection {
    filter: Option<String>,
}

/// Resolve configuration for this process, consulting `CLINIC_DATA_DIR`.
pub fn resolve_config(
    config_path: Option<&Path>,
    data_dir_override: Option<&Path>,
) -> Result<ClinicConfig, StoreError> {
    let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    resolve_config_with_env(config_path, data_dir_override, env_dir)
}

/// Data directory precedence: explicit override, then the environment, then
/// `[data] dir` from the config file, then `data`. Relative directories from
/// the config file resolve against the file's own directory.
pub fn resolve_config_with_env(
    config_path: Option<&Path>,
    data_dir_override: Option<&Path>,
    env_dir: Option<PathBuf>,
) -> Result<ClinicConfig, StoreError> {
    let (path, explicit) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILE_NAME), false),
    };

    let (parsed, source) = if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .map_err(|err| StoreError::Config(format!("read {}: {}", path.display(), err)))?;
        let parsed: ClinicTomlConfig = toml::from_str(&raw)
            .map_err(|err| StoreError::Config(format!("parse {}: {}", path.display(), err)))?;
        (parsed, Some(path))
    } else if explicit {
        return Err(StoreError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    } else {
        (ClinicTomlConfig::default(), None)
    };

    let data = parsed.data.unwrap_or_default();
    let config_dir = source
        .as_deref()
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty());

    let dir = if let Some(dir) = data_dir_override {
        dir.to_path_buf()
    } else if let Some(dir) = env_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        dir
    } else {
        let configured = data.dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        match config_dir {
            Some(base) if configured.is_relative() => base.join(configured),
            _ => configured,
        }
    };

    let paths = DataPaths {
        patients: dir.join(file_name(data.patients_file, DEFAULT_PATIENTS_FILE)),
        appointments: dir.join(file_name(data.appointments_file, DEFAULT_APPOINTMENTS_FILE)),
        undo_journal: dir.join(file_name(data.undo_journal, DEFAULT_UNDO_JOURNAL)),
        dir,
    };

    let log_filter = parsed
        .logging
        .and_then(|logging| logging.filter)
        .map(|filter| filter.trim().to_string())
        .filter(|filter| !filter.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    Ok(ClinicConfig {
        paths,
        log_filter,
        source,
    })
}

fn file_name(configured: Option<String>, default: &str) -> String {
    configured
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default.to_string())
}
