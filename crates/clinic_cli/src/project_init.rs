use std::fs;
use std::path::{Path, PathBuf};

use super::config::{DataPaths, CONFIG_FILE_NAME};
use super::error::StoreError;
use super::store::ClinicStore;

const CLINIC_TOML_TEMPLATE: &str = r#"[data]
dir = "data"
patients_file = "patients.csv"
appointments_file = "appointments.csv"
undo_journal = "undo.jsonl"

[logging]
# Overridden by RUST_LOG when set.
filter = "warn"
"#;

const DATA_GITIGNORE_TEMPLATE: &str = "*\n!.gitignore\n";

#[derive(Debug, Clone)]
pub struct InitProjectInput {
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct InitProjectOutput {
    pub root: PathBuf,
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Scaffold `clinic.toml`, the data directory and header-only tables under
/// `root`. Existing files are never overwritten.
pub fn init_project(input: InitProjectInput) -> Result<InitProjectOutput, StoreError> {
    let root = input.root;
    if !root.exists() {
        fs::create_dir_all(&root).map_err(|err| StoreError::Io(err.to_string()))?;
    }

    let mut created = Vec::new();
    let mut existing = Vec::new();

    ensure_file(
        &root.join(CONFIG_FILE_NAME),
        CONFIG_FILE_NAME,
        CLINIC_TOML_TEMPLATE,
        &mut created,
        &mut existing,
    )?;
    ensure_dir(&root.join("data"), "data", &mut created, &mut existing)?;
    ensure_file(
        &root.join("data").join(".gitignore"),
        "data/.gitignore",
        DATA_GITIGNORE_TEMPLATE,
        &mut created,
        &mut existing,
    )?;

    let paths = DataPaths::in_dir(root.join("data"));
    let tables = [
        (paths.patients.clone(), "data/patients.csv"),
        (paths.appointments.clone(), "data/appointments.csv"),
    ];
    let made = ClinicStore::new(paths).ensure_data_files()?;
    for (path, label) in tables {
        if made.contains(&path.display().to_string()) {
            created.push(label.to_string());
        } else {
            existing.push(label.to_string());
        }
    }

    Ok(InitProjectOutput {
        root,
        created,
        existing,
    })
}

fn ensure_dir(
    path: &Path,
    label: &str,
    created: &mut Vec<String>,
    existing: &mut Vec<String>,
) -> Result<(), StoreError> {
    if path.exists() {
        existing.push(label.to_string());
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|err| StoreError::Io(err.to_string()))?;
    created.push(label.to_string());
    Ok(())
}

fn ensure_file(
    path: &Path,
    label: &str,
    contents: &str,
    created: &mut Vec<String>,
    existing: &mut Vec<String>,
) -> Result<(), StoreError> {
    if path.exists() {
        existing.push(label.to_string());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))?;
    }
    fs::write(path, contents).map_err(|err| StoreError::Io(err.to_string()))?;
    created.push(label.to_string());
    Ok(())
}
