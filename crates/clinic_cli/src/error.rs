use std::fmt;

use clinic_core::ClinicError;

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Csv(String),
    Json(String),
    Config(String),
    JournalSchemaMismatch { expected: String, found: String },
    Clinic(ClinicError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "io error: {}", err),
            StoreError::Csv(err) => write!(f, "csv error: {}", err),
            StoreError::Json(err) => write!(f, "json error: {}", err),
            StoreError::Config(err) => write!(f, "config error: {}", err),
            StoreError::JournalSchemaMismatch { expected, found } => write!(
                f,
                "undo journal schema mismatch (expected {}, found {})",
                expected, found
            ),
            StoreError::Clinic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Clinic(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClinicError> for StoreError {
    fn from(err: ClinicError) -> Self {
        StoreError::Clinic(err)
    }
}
