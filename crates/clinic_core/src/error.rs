use std::fmt;

use crate::patient::PatientId;

/// Result type for clinic operations
pub type ClinicResult<T> = Result<T, ClinicError>;

/// Coarse classification callers use to pick a message style or exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClinicError {
    EmptyField(&'static str),
    NonPositiveAge(i64),
    MalformedNumber { field: &'static str, value: String },
    MalformedTimestamp(String),
    DuplicateId(PatientId),
    PatientNotFound(PatientId),
    QueueEmpty,
    NothingToUndo,
}

impl ClinicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClinicError::EmptyField(_)
            | ClinicError::NonPositiveAge(_)
            | ClinicError::MalformedNumber { .. }
            | ClinicError::MalformedTimestamp(_)
            | ClinicError::DuplicateId(_) => ErrorKind::Validation,
            ClinicError::PatientNotFound(_) | ClinicError::QueueEmpty | ClinicError::NothingToUndo => {
                ErrorKind::NotFound
            }
        }
    }
}

impl fmt::Display for ClinicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicError::EmptyField(field) => write!(f, "{} is required", field),
            ClinicError::NonPositiveAge(age) => {
                write!(f, "age must be a positive number (got {})", age)
            }
            ClinicError::MalformedNumber { field, value } => {
                write!(f, "{} is not a valid number: {:?}", field, value)
            }
            ClinicError::MalformedTimestamp(value) => write!(
                f,
                "registered_at must look like YYYY-MM-DD HH:MM:SS (got {:?})",
                value
            ),
            ClinicError::DuplicateId(id) => write!(f, "patient id {} already exists", id),
            ClinicError::PatientNotFound(id) => write!(f, "patient id {} not found", id),
            ClinicError::QueueEmpty => write!(f, "no pending appointments"),
            ClinicError::NothingToUndo => write!(f, "nothing to undo"),
        }
    }
}

impl std::error::Error for ClinicError {}
