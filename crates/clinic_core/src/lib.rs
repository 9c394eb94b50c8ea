//! In-memory core of the patient management tool: an ordered record store,
//! a FIFO appointment queue, a doctor-keyed search index and an undo log,
//! coordinated by [`Clinic`].

pub mod billing;
mod clinic;
mod clock;
mod doctor_index;
mod error;
mod patient;
mod queue;
mod records;
pub mod rows;
mod undo;

pub use billing::{compute_bill, parse_amount, BillInput};
pub use clinic::{Clinic, ServedAppointment};
pub use clock::{Clock, FixedClock, SystemClock};
pub use doctor_index::DoctorIndex;
pub use error::{ClinicError, ClinicResult, ErrorKind};
pub use patient::{
    format_timestamp, parse_age, parse_patient_id, parse_timestamp, NewPatient, Patient,
    PatientChanges, PatientId, TIMESTAMP_FORMAT,
};
pub use queue::AppointmentQueue;
pub use records::RecordStore;
pub use rows::{PatientRow, QueueRow, StateRows};
pub use undo::{UndoAction, UndoLog, UndoOutcome};
