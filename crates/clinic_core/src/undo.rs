use serde::{Deserialize, Serialize};

use crate::patient::{Patient, PatientId};

/// Inverse of one mutation, recorded when the mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UndoAction {
    /// Registration; undo deletes the patient again.
    Add { record: Patient },
    /// Deletion; undo re-inserts the snapshot at `position`.
    Delete { record: Patient, position: usize },
    /// Update; `record` is the state before the update.
    Update { record: Patient },
    /// Scheduling; undo drops the last queued occurrence of the id.
    AppointmentAdd { patient_id: PatientId },
}

impl UndoAction {
    pub fn tag(&self) -> &'static str {
        match self {
            UndoAction::Add { .. } => "add",
            UndoAction::Delete { .. } => "delete",
            UndoAction::Update { .. } => "update",
            UndoAction::AppointmentAdd { .. } => "appointment_add",
        }
    }

    pub fn patient_id(&self) -> PatientId {
        match self {
            UndoAction::Add { record }
            | UndoAction::Delete { record, .. }
            | UndoAction::Update { record } => record.id,
            UndoAction::AppointmentAdd { patient_id } => *patient_id,
        }
    }
}

/// What `Clinic::undo` reverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    PatientRemoved(Patient),
    PatientRestored(Patient),
    UpdateReverted(Patient),
    /// `removed` is false when the appointment had already been served.
    AppointmentRemoved { patient_id: PatientId, removed: bool },
}

impl UndoOutcome {
    pub fn describe(&self) -> String {
        match self {
            UndoOutcome::PatientRemoved(patient) => {
                format!("removed patient ID {}", patient.id)
            }
            UndoOutcome::PatientRestored(patient) => {
                format!("restored patient ID {}", patient.id)
            }
            UndoOutcome::UpdateReverted(patient) => {
                format!("reverted update for patient ID {}", patient.id)
            }
            UndoOutcome::AppointmentRemoved {
                patient_id,
                removed: true,
            } => format!("removed appointment for patient ID {}", patient_id),
            UndoOutcome::AppointmentRemoved {
                patient_id,
                removed: false,
            } => format!(
                "appointment for patient ID {} was no longer queued",
                patient_id
            ),
        }
    }
}

/// LIFO stack of [`UndoAction`]s, bounded only by memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<UndoAction> {
        self.actions.pop()
    }

    pub fn peek(&self) -> Option<&UndoAction> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Entries bottom-to-top (oldest first).
    pub fn actions(&self) -> &[UndoAction] {
        &self.actions
    }

    pub fn replace(&mut self, actions: Vec<UndoAction>) {
        self.actions = actions;
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
