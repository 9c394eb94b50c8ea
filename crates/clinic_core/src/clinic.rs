use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::doctor_index::DoctorIndex;
use crate::error::{ClinicError, ClinicResult};
use crate::patient::{NewPatient, Patient, PatientChanges, PatientId};
use crate::queue::AppointmentQueue;
use crate::records::RecordStore;
use crate::rows::{PatientRow, QueueRow, StateRows};
use crate::undo::{UndoAction, UndoLog, UndoOutcome};

/// Head of the appointment queue together with the patient it refers to.
/// `patient` is `None` when the queued id belongs to a deleted patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedAppointment {
    pub patient_id: PatientId,
    pub patient: Option<Patient>,
}

/// The session: record store, doctor index, appointment queue and undo log,
/// mutated only through the methods below.
///
/// Every mutation validates and looks up everything it needs before touching
/// the first structure, then pushes exactly one [`UndoAction`] (`serve` pushes
/// none). That keeps the record store and the doctor index consistent after
/// each call, including failed ones.
#[derive(Debug)]
pub struct Clinic {
    records: RecordStore,
    index: DoctorIndex,
    queue: AppointmentQueue,
    undo: UndoLog,
    /// Highest id ever handed out or seen on load. Deleted ids stay spent.
    id_high_water: PatientId,
    clock: Box<dyn Clock>,
}

impl Default for Clinic {
    fn default() -> Self {
        Self::new()
    }
}

impl Clinic {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            records: RecordStore::new(),
            index: DoctorIndex::new(),
            queue: AppointmentQueue::new(),
            undo: UndoLog::new(),
            id_high_water: 0,
            clock: Box::new(clock),
        }
    }

    pub fn register(&mut self, input: NewPatient) -> ClinicResult<Patient> {
        let id = self
            .id_high_water
            .max(self.records.max_id())
            .checked_add(1)
            .ok_or_else(|| ClinicError::MalformedNumber {
                field: "patient_id",
                value: format!("{} + 1", PatientId::MAX),
            })?;
        let patient = input.into_patient(id, self.clock.now())?;
        self.records.insert(patient.clone())?;
        self.id_high_water = id;
        self.index.insert(&patient.doctor, patient.clone());
        self.undo.push(UndoAction::Add {
            record: patient.clone(),
        });
        debug!(patient_id = id, doctor = %patient.doctor, "registered patient");
        Ok(patient)
    }

    pub fn schedule(&mut self, id: PatientId) -> ClinicResult<Patient> {
        let patient = self
            .records
            .find_by_id(id)
            .cloned()
            .ok_or(ClinicError::PatientNotFound(id))?;
        self.queue.enqueue(id);
        self.undo.push(UndoAction::AppointmentAdd { patient_id: id });
        debug!(patient_id = id, queued = self.queue.len(), "scheduled appointment");
        Ok(patient)
    }

    /// Dequeue the next appointment. Serving is not undoable.
    pub fn serve(&mut self) -> ClinicResult<ServedAppointment> {
        let patient_id = self.queue.dequeue().ok_or(ClinicError::QueueEmpty)?;
        let served = self.appointment_for(patient_id);
        debug!(patient_id, remaining = self.queue.len(), "served appointment");
        Ok(served)
    }

    /// Head of the queue without removing it.
    pub fn next_appointment(&self) -> ClinicResult<ServedAppointment> {
        let patient_id = self.queue.peek().ok_or(ClinicError::QueueEmpty)?;
        Ok(self.appointment_for(patient_id))
    }

    pub fn update(&mut self, id: PatientId, changes: &PatientChanges) -> ClinicResult<Patient> {
        let before = self
            .records
            .find_by_id(id)
            .cloned()
            .ok_or(ClinicError::PatientNotFound(id))?;
        let updated = self.records.update_by_id(id, changes)?.clone();
        if updated.doctor != before.doctor {
            self.index.rebuild_from_records(self.records.all_ordered());
        } else {
            self.index.refresh(&updated);
        }
        debug!(
            patient_id = id,
            doctor_changed = updated.doctor != before.doctor,
            "updated patient"
        );
        self.undo.push(UndoAction::Update { record: before });
        Ok(updated)
    }

    /// Remove a patient. Queued appointments for the id are left in place.
    pub fn delete(&mut self, id: PatientId) -> ClinicResult<Patient> {
        let position = self
            .records
            .position_of(id)
            .ok_or(ClinicError::PatientNotFound(id))?;
        let removed = self.records.delete_by_id(id)?;
        self.index.remove(&removed.doctor, id);
        if self.queue.contains(id) {
            warn!(patient_id = id, "deleted patient still has queued appointments");
        }
        self.undo.push(UndoAction::Delete {
            record: removed.clone(),
            position,
        });
        debug!(patient_id = id, position, "deleted patient");
        Ok(removed)
    }

    /// Revert the most recent undoable mutation. The entry is only consumed
    /// once its inverse has been applied.
    pub fn undo(&mut self) -> ClinicResult<UndoOutcome> {
        let action = self.undo.peek().cloned().ok_or(ClinicError::NothingToUndo)?;
        let tag = action.tag();
        let outcome = self.apply_inverse(action)?;
        self.undo.pop();
        debug!(action = tag, remaining = self.undo.len(), "undo applied");
        Ok(outcome)
    }

    fn apply_inverse(&mut self, action: UndoAction) -> ClinicResult<UndoOutcome> {
        match action {
            UndoAction::Add { record } => {
                let removed = self.records.delete_by_id(record.id)?;
                self.index.remove(&removed.doctor, removed.id);
                Ok(UndoOutcome::PatientRemoved(removed))
            }
            UndoAction::Delete { record, position } => {
                let position = position.min(self.records.len());
                let rank = self.records.all_ordered()[..position]
                    .iter()
                    .filter(|other| other.doctor == record.doctor)
                    .count();
                self.records.insert_at(position, record.clone())?;
                self.index.insert_at(&record.doctor, rank, record.clone());
                Ok(UndoOutcome::PatientRestored(record))
            }
            UndoAction::Update { record } => {
                let restored = self.records.overwrite(&record)?.clone();
                self.index.rebuild_from_records(self.records.all_ordered());
                Ok(UndoOutcome::UpdateReverted(restored))
            }
            UndoAction::AppointmentAdd { patient_id } => {
                let removed = self.queue.remove_last_occurrence(patient_id);
                if !removed {
                    warn!(patient_id, "undo: appointment was no longer queued");
                }
                Ok(UndoOutcome::AppointmentRemoved {
                    patient_id,
                    removed,
                })
            }
        }
    }

    fn appointment_for(&self, patient_id: PatientId) -> ServedAppointment {
        let patient = self.records.find_by_id(patient_id).cloned();
        if patient.is_none() {
            warn!(patient_id, "queued appointment refers to a deleted patient");
        }
        ServedAppointment {
            patient_id,
            patient,
        }
    }

    pub fn patients(&self) -> &[Patient] {
        self.records.all_ordered()
    }

    pub fn find(&self, id: PatientId) -> Option<&Patient> {
        self.records.find_by_id(id)
    }

    pub fn search_by_doctor(&self, doctor: &str) -> Vec<Patient> {
        self.index.search(doctor.trim())
    }

    pub fn doctors(&self) -> Vec<(String, usize)> {
        self.index.doctors()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn doctor_index(&self) -> &DoctorIndex {
        &self.index
    }

    pub fn queue(&self) -> &AppointmentQueue {
        &self.queue
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Undo history bottom-to-top, for persistence.
    pub fn undo_actions(&self) -> &[UndoAction] {
        self.undo.actions()
    }

    /// Reinstate a persisted undo history. Entries are replayed newest first
    /// against a scratch copy of the state; the first one whose inverse cannot
    /// apply is dropped together with every older entry. Returns how many
    /// entries were dropped.
    pub fn restore_undo_log(&mut self, actions: Vec<UndoAction>) -> usize {
        for action in &actions {
            self.raise_id_high_water(action.patient_id());
        }

        let mut scratch = Clinic {
            records: self.records.clone(),
            index: self.index.clone(),
            queue: self.queue.clone(),
            undo: UndoLog::new(),
            id_high_water: self.id_high_water,
            clock: Box::new(SystemClock),
        };
        let mut dropped = 0;
        for (position, action) in actions.iter().enumerate().rev() {
            if let Err(err) = scratch.apply_inverse(action.clone()) {
                dropped = position + 1;
                warn!(
                    action = action.tag(),
                    patient_id = action.patient_id(),
                    error = %err,
                    dropped,
                    "undo history entry does not match the loaded state; dropping it and older entries"
                );
                break;
            }
        }

        self.undo
            .replace(actions.into_iter().skip(dropped).collect());
        dropped
    }

    /// Highest patient id ever assigned or loaded.
    pub fn id_high_water(&self) -> PatientId {
        self.id_high_water
    }

    /// Mark every id up to `id` as spent so `register` never hands it out.
    pub fn raise_id_high_water(&mut self, id: PatientId) {
        self.id_high_water = self.id_high_water.max(id);
    }

    /// Replace all state with persisted rows. Every row is validated before
    /// anything is replaced; the doctor index is rebuilt from the records and
    /// the undo history is cleared. The id high-water mark restarts from the
    /// loaded records and queued ids.
    pub fn load_all(
        &mut self,
        patient_rows: Vec<PatientRow>,
        queue_rows: Vec<QueueRow>,
    ) -> ClinicResult<()> {
        let mut records = RecordStore::new();
        for row in patient_rows {
            records.insert(Patient::try_from(row)?)?;
        }
        let mut index = DoctorIndex::new();
        index.rebuild_from_records(records.all_ordered());
        let mut queue = AppointmentQueue::new();
        queue.load_from_ordered_list(queue_rows.into_iter().map(|row| row.patient_id));

        let dangling = queue
            .to_ordered_list()
            .into_iter()
            .filter(|id| !records.contains(*id))
            .count();
        if dangling > 0 {
            warn!(dangling, "appointment queue references unknown patients");
        }

        let queued_max = queue.to_ordered_list().into_iter().max().unwrap_or(0);
        self.id_high_water = records.max_id().max(queued_max);
        self.records = records;
        self.index = index;
        self.queue = queue;
        self.undo.clear();
        info!(
            patients = self.records.len(),
            appointments = self.queue.len(),
            "loaded clinic state"
        );
        Ok(())
    }

    pub fn save_all(&self) -> StateRows {
        StateRows {
            patients: self.records.all_ordered().iter().map(PatientRow::from).collect(),
            appointments: self
                .queue
                .to_ordered_list()
                .into_iter()
                .map(|patient_id| QueueRow { patient_id })
                .collect(),
        }
    }

    /// Check that every record sits in exactly its doctor's bucket, in record
    /// order, with an up-to-date snapshot. Returns one message per problem.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for record in self.records.all_ordered() {
            let holders = self.index.doctors_holding(record.id);
            if holders != [record.doctor.as_str()] {
                issues.push(format!(
                    "patient {} expected under {:?}, found under {:?}",
                    record.id, record.doctor, holders
                ));
            }
        }
        if self.index.len() != self.records.len() {
            issues.push(format!(
                "index holds {} entries for {} records",
                self.index.len(),
                self.records.len()
            ));
        }
        for (doctor, _) in self.index.doctors() {
            let expected: Vec<&Patient> = self
                .records
                .all_ordered()
                .iter()
                .filter(|record| record.doctor == doctor)
                .collect();
            let bucket = self.index.search(&doctor);
            if bucket.iter().ne(expected.iter().copied()) {
                issues.push(format!("bucket {:?} is out of sync with the records", doctor));
            }
        }
        issues
    }
}
