use crate::error::{ClinicError, ClinicResult};
use crate::patient::{Patient, PatientChanges, PatientId};

/// Patients in registration order, keyed by a unique id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<Patient>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Fails when the id is already taken.
    pub fn insert(&mut self, record: Patient) -> ClinicResult<()> {
        self.ensure_absent(record.id)?;
        self.records.push(record);
        Ok(())
    }

    /// Insert at `position` (clamped to the end). Used to put a deleted
    /// record back where it was.
    pub fn insert_at(&mut self, position: usize, record: Patient) -> ClinicResult<()> {
        self.ensure_absent(record.id)?;
        let position = position.min(self.records.len());
        self.records.insert(position, record);
        Ok(())
    }

    pub fn find_by_id(&self, id: PatientId) -> Option<&Patient> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn position_of(&self, id: PatientId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    pub fn contains(&self, id: PatientId) -> bool {
        self.position_of(id).is_some()
    }

    /// Apply a partial update. Supplied fields are validated before the
    /// record is touched.
    pub fn update_by_id(
        &mut self,
        id: PatientId,
        changes: &PatientChanges,
    ) -> ClinicResult<&Patient> {
        let validated = changes.validate()?;
        let record = self.find_mut(id)?;
        record.apply(&validated);
        Ok(record)
    }

    /// Restore every mutable field from a snapshot of the same id.
    pub fn overwrite(&mut self, snapshot: &Patient) -> ClinicResult<&Patient> {
        let record = self.find_mut(snapshot.id)?;
        record.overwrite_from(snapshot);
        Ok(record)
    }

    pub fn delete_by_id(&mut self, id: PatientId) -> ClinicResult<Patient> {
        let position = self
            .position_of(id)
            .ok_or(ClinicError::PatientNotFound(id))?;
        Ok(self.records.remove(position))
    }

    pub fn all_ordered(&self) -> &[Patient] {
        &self.records
    }

    /// Highest id present, 0 when empty. Ids are never reused because the
    /// next id is always `max_id() + 1`.
    pub fn max_id(&self) -> PatientId {
        self.records.iter().map(|record| record.id).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn find_mut(&mut self, id: PatientId) -> ClinicResult<&mut Patient> {
        self.records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(ClinicError::PatientNotFound(id))
    }

    fn ensure_absent(&self, id: PatientId) -> ClinicResult<()> {
        if self.contains(id) {
            return Err(ClinicError::DuplicateId(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::parse_timestamp;

    fn patient(id: PatientId, name: &str, doctor: &str) -> Patient {
        Patient {
            id,
            name: name.to_string(),
            age: 30,
            disease: "flu".to_string(),
            doctor: doctor.to_string(),
            registered_at: parse_timestamp("2026-02-01 10:00:00").unwrap(),
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut store = RecordStore::new();
        store.insert(patient(1, "Ada", "Lee")).unwrap();
        assert_eq!(
            store.insert(patient(1, "Bob", "Kim")),
            Err(ClinicError::DuplicateId(1))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn max_id_tracks_highest_present_id() {
        let mut store = RecordStore::new();
        assert_eq!(store.max_id(), 0);
        store.insert(patient(3, "Ada", "Lee")).unwrap();
        store.insert(patient(7, "Bob", "Lee")).unwrap();
        store.insert(patient(5, "Cy", "Lee")).unwrap();
        assert_eq!(store.max_id(), 7);
        store.delete_by_id(7).unwrap();
        assert_eq!(store.max_id(), 5);
    }

    #[test]
    fn delete_returns_record_and_keeps_order() {
        let mut store = RecordStore::new();
        for (id, name) in [(1, "Ada"), (2, "Bob"), (3, "Cy")] {
            store.insert(patient(id, name, "Lee")).unwrap();
        }
        let removed = store.delete_by_id(2).unwrap();
        assert_eq!(removed.name, "Bob");
        let ids: Vec<_> = store.all_ordered().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.delete_by_id(2), Err(ClinicError::PatientNotFound(2)));
    }

    #[test]
    fn insert_at_restores_position_and_clamps() {
        let mut store = RecordStore::new();
        store.insert(patient(1, "Ada", "Lee")).unwrap();
        store.insert(patient(3, "Cy", "Lee")).unwrap();
        store.insert_at(1, patient(2, "Bob", "Lee")).unwrap();
        store.insert_at(99, patient(4, "Di", "Lee")).unwrap();
        let ids: Vec<_> = store.all_ordered().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let mut store = RecordStore::new();
        store.insert(patient(1, "Ada", "Lee")).unwrap();
        let changes = PatientChanges::default().age(31).doctor(" Kim ");
        let updated = store.update_by_id(1, &changes).unwrap().clone();
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.age, 31);
        assert_eq!(updated.doctor, "Kim");
        assert_eq!(
            store.update_by_id(9, &changes).map(|p| p.id),
            Err(ClinicError::PatientNotFound(9))
        );
    }

    #[test]
    fn update_with_invalid_field_leaves_record_untouched() {
        let mut store = RecordStore::new();
        store.insert(patient(1, "Ada", "Lee")).unwrap();
        let changes = PatientChanges::default().name("Eve").age(0);
        assert_eq!(
            store.update_by_id(1, &changes).map(|p| p.id),
            Err(ClinicError::NonPositiveAge(0))
        );
        assert_eq!(store.find_by_id(1).unwrap().name, "Ada");
    }
}
