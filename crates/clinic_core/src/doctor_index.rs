use std::collections::BTreeMap;

use crate::patient::{Patient, PatientId};

/// Doctor name -> bucket of patient snapshots, buckets in registration order.
///
/// Keys are ordered lexicographically. The index never owns a record: every
/// mutation of the record store has to be mirrored here (or followed by
/// [`DoctorIndex::rebuild_from_records`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorIndex {
    buckets: BTreeMap<String, Vec<Patient>>,
}

impl DoctorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the doctor's bucket, creating it if absent.
    pub fn insert(&mut self, doctor: &str, record: Patient) {
        self.buckets.entry(doctor.to_string()).or_default().push(record);
    }

    /// Insert at `rank` within the doctor's bucket (clamped to the end).
    pub fn insert_at(&mut self, doctor: &str, rank: usize, record: Patient) {
        let bucket = self.buckets.entry(doctor.to_string()).or_default();
        let rank = rank.min(bucket.len());
        bucket.insert(rank, record);
    }

    /// Copy of the doctor's bucket; empty when the doctor is unknown.
    pub fn search(&self, doctor: &str) -> Vec<Patient> {
        self.buckets.get(doctor).cloned().unwrap_or_default()
    }

    /// Drop `id` from the doctor's bucket. Returns false when nothing matched.
    pub fn remove(&mut self, doctor: &str, id: PatientId) -> bool {
        let Some(bucket) = self.buckets.get_mut(doctor) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|record| record.id != id);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            self.buckets.remove(doctor);
        }
        removed
    }

    /// Replace the snapshot for `record.id` in its current doctor's bucket.
    pub fn refresh(&mut self, record: &Patient) -> bool {
        let Some(bucket) = self.buckets.get_mut(&record.doctor) else {
            return false;
        };
        match bucket.iter_mut().find(|entry| entry.id == record.id) {
            Some(entry) => {
                *entry = record.clone();
                true
            }
            None => false,
        }
    }

    /// Discard every bucket and re-insert each record under its current doctor.
    pub fn rebuild_from_records<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a Patient>,
    {
        self.buckets.clear();
        for record in records {
            self.insert(&record.doctor, record.clone());
        }
    }

    /// Doctor names with their bucket sizes, in key order.
    pub fn doctors(&self) -> Vec<(String, usize)> {
        self.buckets
            .iter()
            .map(|(doctor, bucket)| (doctor.clone(), bucket.len()))
            .collect()
    }

    /// Doctors whose bucket contains `id`. Exactly one for a consistent index.
    pub fn doctors_holding(&self, id: PatientId) -> Vec<&str> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| bucket.iter().any(|record| record.id == id))
            .map(|(doctor, _)| doctor.as_str())
            .collect()
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
