use std::collections::VecDeque;

use crate::patient::PatientId;

/// FIFO of patient ids waiting for an appointment. The same id may be queued
/// more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQueue {
    ids: VecDeque<PatientId>,
}

impl AppointmentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, id: PatientId) {
        self.ids.push_back(id);
    }

    pub fn dequeue(&mut self) -> Option<PatientId> {
        self.ids.pop_front()
    }

    pub fn peek(&self) -> Option<PatientId> {
        self.ids.front().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn to_ordered_list(&self) -> Vec<PatientId> {
        self.ids.iter().copied().collect()
    }

    pub fn load_from_ordered_list<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = PatientId>,
    {
        self.ids = ids.into_iter().collect();
    }

    /// Remove the most recently queued occurrence of `id`, searching from the
    /// tail. Earlier occurrences stay queued.
    pub fn remove_last_occurrence(&mut self, id: PatientId) -> bool {
        match self.ids.iter().rposition(|queued| *queued == id) {
            Some(position) => {
                self.ids.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: PatientId) -> bool {
        self.ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeue_is_first_in_first_out() {
        let mut queue = AppointmentQueue::new();
        queue.enqueue(4);
        queue.enqueue(2);
        queue.enqueue(9);

        assert_eq!(queue.peek(), Some(4));
        assert_eq!(queue.dequeue(), Some(4));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(), Some(9));
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.peek(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn remove_last_occurrence_only_touches_the_tail_match() {
        let mut queue = AppointmentQueue::new();
        queue.load_from_ordered_list([5, 1, 5, 2]);

        assert!(queue.remove_last_occurrence(5));
        assert_eq!(queue.to_ordered_list(), vec![5, 1, 2]);
        assert!(queue.remove_last_occurrence(5));
        assert_eq!(queue.to_ordered_list(), vec![1, 2]);
        assert!(!queue.remove_last_occurrence(5));
    }

    #[test]
    fn load_replaces_previous_contents() {
        let mut queue = AppointmentQueue::new();
        queue.enqueue(1);
        queue.load_from_ordered_list(vec![7, 8]);
        assert_eq!(queue.to_ordered_list(), vec![7, 8]);
        assert!(queue.contains(8));
        assert!(!queue.contains(1));
    }
}
