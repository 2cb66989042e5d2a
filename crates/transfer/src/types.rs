use std::collections::BTreeSet;

use crate::TransferError;

/// Chunk indices the store has confirmed.
///
/// Only grows; membership is bounded by the planned count so it can never
/// claim more than the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcknowledgedSet {
    planned: usize,
    indices: BTreeSet<usize>,
}

impl AcknowledgedSet {
    /// Creates an empty set for a plan of `planned` chunks.
    pub fn new(planned: usize) -> Self {
        Self {
            planned,
            indices: BTreeSet::new(),
        }
    }

    /// Records `index` as acknowledged.
    ///
    /// Returns `Ok(false)` if it was already present.
    pub fn insert(&mut self, index: usize) -> Result<bool, TransferError> {
        if index >= self.planned {
            return Err(TransferError::ChunkOutOfRange {
                index,
                planned: self.planned,
            });
        }
        Ok(self.indices.insert(index))
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn planned(&self) -> usize {
        self.planned
    }

    /// `true` once every planned index is present.
    pub fn is_complete(&self) -> bool {
        self.indices.len() == self.planned
    }

    /// `len / planned * 100`. An empty plan counts as complete.
    pub fn percentage(&self) -> f64 {
        if self.planned == 0 {
            return 100.0;
        }
        self.indices.len() as f64 / self.planned as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_set_is_empty() {
        let set = AcknowledgedSet::new(3);
        assert!(set.is_empty());
        assert!(!set.is_complete());
        assert_eq!(set.percentage(), 0.0);
    }

    #[test]
    fn insert_grows_and_dedups() {
        let mut set = AcknowledgedSet::new(3);
        assert!(set.insert(2).unwrap());
        assert!(!set.insert(2).unwrap());
        assert_eq!(set.len(), 1);
        assert!(set.contains(2));
        assert!(!set.contains(0));
    }

    #[test]
    fn insert_out_of_plan_rejected() {
        let mut set = AcknowledgedSet::new(3);
        let result = set.insert(3);
        assert!(matches!(
            result,
            Err(TransferError::ChunkOutOfRange {
                index: 3,
                planned: 3
            })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn percentage_tracks_cardinality() {
        let mut set = AcknowledgedSet::new(4);
        set.insert(1).unwrap();
        assert!((set.percentage() - 25.0).abs() < f64::EPSILON);
        set.insert(0).unwrap();
        set.insert(3).unwrap();
        set.insert(2).unwrap();
        assert!(set.is_complete());
        assert_eq!(set.percentage(), 100.0);
    }

    #[test]
    fn empty_plan_is_complete() {
        let set = AcknowledgedSet::new(0);
        assert!(set.is_complete());
        assert_eq!(set.percentage(), 100.0);
    }
}
