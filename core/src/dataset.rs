//! Latest-dataset cell.
//!
//! The only resource shared between the HTTP read path and the refresh
//! write path. Readers take the shared lock just long enough to clone an
//! `Arc`; a refresh takes the exclusive lock only for the instant of the
//! swap. Readers holding an old `Arc<Dataset>` keep a consistent view.

use std::sync::{Arc, PoisonError, RwLock};

use crate::model::Dataset;

pub struct DatasetCell {
    inner: RwLock<Arc<Dataset>>,
}

impl DatasetCell {
    pub fn new(initial: Dataset) -> Self {
        Self {
            inner: RwLock::new(Arc::new(initial)),
        }
    }

    /// Snapshot of the current dataset.
    pub fn read(&self) -> Arc<Dataset> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Atomically replace the published dataset.
    pub fn publish(&self, next: Dataset) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
    }
}

impl Default for DatasetCell {
    fn default() -> Self {
        Self::new(Dataset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Region, RegionData};

    #[test]
    fn publish_does_not_disturb_held_snapshots() {
        let cell = DatasetCell::default();
        let before = cell.read();
        assert!(before.regions.is_empty());

        let mut next = Dataset::default();
        next.regions.insert(Region::Jp, RegionData::default());
        cell.publish(next);

        // The old snapshot is unchanged; a new read sees the new value.
        assert!(before.regions.is_empty());
        assert_eq!(cell.read().regions.len(), 1);
    }

    #[test]
    fn reads_are_cheap_clones_of_one_dataset() {
        let cell = DatasetCell::default();
        let a = cell.read();
        let b = cell.read();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
