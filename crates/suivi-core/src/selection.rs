//! Bordereau selection set
//!
//! Ephemeral working state for the next transmittal slip: which documents
//! are in, how many physical copies of each, and the free-text observation
//! printed on the slip line. Copy counts and observations only ever exist
//! for selected ids; removing an id prunes its entries so a later deletion
//! elsewhere cannot leave stale data behind.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Documents chosen for the next transmittal slip
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Selected document ids, in selection order
    selected: Vec<Uuid>,
    /// Physical copy count per selected document
    copies: HashMap<Uuid, u32>,
    /// Free-text slip observation per selected document
    observations: HashMap<Uuid, String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in selection order
    pub fn ids(&self) -> &[Uuid] {
        &self.selected
    }

    /// Copy count for a selected document (1 when never set)
    pub fn copies_for(&self, id: Uuid) -> u32 {
        self.copies.get(&id).copied().unwrap_or(1)
    }

    /// Observation text for a selected document
    pub fn observation_for(&self, id: Uuid) -> Option<&str> {
        self.observations.get(&id).map(String::as_str)
    }

    /// Snapshot of the copies map, for slip archival
    pub fn copies_snapshot(&self) -> HashMap<Uuid, u32> {
        self.copies.clone()
    }

    /// Snapshot of the observations map, for slip archival
    pub fn observations_snapshot(&self) -> HashMap<Uuid, String> {
        self.observations.clone()
    }

    /// Add if absent (initializing the copy count), remove if present
    ///
    /// Returns `true` when the document is selected afterwards.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.contains(id) {
            self.remove(id);
            false
        } else {
            self.insert(id);
            true
        }
    }

    /// Add a document to the selection; no-op when already present
    pub fn insert(&mut self, id: Uuid) {
        if !self.contains(id) {
            self.selected.push(id);
            self.copies.entry(id).or_insert(1);
        }
    }

    /// Union with a set of ids, e.g. everything passing the active filter
    ///
    /// Never removes existing selections; running it twice with the same
    /// ids is a no-op the second time.
    pub fn insert_all(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        for id in ids {
            self.insert(id);
        }
    }

    /// Remove a document and prune its copies/observations entries
    ///
    /// Also used when a document is deleted from the store, so the prune
    /// happens in the same logical step as the deletion.
    pub fn remove(&mut self, id: Uuid) {
        self.selected.retain(|d| *d != id);
        self.copies.remove(&id);
        self.observations.remove(&id);
    }

    /// Clear the selection and both derived maps
    pub fn clear(&mut self) {
        self.selected.clear();
        self.copies.clear();
        self.observations.clear();
    }

    /// Set the copy count for a selected document (clamped to at least 1)
    ///
    /// Ignored for ids outside the selection, keeping the map-keys subset
    /// invariant.
    pub fn set_copies(&mut self, id: Uuid, copies: u32) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.copies.insert(id, copies.max(1));
        true
    }

    /// Set or clear the observation text for a selected document
    pub fn set_observation(&mut self, id: Uuid, text: impl Into<String>) -> bool {
        if !self.contains(id) {
            return false;
        }
        let text = text.into();
        if text.is_empty() {
            self.observations.remove(&id);
        } else {
            self.observations.insert(id, text);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_membership() {
        let mut sel = Selection::new();
        let id = Uuid::new_v4();

        assert!(sel.toggle(id));
        assert!(sel.contains(id));
        assert!(!sel.toggle(id));
        assert!(!sel.contains(id));
    }

    #[test]
    fn test_insert_initializes_default_copies() {
        let mut sel = Selection::new();
        let id = Uuid::new_v4();
        sel.insert(id);
        assert_eq!(sel.copies_for(id), 1);

        // An explicit count survives re-insertion
        sel.set_copies(id, 4);
        sel.insert(id);
        assert_eq!(sel.copies_for(id), 4);
    }

    #[test]
    fn test_insert_all_is_idempotent_union() {
        let mut sel = Selection::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        sel.insert(a);

        sel.insert_all([b, c]);
        assert_eq!(sel.len(), 3);

        sel.insert_all([b, c]);
        assert_eq!(sel.len(), 3);
        assert_eq!(sel.ids(), &[a, b, c]);
    }

    #[test]
    fn test_remove_prunes_maps() {
        let mut sel = Selection::new();
        let id = Uuid::new_v4();
        sel.insert(id);
        sel.set_copies(id, 3);
        sel.set_observation(id, "pour visa");

        sel.remove(id);
        assert!(!sel.contains(id));
        assert!(sel.copies_snapshot().is_empty());
        assert!(sel.observations_snapshot().is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut sel = Selection::new();
        let id = Uuid::new_v4();
        sel.insert(id);
        sel.set_observation(id, "note");

        sel.clear();
        assert!(sel.is_empty());
        assert!(sel.copies_snapshot().is_empty());
        assert!(sel.observations_snapshot().is_empty());
    }

    #[test]
    fn test_maps_reject_unselected_ids() {
        let mut sel = Selection::new();
        let id = Uuid::new_v4();
        assert!(!sel.set_copies(id, 2));
        assert!(!sel.set_observation(id, "x"));
        assert!(sel.copies_snapshot().is_empty());
    }

    #[test]
    fn test_copies_clamped_to_one() {
        let mut sel = Selection::new();
        let id = Uuid::new_v4();
        sel.insert(id);
        sel.set_copies(id, 0);
        assert_eq!(sel.copies_for(id), 1);
    }
}
