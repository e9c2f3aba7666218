//! Selected shape set. Cleared whenever the active layer changes.

use crate::id::{GlobalId, IdOwner, LocalId};

/// Selected shape ids in selection order.
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    ids: Vec<LocalId>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `local` to the selection. Already selected ids keep their place.
    pub fn select(&mut self, local: LocalId) {
        if !self.ids.contains(&local) {
            self.ids.push(local);
        }
    }

    pub fn deselect(&mut self, local: LocalId) {
        self.ids.retain(|id| *id != local);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, local: LocalId) -> bool {
        self.ids.contains(&local)
    }

    #[must_use]
    pub fn ids(&self) -> &[LocalId] {
        &self.ids
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl IdOwner for SelectionState {
    fn drop_id(&mut self, id: LocalId, _global: &GlobalId) {
        self.deselect(id);
    }

    fn reset(&mut self) {
        self.clear();
    }
}
