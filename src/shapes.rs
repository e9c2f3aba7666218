//! Local id to shape object index.
//!
//! Kept apart from the identity registry: the registry stores global id
//! strings for every live id, including reservations, while this index only
//! holds shapes that have actually been built.

#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;

use std::collections::HashMap;

use crate::id::LocalId;

/// Owning map from local id to shape.
#[derive(Debug)]
pub struct ShapeIndex<S> {
    shapes: HashMap<LocalId, S>,
}

impl<S> ShapeIndex<S> {
    #[must_use]
    pub fn new() -> Self {
        Self { shapes: HashMap::new() }
    }

    /// Register `shape` under `local`, returning any shape it replaced.
    pub fn insert(&mut self, local: LocalId, shape: S) -> Option<S> {
        self.shapes.insert(local, shape)
    }

    pub fn remove(&mut self, local: LocalId) -> Option<S> {
        self.shapes.remove(&local)
    }

    #[must_use]
    pub fn get(&self, local: LocalId) -> Option<&S> {
        self.shapes.get(&local)
    }

    pub fn get_mut(&mut self, local: LocalId) -> Option<&mut S> {
        self.shapes.get_mut(&local)
    }

    #[must_use]
    pub fn contains(&self, local: LocalId) -> bool {
        self.shapes.contains_key(&local)
    }

    /// All registered shapes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (LocalId, &S)> {
        self.shapes.iter().map(|(local, shape)| (*local, shape))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl<S> Default for ShapeIndex<S> {
    fn default() -> Self {
        Self::new()
    }
}
