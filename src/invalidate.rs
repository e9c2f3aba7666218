//! Redraw invalidation passes over the floor stack.
//!
//! Five granularities: one floor, every floor, the visible floors, lighting
//! of one floor, and lighting of every floor up to the active one. Within a
//! floor, layers are always walked top to bottom.
//!
//! Lighting and visibility geometry is expensive to recompute, so the passes
//! avoid it for floors that cannot currently be seen: `invalidate_visible_floors`
//! only refreshes lighting for floors above the active one, and
//! `invalidate_light_all_floors` stops once it passes the active floor.

#[cfg(test)]
#[path = "invalidate_test.rs"]
mod invalidate_test;

use crate::error::SceneError;
use crate::floor::{FloorId, FloorRef, LayerName};
use crate::floors::FloorSystem;
use crate::layer::Layer;

impl FloorSystem {
    /// Redraw every layer of one floor.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if `floor` does not resolve.
    pub fn invalidate(&mut self, floor: &FloorRef) -> Result<(), SceneError> {
        let Some(id) = self.floor(floor).map(|f| f.id) else {
            tracing::error!(%floor, "could not invalidate unknown floor");
            return Err(SceneError::UnknownFloor(floor.clone()));
        };
        self.invalidate_floor(id);
        Ok(())
    }

    pub(crate) fn invalidate_floor(&mut self, floor: FloorId) {
        if let Some(layers) = self.layers.get_mut(&floor) {
            invalidate_full(layers);
        }
    }

    /// Redraw every layer of every floor.
    pub fn invalidate_all_floors(&mut self) {
        for floor in &self.floors {
            if let Some(layers) = self.layers.get_mut(&floor.id) {
                invalidate_full(layers);
            }
        }
    }

    /// Redraw floors up to and including the active one; floors above it only
    /// get their lighting refreshed.
    pub fn invalidate_visible_floors(&mut self) {
        let mut passed_active = false;
        for (position, floor) in self.floors.iter().enumerate() {
            if let Some(layers) = self.layers.get_mut(&floor.id) {
                if passed_active {
                    invalidate_lighting(layers);
                } else {
                    invalidate_full(layers);
                }
            }
            if self.floor_index == Some(position) {
                passed_active = true;
            }
        }
    }

    /// Refresh lighting of a single floor.
    ///
    /// Lighting of stacked floors depends on the floors beneath, so this is
    /// only correct in narrow cases; prefer `invalidate_light_all_floors`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if no floor has id `floor`.
    pub fn invalidate_light(&mut self, floor: FloorId) -> Result<(), SceneError> {
        let Some(layers) = self.layers.get_mut(&floor) else {
            tracing::error!(floor, "could not invalidate lighting of unknown floor");
            return Err(SceneError::UnknownFloor(FloorRef::Id(floor)));
        };
        invalidate_lighting(layers);
        Ok(())
    }

    /// Refresh lighting of every floor from the bottom up to the active one.
    pub fn invalidate_light_all_floors(&mut self) {
        let Some(active) = self.floor_index else {
            return;
        };
        for floor in self.floors.iter().take(active + 1) {
            if let Some(layers) = self.layers.get_mut(&floor.id) {
                invalidate_lighting(layers);
            }
        }
    }

    /// Propagate new canvas dimensions to every layer, then redraw everything.
    pub fn resize(&mut self, width: f64, height: f64) {
        for layers in self.layers.values_mut() {
            for layer in layers {
                layer.resize(width, height);
            }
        }
        self.invalidate_all_floors();
    }
}

fn invalidate_full(layers: &mut [Layer]) {
    for layer in layers.iter_mut().rev() {
        layer.invalidate(true);
    }
}

fn invalidate_lighting(layers: &mut [Layer]) {
    for layer in layers.iter_mut().rev() {
        if layer.is_vision_layer || layer.name() == LayerName::Map {
            layer.invalidate(true);
        }
    }
}
