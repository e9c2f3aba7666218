//! Floor store and composition engine.
//!
//! DESIGN
//! ======
//! `FloorSystem` owns the ordered floors, each floor's ordered layers, and the
//! only persistent selection state: the active floor position and the active
//! layer position. Both are `None` when no floor or layer has been selected
//! and are always kept pointing at a live entry.
//!
//! Floors stack bottom to top. Only floors up to and including the active one
//! are displayed; everything above is hidden so it cannot occlude the view.
//! Within the active floor every selectable layer above the active layer is
//! dimmed, except the lighting layer which always renders at full opacity.
//!
//! Floors can arrive off the network in any order during load. `add_floor`
//! accepts the floor's canonical index and records it alongside the floor, so
//! the final order matches the server regardless of arrival order. The
//! recorded indices move with their floors through removal and reordering.
//!
//! Shape placement is tracked here too: each placed shape id belongs to
//! exactly one layer, and `FloorSystem` forgets an id through `IdOwner` before
//! the identity registry recycles it.

#[cfg(test)]
#[path = "floors_test.rs"]
mod floors_test;

use std::collections::HashMap;

use crate::config::SceneConfig;
use crate::consts::FULL_ALPHA;
use crate::error::SceneError;
use crate::floor::{Floor, FloorId, FloorRef, FloorType, LayerName};
use crate::id::{GlobalId, IdOwner, LocalId};
use crate::layer::Layer;
use crate::selection::SelectionState;
use crate::sync::{Outbox, SyncEvent, SyncMode};

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Geometry the vision subsystem triangulates per floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangulationTarget {
    Movement,
    Vision,
}

/// Vision subsystem holding floor-scoped geometry caches.
pub trait VisionSystem {
    fn remove_cdt(&mut self, floor: FloorId);
    fn remove_blockers(&mut self, target: TriangulationTarget, floor: FloorId);
}

/// Vision subsystem for hosts that do not compute vision.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVision;

impl VisionSystem for NoVision {
    fn remove_cdt(&mut self, _floor: FloorId) {}
    fn remove_blockers(&mut self, _target: TriangulationTarget, _floor: FloorId) {}
}

/// Gate for floor type and background changes.
pub trait Permissions {
    fn is_privileged(&self) -> bool;
}

impl Permissions for bool {
    fn is_privileged(&self) -> bool {
        *self
    }
}

// =============================================================================
// FLOOR SYSTEM
// =============================================================================

pub struct FloorSystem {
    pub(crate) floors: Vec<Floor>,
    pub(crate) layers: HashMap<FloorId, Vec<Layer>>,
    pub(crate) floor_index: Option<usize>,
    layer_index: Option<usize>,
    /// Target index each floor was added with, parallel to `floors`.
    indices: Vec<Option<usize>>,
    last_floor_id: FloorId,
    locations: HashMap<LocalId, (FloorId, LayerName)>,
    selection: SelectionState,
    outbox: Outbox,
    vision: Box<dyn VisionSystem>,
    permissions: Box<dyn Permissions>,
    dimmed_alpha: f64,
    default_layer_index: usize,
}

impl FloorSystem {
    /// Empty floor system without vision and without privileges.
    #[must_use]
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            floors: Vec::new(),
            layers: HashMap::new(),
            floor_index: None,
            layer_index: None,
            indices: Vec::new(),
            last_floor_id: 0,
            locations: HashMap::new(),
            selection: SelectionState::new(),
            outbox: Outbox::new(),
            vision: Box::new(NoVision),
            permissions: Box::new(false),
            dimmed_alpha: config.dimmed_alpha,
            default_layer_index: config.default_layer_index,
        }
    }

    #[must_use]
    pub fn with_vision(mut self, vision: Box<dyn VisionSystem>) -> Self {
        self.vision = vision;
        self
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: Box<dyn Permissions>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn set_permissions(&mut self, permissions: Box<dyn Permissions>) {
        self.permissions = permissions;
    }

    /// Drop every floor, layer and placement. Used when leaving a scene.
    pub fn clear(&mut self) {
        self.floors.clear();
        self.layers.clear();
        self.floor_index = None;
        self.layer_index = None;
        self.indices.clear();
        self.last_floor_id = 0;
        self.locations.clear();
        self.selection.clear();
        self.outbox.clear();
    }

    // --- Queries ---

    /// Position of the floor `floor` refers to.
    #[must_use]
    pub fn floor_position(&self, floor: &FloorRef) -> Option<usize> {
        match floor {
            FloorRef::Name(name) => self.floors.iter().position(|f| &f.name == name),
            FloorRef::Id(id) => self.floors.iter().position(|f| f.id == *id),
            FloorRef::Position(position) => (*position < self.floors.len()).then_some(*position),
        }
    }

    /// Read-only view of a floor.
    #[must_use]
    pub fn floor(&self, floor: &FloorRef) -> Option<&Floor> {
        self.floor_position(floor).and_then(|i| self.floors.get(i))
    }

    /// Mutable access to a floor's fields. Bypasses sync and invalidation.
    pub fn floor_mut(&mut self, floor: &FloorRef) -> Option<&mut Floor> {
        self.floor_position(floor).and_then(|i| self.floors.get_mut(i))
    }

    /// Floors in stacking order, bottom first.
    #[must_use]
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    #[must_use]
    pub fn floor_index(&self) -> Option<usize> {
        self.floor_index
    }

    #[must_use]
    pub fn layer_index(&self) -> Option<usize> {
        self.layer_index
    }

    #[must_use]
    pub fn current_floor(&self) -> Option<&Floor> {
        self.floor_index.and_then(|i| self.floors.get(i))
    }

    /// The active layer of the active floor.
    #[must_use]
    pub fn current_layer(&self) -> Option<&Layer> {
        let floor = self.current_floor()?;
        self.active_layer_of(floor.id)
    }

    /// The layer at the active layer position on `floor`.
    #[must_use]
    pub fn active_layer_of(&self, floor: FloorId) -> Option<&Layer> {
        self.layers.get(&floor)?.get(self.layer_index?)
    }

    /// Layers of `floor`, bottom first. Empty for an unknown floor.
    #[must_use]
    pub fn layers(&self, floor: FloorId) -> &[Layer] {
        self.layers.get(&floor).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn layer(&self, floor: FloorId, name: LayerName) -> Option<&Layer> {
        self.layers(floor).iter().find(|l| l.name() == name)
    }

    pub(crate) fn layer_mut(&mut self, floor: FloorId, name: LayerName) -> Option<&mut Layer> {
        self.layers.get_mut(&floor)?.iter_mut().find(|l| l.name() == name)
    }

    #[must_use]
    pub fn has_layer(&self, floor: FloorId, name: LayerName) -> bool {
        self.layer(floor, name).is_some()
    }

    #[must_use]
    pub fn grid_layer(&self, floor: FloorId) -> Option<&Layer> {
        self.layer(floor, LayerName::Grid)
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    // --- Sync ---

    #[must_use]
    pub fn pending_sync(&self) -> &[SyncEvent] {
        self.outbox.pending()
    }

    /// Take every sync event queued since the last drain.
    pub fn drain_sync(&mut self) -> Vec<SyncEvent> {
        self.outbox.drain()
    }

    pub(crate) fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    // =========================================================================
    // FLOORS
    // =========================================================================

    /// Next unused floor id.
    pub fn generate_floor_id(&mut self) -> FloorId {
        let id = self.last_floor_id;
        self.last_floor_id += 1;
        id
    }

    /// Add a floor, appending unless a canonical `target_index` is given.
    ///
    /// With a target index the floor is inserted before the first previously
    /// added floor whose target index is greater, so floors loaded in any
    /// order end up sorted. The active floor position shifts to keep the same
    /// floor selected.
    pub fn add_floor(&mut self, floor: Floor, target_index: Option<usize>) {
        let floor_id = floor.id;
        let insert_at = target_index
            .and_then(|target| self.indices.iter().position(|entry| matches!(entry, Some(i) if *i > target)));
        match insert_at {
            Some(at) => {
                self.indices.insert(at, target_index);
                self.floors.insert(at, floor);
                if let Some(active) = self.floor_index {
                    if at <= active {
                        self.floor_index = Some(active + 1);
                    }
                }
            }
            None => {
                self.indices.push(target_index);
                self.floors.push(floor);
            }
        }
        self.layers.insert(floor_id, Vec::new());
        tracing::debug!(floor = floor_id, ?target_index, "floor added");
    }

    /// Make the referenced floor active. No-op if it is already active or
    /// does not resolve.
    pub fn select_floor(&mut self, floor: &FloorRef, sync: SyncMode) {
        let Some(target) = self.floor_position(floor) else {
            return;
        };
        if self.floor_index == Some(target) {
            return;
        }
        self.activate_floor(target, sync);
    }

    fn activate_floor(&mut self, target: usize, sync: SyncMode) {
        self.floor_index = Some(target);
        for (position, floor) in self.floors.iter().enumerate() {
            let Some(layers) = self.layers.get_mut(&floor.id) else {
                continue;
            };
            for layer in layers {
                layer.set_displayed(position <= target);
            }
        }
        if let Some(name) = self.current_layer().map(Layer::name) {
            self.select_layer(name, sync, false);
        }
        self.invalidate_all_floors();
        tracing::debug!(position = target, "floor selected");
    }

    /// Rename the floor at `index`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if `index` is out of range.
    pub fn rename_floor(&mut self, index: usize, name: impl Into<String>, sync: SyncMode) -> Result<(), SceneError> {
        let Some(floor) = self.floors.get_mut(index) else {
            tracing::error!(index, "could not rename unknown floor");
            return Err(SceneError::UnknownFloor(FloorRef::Position(index)));
        };
        floor.name = name.into();
        let name = floor.name.clone();
        if self.floor_index == Some(index) {
            self.invalidate_all_floors();
        }
        self.outbox.emit(sync, || SyncEvent::FloorRename { index, name });
        Ok(())
    }

    /// Remove a floor, its layers and its vision geometry.
    ///
    /// Removing the active floor activates the floor beneath it (or the new
    /// bottom floor when the removed one was at the bottom). Removing a floor
    /// beneath the active one keeps the same floor active.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if `floor` does not resolve. Callers are expected
    /// to have checked existence first.
    pub fn remove_floor(&mut self, floor: &FloorRef, sync: SyncMode) -> Result<Floor, SceneError> {
        let Some(position) = self.floor_position(floor) else {
            tracing::error!(%floor, "could not remove unknown floor");
            return Err(SceneError::UnknownFloor(floor.clone()));
        };
        let removed = self.floors.remove(position);
        self.indices.remove(position);

        self.vision.remove_cdt(removed.id);
        self.vision.remove_blockers(TriangulationTarget::Movement, removed.id);
        self.vision.remove_blockers(TriangulationTarget::Vision, removed.id);

        if let Some(layers) = self.layers.remove(&removed.id) {
            for mut layer in layers {
                layer.remove_canvas();
            }
        }
        self.locations.retain(|_, (floor_id, _)| *floor_id != removed.id);

        match self.floor_index {
            Some(active) if active == position => {
                if self.floors.is_empty() {
                    self.floor_index = None;
                    self.layer_index = None;
                } else {
                    self.activate_floor(position.saturating_sub(1), sync);
                }
            }
            Some(active) if active > position => self.floor_index = Some(active - 1),
            _ => {}
        }

        tracing::debug!(floor = removed.id, name = %removed.name, "floor removed");
        self.outbox.emit(sync, || SyncEvent::FloorRemove { name: removed.name.clone() });
        Ok(removed)
    }

    /// Show or hide a floor for players.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if `floor` does not resolve.
    pub fn set_floor_player_visible(&mut self, floor: &FloorRef, visible: bool, sync: SyncMode) -> Result<(), SceneError> {
        let Some(target) = self.floor_mut(floor) else {
            tracing::error!(%floor, "could not update visibility of unknown floor");
            return Err(SceneError::UnknownFloor(floor.clone()));
        };
        target.player_visible = visible;
        let name = target.name.clone();
        self.outbox.emit(sync, || SyncEvent::FloorVisible { name, visible });
        Ok(())
    }

    /// Replace the floor order with `names`, keeping the active floor active.
    ///
    /// Floors missing from `names` keep their relative order after the named
    /// ones. Layer z-indices are recomputed for the new stacking.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if a name does not resolve; the order is left
    /// untouched in that case.
    pub fn reorder_floors(&mut self, names: &[String], sync: SyncMode) -> Result<(), SceneError> {
        let mut positions = Vec::with_capacity(names.len());
        for name in names {
            let reference = FloorRef::Name(name.clone());
            let Some(position) = self.floor_position(&reference) else {
                tracing::error!(%reference, "could not reorder unknown floor");
                return Err(SceneError::UnknownFloor(reference));
            };
            positions.push(position);
        }

        let active_name = self.current_floor().map(|f| f.name.clone());
        let floors = std::mem::take(&mut self.floors);
        let indices = std::mem::take(&mut self.indices);
        let mut remaining: Vec<Option<(Floor, Option<usize>)>> = floors.into_iter().zip(indices).map(Some).collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        for position in positions {
            if let Some(entry) = remaining.get_mut(position).and_then(Option::take) {
                ordered.push(entry);
            }
        }
        ordered.extend(remaining.into_iter().flatten());
        let (floors, indices): (Vec<Floor>, Vec<Option<usize>>) = ordered.into_iter().unzip();
        self.floors = floors;
        self.indices = indices;

        self.floor_index = active_name.and_then(|name| self.floor_position(&FloorRef::Name(name)));
        self.recalculate_z_indices();
        self.outbox.emit(sync, || SyncEvent::FloorReorder { floors: names.to_vec() });
        Ok(())
    }

    /// Assign ascending z-indices to every layer in stacking order.
    pub fn recalculate_z_indices(&mut self) {
        let mut z_index: i32 = 0;
        for floor in &self.floors {
            let Some(layers) = self.layers.get_mut(&floor.id) else {
                continue;
            };
            for layer in layers {
                layer.set_z_index(z_index);
                z_index += 1;
            }
        }
    }

    /// Change a floor's type. Silently ignored without privileges or for an
    /// unknown floor.
    pub fn set_floor_type(&mut self, floor: &FloorRef, kind: FloorType, sync: SyncMode) {
        if !self.permissions.is_privileged() {
            return;
        }
        let Some(target) = self.floor_mut(floor) else {
            return;
        };
        target.kind = kind;
        let name = target.name.clone();
        self.outbox.emit(sync, || SyncEvent::FloorType { name, floor_type: kind });
    }

    /// Change a floor's background and redraw it. Silently ignored without
    /// privileges or for an unknown floor.
    pub fn set_floor_background(&mut self, floor: &FloorRef, background: Option<String>, sync: SyncMode) {
        if !self.permissions.is_privileged() {
            return;
        }
        let Some(target) = self.floor_mut(floor) else {
            return;
        };
        target.background.clone_from(&background);
        let (id, name) = (target.id, target.name.clone());
        self.invalidate_floor(id);
        self.outbox.emit(sync, || SyncEvent::FloorBackground { name, background });
    }

    // =========================================================================
    // LAYERS
    // =========================================================================

    /// Append `layer` to a floor. The first layer ever added sets the active
    /// layer position to the default interactive layer.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if no floor has id `floor`.
    pub fn add_layer(&mut self, mut layer: Layer, floor: FloorId) -> Result<(), SceneError> {
        let Some(layers) = self.layers.get_mut(&floor) else {
            tracing::error!(floor, layer = %layer.name(), "attempt to add layer to unknown floor");
            return Err(SceneError::UnknownFloor(FloorRef::Id(floor)));
        };
        layer.floor = floor;
        layers.push(layer);
        if self.layer_index.is_none() {
            self.layer_index = Some(self.default_layer_index);
        }
        Ok(())
    }

    /// Make `name` the active layer of the active floor.
    ///
    /// Walking the floor's selectable layers bottom to top, every layer after
    /// the first match is dimmed except lighting; the match and everything
    /// beneath it render at full opacity. Clears the selection.
    pub fn select_layer(&mut self, name: LayerName, sync: SyncMode, invalidate: bool) {
        self.selection.clear();
        let Some(floor) = self.current_floor() else {
            return;
        };
        let (floor_id, floor_name) = (floor.id, floor.name.clone());
        let Some(layers) = self.layers.get_mut(&floor_id) else {
            return;
        };

        let mut found = false;
        for (index, layer) in layers.iter_mut().enumerate() {
            if !layer.selectable {
                continue;
            }
            if found && layer.name() != LayerName::Lighting {
                layer.set_alpha(self.dimmed_alpha);
            } else {
                layer.set_alpha(FULL_ALPHA);
            }

            if !found && layer.name() == name {
                self.layer_index = Some(index);
                found = true;
                self.outbox.emit(sync, || SyncEvent::ActiveLayer { floor: floor_name.clone(), layer: name });
            }

            if invalidate {
                layer.invalidate(true);
            }
        }
    }

    // =========================================================================
    // SHAPE PLACEMENT
    // =========================================================================

    /// Attach a shape id to a layer, detaching it from any previous layer.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` or `UnknownLayer` if the target does not exist.
    pub fn add_shape(&mut self, local: LocalId, floor: FloorId, layer: LayerName, invalidate: bool) -> Result<(), SceneError> {
        if !self.layers.contains_key(&floor) {
            return Err(SceneError::UnknownFloor(FloorRef::Id(floor)));
        }
        if !self.has_layer(floor, layer) {
            return Err(SceneError::UnknownLayer { floor, layer });
        }
        self.detach(local, invalidate);
        if let Some(target) = self.layer_mut(floor, layer) {
            target.push_shape(local);
            if invalidate {
                target.invalidate(false);
            }
        }
        self.locations.insert(local, (floor, layer));
        Ok(())
    }

    /// Detach a shape id from its layer, returning where it was.
    pub fn remove_shape(&mut self, local: LocalId, invalidate: bool) -> Option<(FloorId, LayerName)> {
        self.detach(local, invalidate)
    }

    fn detach(&mut self, local: LocalId, invalidate: bool) -> Option<(FloorId, LayerName)> {
        let (floor, name) = self.locations.remove(&local)?;
        if let Some(layer) = self.layer_mut(floor, name) {
            layer.remove_shape(local);
            if invalidate {
                layer.invalidate(false);
            }
        }
        Some((floor, name))
    }

    /// Move a placed shape to `destination` in its layer's draw order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocalId` if the shape is not placed on any layer.
    pub fn move_shape_order(&mut self, local: LocalId, destination: usize) -> Result<(), SceneError> {
        let Some(&(floor, name)) = self.locations.get(&local) else {
            return Err(SceneError::UnknownLocalId(local));
        };
        if let Some(layer) = self.layer_mut(floor, name) {
            if layer.move_shape(local, destination) {
                layer.invalidate(true);
            }
        }
        Ok(())
    }

    /// The floor and layer a shape is placed on.
    #[must_use]
    pub fn shape_location(&self, local: LocalId) -> Option<(FloorId, LayerName)> {
        self.locations.get(&local).copied()
    }
}

impl IdOwner for FloorSystem {
    fn drop_id(&mut self, id: LocalId, global: &GlobalId) {
        self.detach(id, false);
        self.selection.drop_id(id, global);
    }

    fn reset(&mut self) {
        self.clear();
    }
}
