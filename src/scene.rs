//! The scene context: identity, shapes, floors and groups in one owned value.
//!
//! DESIGN
//! ======
//! Every piece of mutable scene state lives in a `Scene`. Hosts create one per
//! joined game and call `clear` when leaving; tests build a fresh one per case.
//!
//! Releasing a local id follows a strict teardown order: every subsystem that
//! keys data by local id is told to forget it while the id still resolves,
//! then the shape and the id mapping are cleared, and only then is the id put
//! back into the free pool.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::floor::{FloorId, FloorRef, LayerName};
use crate::floors::FloorSystem;
use crate::groups::GroupRegistry;
use crate::id::{GlobalId, IdOwner, IdRegistry, LocalId};
use crate::layer::{CanvasFactory, HeadlessCanvases};
use crate::shapes::ShapeIndex;
use crate::sync::{SyncEvent, SyncMode};

pub struct Scene<S> {
    pub(crate) ids: IdRegistry,
    pub(crate) shapes: ShapeIndex<S>,
    pub(crate) floors: FloorSystem,
    pub(crate) groups: GroupRegistry,
    owners: Vec<Box<dyn IdOwner>>,
    pub(crate) canvases: Box<dyn CanvasFactory>,
    config: SceneConfig,
}

impl<S> Scene<S> {
    /// Empty scene with headless canvases.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        Self {
            ids: IdRegistry::with_options(config.lookup(), config.warn_missing_global),
            shapes: ShapeIndex::new(),
            floors: FloorSystem::new(&config),
            groups: GroupRegistry::new(),
            owners: Vec::new(),
            canvases: Box::new(HeadlessCanvases),
            config,
        }
    }

    #[must_use]
    pub fn with_canvases(mut self, canvases: Box<dyn CanvasFactory>) -> Self {
        self.canvases = canvases;
        self
    }

    /// Replace the floor system, e.g. one wired to vision and permissions.
    #[must_use]
    pub fn with_floors(mut self, floors: FloorSystem) -> Self {
        self.floors = floors;
        self
    }

    /// Register an external subsystem that keys data by local id.
    pub fn register_owner(&mut self, owner: Box<dyn IdOwner>) {
        self.owners.push(owner);
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    #[must_use]
    pub fn shapes(&self) -> &ShapeIndex<S> {
        &self.shapes
    }

    #[must_use]
    pub fn floors(&self) -> &FloorSystem {
        &self.floors
    }

    pub fn floors_mut(&mut self) -> &mut FloorSystem {
        &mut self.floors
    }

    #[must_use]
    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupRegistry {
        &mut self.groups
    }

    // --- Identity ---

    /// Reserve a local id for a shape that has not been built yet.
    pub fn reserve(&mut self, global: GlobalId) -> LocalId {
        self.ids.reserve(global)
    }

    /// Register a built shape, consuming a reservation for `global` if any.
    pub fn claim(&mut self, shape: S, global: Option<GlobalId>) -> LocalId {
        let local = self.ids.claim(global);
        self.shapes.insert(local, shape);
        local
    }

    /// Tear down a local id and return the global id it mapped to.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocalId` if `local` is not live.
    pub fn release(&mut self, local: LocalId) -> Result<GlobalId, SceneError> {
        self.teardown(local).map(|(global, _)| global)
    }

    fn teardown(&mut self, local: LocalId) -> Result<(GlobalId, Option<S>), SceneError> {
        if !self.ids.is_live(local) {
            tracing::error!(%local, "release of unknown local id");
            return Err(SceneError::UnknownLocalId(local));
        }
        let global = self.ids.global_of(local)?.clone();
        self.floors.drop_id(local, &global);
        self.groups.drop_id(local, &global);
        for owner in &mut self.owners {
            owner.drop_id(local, &global);
        }
        let shape = self.shapes.remove(local);
        self.ids.release(local)?;
        Ok((global, shape))
    }

    /// # Errors
    ///
    /// Returns `UnknownLocalId` if `local` is not live.
    pub fn global_of(&self, local: LocalId) -> Result<&GlobalId, SceneError> {
        self.ids.global_of(local)
    }

    #[must_use]
    pub fn local_of(&self, global: &GlobalId) -> Option<LocalId> {
        self.ids.local_of(global)
    }

    // --- Shapes ---

    #[must_use]
    pub fn shape(&self, local: LocalId) -> Option<&S> {
        self.shapes.get(local)
    }

    pub fn shape_mut(&mut self, local: LocalId) -> Option<&mut S> {
        self.shapes.get_mut(local)
    }

    #[must_use]
    pub fn shape_by_global(&self, global: &GlobalId) -> Option<&S> {
        self.shapes.get(self.local_of(global)?)
    }

    /// Put a shape on a layer, moving it off any previous layer.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocalId` for a dead id, `UnknownFloor` or
    /// `UnknownLayer` for a missing target.
    pub fn place_shape(&mut self, local: LocalId, floor: FloorId, layer: LayerName, sync: SyncMode) -> Result<(), SceneError> {
        let global = self.ids.global_of(local)?.clone();
        self.floors.add_shape(local, floor, layer, true)?;
        let floor_name = self.floors.floor(&FloorRef::Id(floor)).map(|f| f.name.clone()).unwrap_or_default();
        self.floors
            .outbox_mut()
            .emit(sync, || SyncEvent::ShapesLayer { uuids: vec![global], floor: floor_name, layer });
        Ok(())
    }

    /// Take a shape off its layer, report the removal, and release its id.
    ///
    /// The removal event carries the global id, so it is queued before the id
    /// is released.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocalId` if `local` is not live.
    pub fn remove_shape(&mut self, local: LocalId, sync: SyncMode) -> Result<Option<S>, SceneError> {
        let global = self.ids.global_of(local)?.clone();
        self.floors.remove_shape(local, true);
        self.floors
            .outbox_mut()
            .emit(sync, || SyncEvent::ShapesRemove { uuids: vec![global], temporary: sync.is_temporary() });
        self.teardown(local).map(|(_, shape)| shape)
    }

    /// Take every sync event queued since the last drain.
    pub fn drain_sync(&mut self) -> Vec<SyncEvent> {
        self.floors.drain_sync()
    }

    /// Reset every table. Used when leaving a scene.
    pub fn clear(&mut self) {
        self.floors.clear();
        self.groups.clear();
        for owner in &mut self.owners {
            owner.reset();
        }
        self.shapes.clear();
        self.ids.clear();
        tracing::info!("scene cleared");
    }
}
