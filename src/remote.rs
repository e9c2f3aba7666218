//! Inbound floor events pushed by the server.
//!
//! Each event is applied in one call with `SyncMode::NoSync`, so applying a
//! remote change never echoes it back and never interleaves with another
//! floor mutation.

#[cfg(test)]
#[path = "remote_test.rs"]
mod remote_test;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::floor::{Floor, FloorId, FloorRef, FloorType, LayerName};
use crate::layer::Layer;
use crate::scene::Scene;
use crate::sync::SyncMode;

/// A layer as described by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLayer {
    #[serde(rename = "type_")]
    pub name: LayerName,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
    #[serde(default)]
    pub player_editable: bool,
}

fn default_selectable() -> bool {
    true
}

/// A floor as described by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFloor {
    pub name: String,
    #[serde(default)]
    pub player_visible: bool,
    #[serde(default, rename = "type_")]
    pub kind: FloorType,
    #[serde(default)]
    pub background: Option<String>,
    /// Canonical position in the floor stack, if known.
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub layers: Vec<ServerLayer>,
}

/// A floor mutation received from the server, keyed by its syscall name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "syscall", content = "data")]
pub enum RemoteEvent {
    #[serde(rename = "floor:create")]
    CreateFloor(ServerFloor),
    #[serde(rename = "floor:remove")]
    RemoveFloor { name: String },
    #[serde(rename = "floor:rename")]
    RenameFloor { index: usize, name: String },
    #[serde(rename = "floor:visible")]
    SetFloorVisible { name: String, visible: bool },
    #[serde(rename = "floor:reorder")]
    ReorderFloors { floors: Vec<String> },
    #[serde(rename = "floor:type")]
    SetFloorType { name: String, floor_type: FloorType },
    #[serde(rename = "floor:background")]
    SetFloorBackground { name: String, background: Option<String> },
    #[serde(rename = "layer:active")]
    SelectLayer { floor: String, layer: LayerName },
}

impl<S> Scene<S> {
    /// Build a floor and its layers from server data.
    ///
    /// The first floor to arrive becomes active; later out-of-order arrivals
    /// shift around it without changing which floor is active.
    ///
    /// # Errors
    ///
    /// Propagates `add_layer` failures, which cannot occur for a floor that
    /// was just added.
    pub fn add_server_floor(&mut self, server: &ServerFloor) -> Result<FloorId, SceneError> {
        let id = self.floors.generate_floor_id();
        let floor = Floor {
            id,
            name: server.name.clone(),
            player_visible: server.player_visible,
            kind: server.kind,
            background: server.background.clone(),
        };
        self.floors.add_floor(floor, server.index);
        for server_layer in &server.layers {
            let canvas = self.canvases.create(id, server_layer.name);
            let layer = Layer::new(id, server_layer.name, canvas)
                .with_selectable(server_layer.selectable)
                .with_player_editable(server_layer.player_editable);
            self.floors.add_layer(layer, id)?;
        }
        if self.floors.floor_index().is_none() {
            self.floors.select_floor(&FloorRef::Id(id), SyncMode::NoSync);
        }
        Ok(id)
    }

    /// Apply a server event without reporting it back.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFloor` if the event references a floor this client
    /// does not have.
    pub fn apply_remote(&mut self, event: RemoteEvent) -> Result<(), SceneError> {
        let no_sync = SyncMode::NoSync;
        match event {
            RemoteEvent::CreateFloor(server) => {
                self.add_server_floor(&server)?;
            }
            RemoteEvent::RemoveFloor { name } => {
                self.floors.remove_floor(&FloorRef::Name(name), no_sync)?;
            }
            RemoteEvent::RenameFloor { index, name } => self.floors.rename_floor(index, name, no_sync)?,
            RemoteEvent::SetFloorVisible { name, visible } => {
                self.floors.set_floor_player_visible(&FloorRef::Name(name), visible, no_sync)?;
            }
            RemoteEvent::ReorderFloors { floors } => self.floors.reorder_floors(&floors, no_sync)?,
            RemoteEvent::SetFloorType { name, floor_type } => {
                self.floors.set_floor_type(&FloorRef::Name(name), floor_type, no_sync);
            }
            RemoteEvent::SetFloorBackground { name, background } => {
                self.floors.set_floor_background(&FloorRef::Name(name), background, no_sync);
            }
            RemoteEvent::SelectLayer { floor, layer } => {
                let floor = FloorRef::Name(floor);
                if self.floors.floor_position(&floor).is_none() {
                    return Err(SceneError::UnknownFloor(floor));
                }
                self.floors.select_floor(&floor, no_sync);
                self.floors.select_layer(layer, no_sync, true);
            }
        }
        Ok(())
    }
}
