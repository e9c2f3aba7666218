//! Outgoing sync events.
//!
//! DESIGN
//! ======
//! Mutating operations never talk to the socket directly. They push a
//! `SyncEvent` into an `Outbox` when their `SyncMode` asks for it, and the
//! host drains the outbox after each turn and forwards the events over its
//! transport. `SyncMode::NoSync` never produces an event, which is what lets
//! inbound server events be applied without echoing them back.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use serde::{Deserialize, Serialize};

use crate::floor::{FloorType, LayerName};
use crate::id::GlobalId;

/// Whether and how a mutation is reported to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Local only. Used when applying changes that came from the server.
    #[default]
    NoSync,
    /// Reported for UI bookkeeping only.
    UiSync,
    /// Reported as a temporary (not persisted) change, e.g. mid-drag.
    TempSync,
    /// Reported and persisted.
    FullSync,
}

impl SyncMode {
    #[must_use]
    pub fn should_sync(self) -> bool {
        self != Self::NoSync
    }

    #[must_use]
    pub fn is_temporary(self) -> bool {
        self == Self::TempSync
    }
}

impl From<bool> for SyncMode {
    fn from(sync: bool) -> Self {
        if sync { Self::FullSync } else { Self::NoSync }
    }
}

/// A mutation to report to the server, keyed by its syscall name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "syscall", content = "data")]
pub enum SyncEvent {
    #[serde(rename = "floor:rename")]
    FloorRename { index: usize, name: String },
    #[serde(rename = "floor:remove")]
    FloorRemove { name: String },
    #[serde(rename = "floor:visible")]
    FloorVisible { name: String, visible: bool },
    #[serde(rename = "floor:reorder")]
    FloorReorder { floors: Vec<String> },
    #[serde(rename = "floor:type")]
    FloorType { name: String, floor_type: FloorType },
    #[serde(rename = "floor:background")]
    FloorBackground { name: String, background: Option<String> },
    #[serde(rename = "layer:active")]
    ActiveLayer { floor: String, layer: LayerName },
    #[serde(rename = "shapes:remove")]
    ShapesRemove { uuids: Vec<GlobalId>, temporary: bool },
    #[serde(rename = "shapes:layer")]
    ShapesLayer { uuids: Vec<GlobalId>, floor: String, layer: LayerName },
}

impl SyncEvent {
    /// The syscall name this event is sent under.
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::FloorRename { .. } => "floor:rename",
            Self::FloorRemove { .. } => "floor:remove",
            Self::FloorVisible { .. } => "floor:visible",
            Self::FloorReorder { .. } => "floor:reorder",
            Self::FloorType { .. } => "floor:type",
            Self::FloorBackground { .. } => "floor:background",
            Self::ActiveLayer { .. } => "layer:active",
            Self::ShapesRemove { .. } => "shapes:remove",
            Self::ShapesLayer { .. } => "shapes:layer",
        }
    }
}

/// Pending outgoing events, in emission order.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<SyncEvent>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the event built by `event` if `mode` syncs. The builder is not
    /// called otherwise.
    pub fn emit(&mut self, mode: SyncMode, event: impl FnOnce() -> SyncEvent) {
        if mode.should_sync() {
            let event = event();
            tracing::trace!(syscall = event.syscall(), "sync event queued");
            self.pending.push(event);
        }
    }

    #[must_use]
    pub fn pending(&self) -> &[SyncEvent] {
        &self.pending
    }

    /// Take every queued event.
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
