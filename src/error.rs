//! Error type shared by the identity registry and the floor system.
//!
//! Only precondition violations become errors. Lookups that may legitimately
//! miss (a global id that has not arrived yet, a floor probed by name) return
//! `Option` instead, and permission denials are silent no-ops.

use crate::floor::{FloorId, FloorRef, LayerName};
use crate::id::LocalId;

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Stable machine-readable code for an error, suitable for logs and telemetry.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The local id was never issued or has already been released.
    #[error("unknown local id: {0}")]
    UnknownLocalId(LocalId),
    /// A mutating floor operation was given a reference that does not resolve.
    #[error("unknown floor: {0}")]
    UnknownFloor(FloorRef),
    /// The floor exists but carries no layer with this name.
    #[error("unknown layer {layer} on floor {floor}")]
    UnknownLayer { floor: FloorId, layer: LayerName },
    /// A configuration value is outside its accepted range.
    #[error("invalid scene config: {0}")]
    Config(String),
}

impl ErrorCode for SceneError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownLocalId(_) => "E_UNKNOWN_LOCAL_ID",
            Self::UnknownFloor(_) => "E_UNKNOWN_FLOOR",
            Self::UnknownLayer { .. } => "E_UNKNOWN_LAYER",
            Self::Config(_) => "E_CONFIG",
        }
    }
}
