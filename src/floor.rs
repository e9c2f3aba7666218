//! Floor records, floor references and the fixed set of layer roles.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "floor_test.rs"]
mod floor_test;

/// Small integer floor identifier, unique within a session.
pub type FloorId = u32;

/// Role of a layer within a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerName {
    /// Background map imagery.
    Map,
    /// Grid overlay.
    Grid,
    /// Player and monster tokens.
    Tokens,
    /// Game-master-only annotations.
    Dm,
    /// Fog of war and light sources.
    Lighting,
    /// Temporary drawings and tool previews.
    Draw,
}

impl LayerName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Grid => "grid",
            Self::Tokens => "tokens",
            Self::Dm => "dm",
            Self::Lighting => "lighting",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of floor. Changing it is a privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorType {
    #[default]
    Ground,
    Air,
}

/// One stackable level of the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
    pub player_visible: bool,
    #[serde(rename = "type_")]
    pub kind: FloorType,
    /// Background fill or pattern, if any.
    pub background: Option<String>,
}

impl Floor {
    /// A player-visible ground floor without background.
    #[must_use]
    pub fn new(id: FloorId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), player_visible: true, kind: FloorType::Ground, background: None }
    }
}

/// The three ways callers address a floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorRef {
    Name(String),
    Id(FloorId),
    Position(usize),
}

impl FloorRef {
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl fmt::Display for FloorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name {name:?}"),
            Self::Id(id) => write!(f, "id {id}"),
            Self::Position(position) => write!(f, "position {position}"),
        }
    }
}
