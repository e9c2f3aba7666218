//! Scene configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DEFAULT_LAYER_INDEX, DIMMED_ALPHA};
use crate::error::SceneError;
use crate::id::Lookup;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    /// Opacity for selectable layers above the active one.
    pub dimmed_alpha: f64,
    /// Layer position activated when the first layer is added.
    pub default_layer_index: usize,
    /// Log a warning when a global id cannot be resolved.
    pub warn_missing_global: bool,
    /// Keep an auxiliary `GlobalId -> LocalId` map instead of scanning.
    pub reverse_index: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dimmed_alpha: DIMMED_ALPHA,
            default_layer_index: DEFAULT_LAYER_INDEX,
            warn_missing_global: true,
            reverse_index: false,
        }
    }
}

impl SceneConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SCENE_DIMMED_ALPHA`: default 0.3, must lie in `0.0..=1.0`
    /// - `SCENE_DEFAULT_LAYER_INDEX`: default 2
    /// - `SCENE_WARN_MISSING_GLOBAL`: default true
    /// - `SCENE_REVERSE_INDEX`: default false
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Config` if the dimmed alpha is out of range.
    pub fn from_env() -> Result<Self, SceneError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparseable values fall back
    /// to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Config` if the dimmed alpha is out of range.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, SceneError> {
        let defaults = Self::default();
        let dimmed_alpha = parse_or(get("SCENE_DIMMED_ALPHA"), defaults.dimmed_alpha);
        if !(0.0..=1.0).contains(&dimmed_alpha) {
            return Err(SceneError::Config(format!("SCENE_DIMMED_ALPHA must be within 0.0..=1.0, got {dimmed_alpha}")));
        }

        Ok(Self {
            dimmed_alpha,
            default_layer_index: parse_or(get("SCENE_DEFAULT_LAYER_INDEX"), defaults.default_layer_index),
            warn_missing_global: flag_or(get("SCENE_WARN_MISSING_GLOBAL"), defaults.warn_missing_global),
            reverse_index: flag_or(get("SCENE_REVERSE_INDEX"), defaults.reverse_index),
        })
    }

    /// Reverse lookup strategy for the identity registry.
    #[must_use]
    pub fn lookup(&self) -> Lookup {
        if self.reverse_index { Lookup::Indexed } else { Lookup::Scan }
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match raw.map(|v| v.trim().parse::<T>()) {
        Some(Ok(value)) => value,
        _ => default,
    }
}

fn flag_or(raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(str::trim) {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
