//! Shared numeric constants for the scene crate.

// ── Layers ──────────────────────────────────────────────────────

/// Layer position made active when the first layer of a session is added.
/// Floors are built as `[map, grid, tokens, ...]`, so this lands on tokens.
pub const DEFAULT_LAYER_INDEX: usize = 2;

/// Opacity for selectable layers stacked above the active layer.
pub const DIMMED_ALPHA: f64 = 0.3;

/// Opacity for the active layer, everything beneath it, and lighting.
pub const FULL_ALPHA: f64 = 1.0;
