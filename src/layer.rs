//! Layer records and the rendering seam.
//!
//! A `Layer` holds the ordered shape ids drawn on it plus the flags the floor
//! system consults when selecting and invalidating. Everything that touches
//! pixels goes through the `LayerCanvas` trait so the composition logic can be
//! exercised without a browser.

use crate::floor::{FloorId, LayerName};
use crate::id::LocalId;

/// Drawing surface backing one layer.
pub trait LayerCanvas {
    /// Mark the surface as needing a redraw on the next paint.
    fn invalidate(&mut self, skip_light_update: bool);
    fn set_alpha(&mut self, alpha: f64);
    /// Show or hide the surface entirely.
    fn set_displayed(&mut self, displayed: bool);
    fn resize(&mut self, width: f64, height: f64);
    fn set_z_index(&mut self, z_index: i32);
    /// Detach and destroy the surface. The layer is discarded right after.
    fn remove(&mut self);
}

/// Builds canvases for layers created from server data.
pub trait CanvasFactory {
    fn create(&mut self, floor: FloorId, layer: LayerName) -> Box<dyn LayerCanvas>;
}

/// Canvas that draws nothing. Used by the replay binary and headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessCanvas;

impl LayerCanvas for HeadlessCanvas {
    fn invalidate(&mut self, _skip_light_update: bool) {}
    fn set_alpha(&mut self, _alpha: f64) {}
    fn set_displayed(&mut self, _displayed: bool) {}
    fn resize(&mut self, _width: f64, _height: f64) {}
    fn set_z_index(&mut self, _z_index: i32) {}
    fn remove(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessCanvases;

impl CanvasFactory for HeadlessCanvases {
    fn create(&mut self, _floor: FloorId, _layer: LayerName) -> Box<dyn LayerCanvas> {
        Box::new(HeadlessCanvas)
    }
}

/// An ordered collection of shapes within one floor.
pub struct Layer {
    name: LayerName,
    pub(crate) floor: FloorId,
    /// Whether the layer participates in layer selection and dimming.
    pub selectable: bool,
    pub player_editable: bool,
    /// Whether the layer renders vision or lighting geometry.
    pub is_vision_layer: bool,
    shapes: Vec<LocalId>,
    canvas: Box<dyn LayerCanvas>,
}

impl Layer {
    /// A selectable layer. The lighting layer is flagged as a vision layer.
    #[must_use]
    pub fn new(floor: FloorId, name: LayerName, canvas: Box<dyn LayerCanvas>) -> Self {
        Self {
            name,
            floor,
            selectable: true,
            player_editable: false,
            is_vision_layer: name == LayerName::Lighting,
            shapes: Vec::new(),
            canvas,
        }
    }

    #[must_use]
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub fn with_player_editable(mut self, player_editable: bool) -> Self {
        self.player_editable = player_editable;
        self
    }

    #[must_use]
    pub fn name(&self) -> LayerName {
        self.name
    }

    #[must_use]
    pub fn floor(&self) -> FloorId {
        self.floor
    }

    /// Shape ids in draw order.
    #[must_use]
    pub fn shapes(&self) -> &[LocalId] {
        &self.shapes
    }

    #[must_use]
    pub fn contains(&self, local: LocalId) -> bool {
        self.shapes.contains(&local)
    }

    pub(crate) fn push_shape(&mut self, local: LocalId) {
        self.shapes.push(local);
    }

    pub(crate) fn remove_shape(&mut self, local: LocalId) -> bool {
        let Some(position) = self.shapes.iter().position(|id| *id == local) else {
            return false;
        };
        self.shapes.remove(position);
        true
    }

    /// Move `local` to `destination` in draw order, clamped to the layer size.
    pub(crate) fn move_shape(&mut self, local: LocalId, destination: usize) -> bool {
        if !self.remove_shape(local) {
            return false;
        }
        let destination = destination.min(self.shapes.len());
        self.shapes.insert(destination, local);
        true
    }

    // --- Canvas delegation ---

    pub fn invalidate(&mut self, skip_light_update: bool) {
        self.canvas.invalidate(skip_light_update);
    }

    pub(crate) fn set_alpha(&mut self, alpha: f64) {
        self.canvas.set_alpha(alpha);
    }

    pub(crate) fn set_displayed(&mut self, displayed: bool) {
        self.canvas.set_displayed(displayed);
    }

    pub(crate) fn resize(&mut self, width: f64, height: f64) {
        self.canvas.resize(width, height);
    }

    pub(crate) fn set_z_index(&mut self, z_index: i32) {
        self.canvas.set_z_index(z_index);
    }

    pub(crate) fn remove_canvas(&mut self) {
        self.canvas.remove();
    }
}
