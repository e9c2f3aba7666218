//! Recording doubles for the canvas and vision seams, plus floor fixtures.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SceneConfig;
use crate::floor::{Floor, FloorId, LayerName};
use crate::floors::{FloorSystem, TriangulationTarget, VisionSystem};
use crate::layer::{CanvasFactory, Layer, LayerCanvas};

/// Everything a recording canvas was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    Invalidate { floor: FloorId, layer: LayerName, skip_light: bool },
    Alpha { floor: FloorId, layer: LayerName, alpha: f64 },
    Displayed { floor: FloorId, layer: LayerName, displayed: bool },
    Resized { floor: FloorId, layer: LayerName, width: f64, height: f64 },
    ZIndex { floor: FloorId, layer: LayerName, z_index: i32 },
    Removed { floor: FloorId, layer: LayerName },
}

pub type CanvasLog = Rc<RefCell<Vec<CanvasEvent>>>;

pub struct RecordingCanvas {
    floor: FloorId,
    layer: LayerName,
    log: CanvasLog,
}

impl RecordingCanvas {
    pub fn new(floor: FloorId, layer: LayerName, log: &CanvasLog) -> Self {
        Self { floor, layer, log: Rc::clone(log) }
    }

    fn record(&self, event: CanvasEvent) {
        self.log.borrow_mut().push(event);
    }
}

impl LayerCanvas for RecordingCanvas {
    fn invalidate(&mut self, skip_light_update: bool) {
        self.record(CanvasEvent::Invalidate { floor: self.floor, layer: self.layer, skip_light: skip_light_update });
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.record(CanvasEvent::Alpha { floor: self.floor, layer: self.layer, alpha });
    }

    fn set_displayed(&mut self, displayed: bool) {
        self.record(CanvasEvent::Displayed { floor: self.floor, layer: self.layer, displayed });
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.record(CanvasEvent::Resized { floor: self.floor, layer: self.layer, width, height });
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.record(CanvasEvent::ZIndex { floor: self.floor, layer: self.layer, z_index });
    }

    fn remove(&mut self) {
        self.record(CanvasEvent::Removed { floor: self.floor, layer: self.layer });
    }
}

/// Canvas factory handing out canvases that share one log.
pub struct RecordingCanvases {
    pub log: CanvasLog,
}

impl CanvasFactory for RecordingCanvases {
    fn create(&mut self, floor: FloorId, layer: LayerName) -> Box<dyn LayerCanvas> {
        Box::new(RecordingCanvas::new(floor, layer, &self.log))
    }
}

/// Vision calls as `(method, target, floor)`.
pub type VisionLog = Rc<RefCell<Vec<(&'static str, Option<TriangulationTarget>, FloorId)>>>;

pub struct RecordingVision {
    pub log: VisionLog,
}

impl VisionSystem for RecordingVision {
    fn remove_cdt(&mut self, floor: FloorId) {
        self.log.borrow_mut().push(("remove_cdt", None, floor));
    }

    fn remove_blockers(&mut self, target: TriangulationTarget, floor: FloorId) {
        self.log.borrow_mut().push(("remove_blockers", Some(target), floor));
    }
}

pub fn new_log() -> CanvasLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn recording_layer(floor: FloorId, name: LayerName, log: &CanvasLog) -> Layer {
    Layer::new(floor, name, Box::new(RecordingCanvas::new(floor, name, log)))
}

/// A floor system with default config.
pub fn floor_system() -> FloorSystem {
    FloorSystem::new(&SceneConfig::default())
}

/// Append a floor carrying `[map, grid, tokens, lighting]` and return its id.
pub fn add_standard_floor(system: &mut FloorSystem, log: &CanvasLog, name: &str) -> FloorId {
    add_floor_with_layers(system, log, name, &[LayerName::Map, LayerName::Grid, LayerName::Tokens, LayerName::Lighting])
}

pub fn add_floor_with_layers(system: &mut FloorSystem, log: &CanvasLog, name: &str, layers: &[LayerName]) -> FloorId {
    let id = system.generate_floor_id();
    system.add_floor(Floor::new(id, name), None);
    for layer in layers {
        assert!(system.add_layer(recording_layer(id, *layer, log), id).is_ok());
    }
    id
}

/// `(floor, layer)` of every invalidation recorded so far, in call order.
pub fn invalidations(log: &CanvasLog) -> Vec<(FloorId, LayerName)> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::Invalidate { floor, layer, .. } => Some((*floor, *layer)),
            _ => None,
        })
        .collect()
}

/// Most recent alpha set on a layer.
pub fn last_alpha(log: &CanvasLog, floor: FloorId, layer: LayerName) -> Option<f64> {
    log.borrow().iter().rev().find_map(|event| match event {
        CanvasEvent::Alpha { floor: f, layer: l, alpha } if *f == floor && *l == layer => Some(*alpha),
        _ => None,
    })
}

/// Most recent display flag set on a layer.
pub fn last_displayed(log: &CanvasLog, floor: FloorId, layer: LayerName) -> Option<bool> {
    log.borrow().iter().rev().find_map(|event| match event {
        CanvasEvent::Displayed { floor: f, layer: l, displayed } if *f == floor && *l == layer => Some(*displayed),
        _ => None,
    })
}
