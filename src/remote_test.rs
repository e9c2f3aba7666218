use std::rc::Rc;

use serde_json::json;

use super::*;
use crate::config::SceneConfig;
use crate::test_helpers::*;

fn event(value: serde_json::Value) -> RemoteEvent {
    serde_json::from_value(value).unwrap()
}

fn create(name: &str, index: usize) -> RemoteEvent {
    event(json!({
        "syscall": "floor:create",
        "data": {
            "name": name,
            "player_visible": true,
            "index": index,
            "layers": [
                {"type_": "map"},
                {"type_": "grid", "selectable": false},
                {"type_": "tokens", "player_editable": true},
                {"type_": "lighting"},
            ],
        },
    }))
}

fn scene() -> (Scene<()>, CanvasLog) {
    let log = new_log();
    let scene = Scene::new(SceneConfig::default()).with_canvases(Box::new(RecordingCanvases { log: Rc::clone(&log) }));
    (scene, log)
}

fn names(scene: &Scene<()>) -> Vec<&str> {
    scene.floors().floors().iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn server_floor_builds_layers_from_flags() {
    let (mut scene, _) = scene();
    scene.apply_remote(create("ground", 0)).unwrap();

    let floor = scene.floors().current_floor().unwrap().id;
    let layers = scene.floors().layers(floor);
    let kinds: Vec<LayerName> = layers.iter().map(Layer::name).collect();
    assert_eq!(kinds, vec![LayerName::Map, LayerName::Grid, LayerName::Tokens, LayerName::Lighting]);
    assert!(!layers[1].selectable);
    assert!(layers[2].player_editable);
    assert!(layers[3].is_vision_layer);
    assert_eq!(scene.floors().current_layer().map(Layer::name), Some(LayerName::Tokens));
}

#[test]
fn first_floor_stays_active_while_others_load_out_of_order() {
    let (mut scene, _) = scene();
    scene.apply_remote(create("second", 1)).unwrap();
    scene.apply_remote(create("third", 2)).unwrap();
    scene.apply_remote(create("first", 0)).unwrap();

    assert_eq!(names(&scene), vec!["first", "second", "third"]);
    assert_eq!(scene.floors().current_floor().map(|f| f.name.as_str()), Some("second"));
    assert_eq!(scene.floors().floor_index(), Some(1));
}

#[test]
fn floor_ids_are_generated_per_floor() {
    let (mut scene, log) = scene();
    let a = scene.add_server_floor(&ServerFloor {
        name: "a".into(),
        player_visible: true,
        kind: FloorType::Air,
        background: None,
        index: None,
        layers: vec![ServerLayer { name: LayerName::Map, selectable: true, player_editable: false }],
    });
    let b = scene.add_server_floor(&ServerFloor {
        name: "b".into(),
        player_visible: false,
        kind: FloorType::Ground,
        background: Some("#000".into()),
        index: None,
        layers: Vec::new(),
    });
    assert_eq!((a, b), (Ok(0), Ok(1)));
    assert_eq!(scene.floors().floor(&FloorRef::Id(0)).map(|f| f.kind), Some(FloorType::Air));
    assert!(log.borrow().iter().any(|e| matches!(e, CanvasEvent::Invalidate { floor: 0, layer: LayerName::Map, .. })));
}

#[test]
fn remote_events_never_echo() {
    let (mut scene, _) = scene();
    scene.floors_mut().set_permissions(Box::new(true));
    let events = vec![
        create("a", 0),
        create("b", 1),
        event(json!({"syscall": "floor:rename", "data": {"index": 1, "name": "upper"}})),
        event(json!({"syscall": "floor:visible", "data": {"name": "upper", "visible": false}})),
        event(json!({"syscall": "floor:type", "data": {"name": "upper", "floor_type": "air"}})),
        event(json!({"syscall": "floor:background", "data": {"name": "upper", "background": "#111"}})),
        event(json!({"syscall": "layer:active", "data": {"floor": "upper", "layer": "map"}})),
        event(json!({"syscall": "floor:reorder", "data": {"floors": ["upper", "a"]}})),
        event(json!({"syscall": "floor:remove", "data": {"name": "a"}})),
    ];
    for e in events {
        scene.apply_remote(e).unwrap();
    }

    assert!(scene.drain_sync().is_empty());
    let upper = scene.floors().floor(&FloorRef::name("upper")).unwrap();
    assert!(!upper.player_visible);
    assert_eq!(upper.kind, FloorType::Air);
    assert_eq!(upper.background.as_deref(), Some("#111"));
    assert_eq!(names(&scene), vec!["upper"]);
    assert_eq!(scene.floors().current_layer().map(Layer::name), Some(LayerName::Map));
}

#[test]
fn layer_activation_selects_the_floor_first() {
    let (mut scene, _) = scene();
    scene.apply_remote(create("a", 0)).unwrap();
    scene.apply_remote(create("b", 1)).unwrap();
    scene
        .apply_remote(RemoteEvent::SelectLayer { floor: "b".into(), layer: LayerName::Lighting })
        .unwrap();

    assert_eq!(scene.floors().floor_index(), Some(1));
    assert_eq!(scene.floors().layer_index(), Some(3));
}

#[test]
fn events_for_unknown_floors_are_rejected() {
    let (mut scene, _) = scene();
    scene.apply_remote(create("a", 0)).unwrap();

    let missing = SceneError::UnknownFloor(FloorRef::name("zz"));
    assert_eq!(scene.apply_remote(RemoteEvent::RemoveFloor { name: "zz".into() }), Err(missing.clone()));
    assert_eq!(
        scene.apply_remote(RemoteEvent::SelectLayer { floor: "zz".into(), layer: LayerName::Map }),
        Err(missing)
    );
    assert!(scene.apply_remote(RemoteEvent::RenameFloor { index: 4, name: "x".into() }).is_err());
    assert_eq!(names(&scene), vec!["a"]);
}

#[test]
fn event_wire_format_uses_syscall_names() {
    let json = serde_json::to_value(RemoteEvent::RemoveFloor { name: "a".into() }).unwrap();
    assert_eq!(json, json!({"syscall": "floor:remove", "data": {"name": "a"}}));

    let parsed = event(json!({"syscall": "floor:create", "data": {"name": "bare"}}));
    let RemoteEvent::CreateFloor(floor) = parsed else {
        panic!("expected floor:create");
    };
    assert!(!floor.player_visible);
    assert_eq!(floor.kind, FloorType::Ground);
    assert!(floor.layers.is_empty());
    assert_eq!(floor.index, None);
}
