//! Replay a recorded stream of server floor events against a headless scene
//! and print the resulting floor stack.
//!
//! Usage: `tabletop-scene <events.json>` where the file holds a JSON array of
//! `{"syscall": ..., "data": ...}` objects. Configuration comes from the
//! `SCENE_*` environment variables.

use std::process::ExitCode;

use tabletop_scene::config::SceneConfig;
use tabletop_scene::error::ErrorCode;
use tabletop_scene::remote::RemoteEvent;
use tabletop_scene::scene::Scene;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: tabletop-scene <events.json>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, %path, "replay failed");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = SceneConfig::from_env()?;
    let raw = std::fs::read_to_string(path)?;
    let events: Vec<RemoteEvent> = serde_json::from_str(&raw)?;
    tracing::info!(count = events.len(), %path, "replaying events");

    let mut scene: Scene<()> = Scene::new(config);
    let mut rejected = 0usize;
    for (position, event) in events.into_iter().enumerate() {
        if let Err(e) = scene.apply_remote(event) {
            rejected += 1;
            tracing::warn!(position, error = %e, code = e.error_code(), "event rejected");
        }
    }

    let floors = scene.floors();
    for (position, floor) in floors.floors().iter().enumerate() {
        let marker = if floors.floor_index() == Some(position) { '*' } else { ' ' };
        let layers: Vec<&str> = floors.layers(floor.id).iter().map(|l| l.name().as_str()).collect();
        println!("{marker} {position}: {} [{}]", floor.name, layers.join(", "));
    }
    match floors.current_layer() {
        Some(layer) => println!("active layer: {}", layer.name()),
        None => println!("active layer: none"),
    }
    tracing::info!(rejected, "replay finished");
    Ok(())
}
