use anyhow::{Context, bail};
use env_logger::Builder;
use log::{LevelFilter, info, warn};

use wban_relay_placement::load_scene;
use wban_relay_placement::simulation::types::{Evaluation, RouteType};

const USAGE: &str = "usage: wban-relay-placement <scene.json|scene.toml> <x1> <y1> [<x2> <y2> ...]";

fn main() -> anyhow::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("wban_relay_placement"), LevelFilter::Debug)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((scene_path, coordinates)) = args.split_first() else {
        bail!(USAGE);
    };
    let vector = coordinates
        .iter()
        .map(|c| c.parse::<f64>().with_context(|| format!("Invalid coordinate '{}'", c)))
        .collect::<anyhow::Result<Vec<f64>>>()?;

    let scene = load_scene(scene_path)?;
    let model = scene.build_model();
    info!("Loaded scene {}: {} relays, {} sensors", scene_path, model.n_relays(), model.sensors().len());

    let evaluation = model.evaluate(&vector).context("Candidate does not match the scene")?;
    info!("Fitness: {:.6}", model.scalarize(&evaluation));

    match evaluation {
        Evaluation::Valid(metrics) => {
            info!("Energy: {:.3e} J per cycle", metrics.energy_j);
            info!("Delay: {:.2} ms total, {:.2} ms per sensor", metrics.delay_s * 1000.0, metrics.delay_s * 1000.0 / model.sensors().len().max(1) as f64);
            info!("Min link margin: {:.2} dB", metrics.min_margin_db);
            info!("Relay load std: {:.3}", metrics.load_std);
        }
        Evaluation::Violation(violation) => warn!("Placement rejected: {}", violation),
    }

    for relay in model.summarize_relays(&vector)? {
        info!(
            "Relay {}: X={:.1}, Y={:.1} cm, zone {} ({}), {:.1} cm to hub",
            relay.index + 1,
            relay.position.x,
            relay.position.y,
            relay.zone.as_deref().unwrap_or("off-body"),
            relay.propagation_class,
            relay.distance_to_hub_cm
        );
    }

    for segment in model.routing_details(&vector)? {
        let kind = match segment.route_type {
            RouteType::Direct => "direct".to_string(),
            RouteType::Relayed { relay_index } => format!("via relay {}", relay_index + 1),
        };
        info!(
            "{}: ({:.1}, {:.1}) -> ({:.1}, {:.1}) {}",
            segment.sensor, segment.from.x, segment.from.y, segment.to.x, segment.to.y, kind
        );
    }

    Ok(())
}
