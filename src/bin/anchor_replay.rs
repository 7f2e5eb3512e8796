use clap::Parser;
use crossbeam_channel::Receiver;
use geo_anchor_ring::io::{object_from_json, write_replay_report};
use geo_anchor_ring::store::{AnchorStore, JsonFileStore, MemoryStore, PersistenceWorker};
use geo_anchor_ring::visualization::log_frame;
use geo_anchor_ring::{Anchor, AnchorScene, FrameInputs, RING_CAPACITY, SceneConfig};
use serde::Deserialize;
use std::time::Instant;

#[derive(Parser)]
#[command(version, about, author)]
struct AnchorReplayCli {
    /// path to scenario json: [{"place": anchor} | {"frame": inputs}, ...]
    scenario: String,

    /// scene config json
    #[arg(short, long)]
    config: Option<String>,

    /// json anchor store, kept in memory when omitted
    #[arg(short, long)]
    store: Option<String>,

    /// output report path
    #[arg(short, long, default_value = "replay.json")]
    output: String,

    /// override the proximity threshold in meters
    #[arg(long)]
    threshold: Option<f64>,

    /// draw every anchor regardless of distance
    #[arg(long, default_value_t = false)]
    no_proximity: bool,

    /// save a rerun recording to this .rrd path
    #[arg(long)]
    rerun: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScenarioEvent {
    Place(Anchor),
    Frame(FrameInputs),
}

fn start_persistence<S: AnchorStore + 'static>(
    mut store: S,
    scene: &AnchorScene,
    queue_depth: usize,
) -> Result<(PersistenceWorker, Receiver<Vec<Anchor>>), Box<dyn std::error::Error>> {
    let subscription = store.subscribe();
    let outcome = scene.refresh(store.latest(RING_CAPACITY)?);
    log::info!("restored ring from store: {:?}", outcome);
    let worker = PersistenceWorker::spawn(store, queue_depth)?;
    Ok((worker, subscription))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = AnchorReplayCli::parse();

    let mut config: SceneConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => SceneConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.proximity_threshold_meters = Some(threshold);
    }
    if cli.no_proximity {
        config.proximity_threshold_meters = None;
    }
    let events: Vec<ScenarioEvent> = object_from_json(&cli.scenario)?;

    let scene = AnchorScene::new(&config);
    let (worker, subscription) = match &cli.store {
        Some(path) => start_persistence(
            JsonFileStore::open(path)?,
            &scene,
            config.persistence_queue_depth,
        )?,
        None => start_persistence(MemoryStore::new(), &scene, config.persistence_queue_depth)?,
    };
    let mut scene = scene.with_persistence(worker);

    let recording = match &cli.rerun {
        Some(path) => Some(rerun::RecordingStreamBuilder::new("anchor_replay").save(path)?),
        None => None,
    };

    let now = Instant::now();
    let mut outputs = Vec::new();
    let mut placements = 0;
    for event in events {
        match event {
            ScenarioEvent::Place(anchor) => {
                let outcome = scene.on_place(anchor)?;
                placements += 1;
                log::debug!("{:?}", outcome.event);
            }
            ScenarioEvent::Frame(inputs) => {
                scene.drain_refreshes(&subscription);
                let output = scene.on_frame(&inputs);
                if let Some(recording) = &recording {
                    log_frame(recording, "/world", outputs.len(), &output)?;
                }
                outputs.push(output);
            }
        }
    }

    let persistence_failures = match scene.take_persistence() {
        Some(mut worker) => {
            worker.shutdown();
            worker.failures()
        }
        None => 0,
    };
    let duration_sec = now.elapsed().as_secs_f64();
    log::info!(
        "replayed {} placements and {} frames in {:.6} sec",
        placements,
        outputs.len(),
        duration_sec
    );

    write_replay_report(&cli.output, placements, persistence_failures, &outputs)?;
    println!("wrote {}", cli.output);
    Ok(())
}
