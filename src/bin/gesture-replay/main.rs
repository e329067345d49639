//! # Gesture Replay
//!
//! Feeds a recorded stream of hand-landmark frames through the gesture engine, against
//! a scene of rectangles taken from the config file, and writes out every interaction
//! event that results. Useful for tuning gesture bindings and thresholds offline.
use std::fs;
use std::io::{self, BufWriter, Write};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use gesture_interaction_engine::engine::GestureEngine;
use gesture_interaction_engine::engine_config::load_config_from_file;
use gesture_interaction_engine::events::{EventFilter, InteractionEvent};
use gesture_interaction_engine::hands::TimedHandFrame;
use gesture_interaction_engine::scene::{ElementRef, RectScene};

mod cli;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    debug!("Started; args: {:?}", cli);

    let config = load_config_from_file(&cli.config_path)?;
    if cli.write_config {
        config.write_config_to_file(&cli.config_path)?;
    }

    let mut engine = GestureEngine::new(&config)?;
    let mut scene = RectScene::new(config.elements());
    info!("Scene has {} elements", scene.elements().len());

    let frames = load_recording(&cli.input_path)?;
    info!("Loaded {} frames from \"{}\"", frames.len(), &cli.input_path);

    let filter = EventFilter::new()
        .kinds(&cli.kinds)
        .target(cli.target.map(ElementRef));

    let mut output: Box<dyn Write> = match &cli.output_path {
        Some(path) => Box::new(BufWriter::new(
            fs::File::create(path).with_context(|| format!("failed to create {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut published = 0;
    let mut written = 0;
    for frame in frames.iter() {
        published += engine.process_frame(&frame.hands, frame.timestamp_ms, &mut scene);
        written += write_events(&mut *output, &filter, scene.drain_events())?;
    }

    // End of the recording counts as losing every hand
    if let Some(last) = frames.last() {
        published += engine.reset(last.timestamp_ms, &mut scene);
        written += write_events(&mut *output, &filter, scene.drain_events())?;
    }
    output.flush()?;

    info!(
        "Replayed {} frames; {} events published, {} written",
        frames.len(),
        published,
        written
    );
    info!("Final view transform: {:?}", engine.view_transform());

    Ok(())
}

fn load_recording(path: &str) -> Result<Vec<TimedHandFrame>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read recording {}", path))?;
    if path.ends_with(".json") {
        serde_json::from_slice(&bytes).map_err(|e| anyhow!("Failed to parse JSON recording: {}", e))
    } else {
        rmp_serde::from_slice(&bytes)
            .map_err(|e| anyhow!("Failed to decode MessagePack recording: {}", e))
    }
}

fn write_events(
    output: &mut dyn Write,
    filter: &EventFilter,
    events: Vec<InteractionEvent>,
) -> Result<usize> {
    let mut count = 0;
    for event in events.iter().filter(|e| filter.matches(e)) {
        serde_json::to_writer(&mut *output, event)?;
        writeln!(output)?;
        count += 1;
    }
    Ok(count)
}
