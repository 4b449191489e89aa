//! # Delve Main Entry Point
//!
//! Parses the command line, builds the game state, and runs the fixed-rate
//! tick loop with macroquad rendering.

use clap::Parser;
use delve::{
    DelveResult, GameConfig, GameState, GeneratorVariant, InputHandler, Keypresses,
    MacroquadDisplay,
};
use log::{error, info};
use macroquad::prelude::*;
use std::path::PathBuf;

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "A small dungeon crawl with procedural levels and fog of war")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level generator: rooms or maze
    #[arg(long)]
    variant: Option<GeneratorVariant>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[macroquad::main("Delve")]
async fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    if let Err(e) = run_game(&args).await {
        error!("Game ended with an error: {}", e);
    }
}

/// Initializes `env_logger` with the given filter.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .format_target(false)
        .init();
}

/// Builds the run configuration from the config file and CLI overrides.
fn build_config(args: &Args) -> GameConfig {
    let seed = args.seed.unwrap_or(12345);
    let mut config = GameConfig::load_or_default(args.config.as_deref(), seed);
    if let Some(seed) = args.seed {
        config.generation.seed = seed;
    }
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    config
}

/// Main game loop: one tick per `tick_seconds`, one frame per display refresh.
async fn run_game(args: &Args) -> DelveResult<()> {
    let config = build_config(args);
    info!(
        "Generating {} dungeon with seed {}",
        config.variant, config.generation.seed
    );

    request_new_screen_size(1024.0, 768.0);

    let tick_seconds = config.tick_seconds;
    let mut game_state = GameState::new(config)?;
    let input_handler = InputHandler::new();
    let mut display = MacroquadDisplay::new();

    display.add_message("Welcome to Delve!".to_string());
    display.add_message("Find the ladder to descend.".to_string());

    let mut snapshot = game_state.snapshot();
    let mut accumulator = 0.0;
    // Keys held at any point since the last tick.
    let mut held = Keypresses::new();

    while !game_state.is_finished() {
        accumulator += get_frame_time();
        held.merge(&input_handler.poll());

        if accumulator >= tick_seconds {
            accumulator -= tick_seconds;
            snapshot = game_state.tick(&held)?;
            held = Keypresses::new();

            let events = game_state.process_events()?;
            for message in events.iter().filter_map(|event| event.describe()) {
                display.add_message(message);
            }
            if !events.is_empty() {
                // Events may have swapped the level under the snapshot.
                snapshot = game_state.snapshot();
            }
        }

        display.render(&snapshot)?;
        next_frame().await;
    }

    let stats = &game_state.statistics;
    info!(
        "Game over after {} turns: depth {}, {} kills, {} deaths",
        game_state.turn_number, stats.max_depth_reached, stats.enemies_defeated, stats.deaths
    );
    Ok(())
}
