//! `xela-viz` – renders a recorded Xela hand session to images and a video.
//!
//! Commands:
//!
//! - `run [ARCHIVE]` (default) – bias, convert and render every frame of the
//!   session archive, then encode the video.
//! - `encode` – re-encode the frame images already in the output directory.
//! - `init` – write the default configuration to `~/.xela/config.toml`.
//! - `help` – list the commands.

mod config;

use colored::Colorize;
use std::path::PathBuf;
use tracing::{error, info};

use config::VisualizerConfig;
use xela_pipeline::{FfmpegEncoder, Sequencer, load_frames};
use xela_topology::TopologyResolver;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info"); XELA_LOG_FORMAT=json
    // switches to newline-delimited JSON.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("XELA_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("run") => cmd_run(args.get(1).map(PathBuf::from)),
        Some("encode") => cmd_encode(),
        Some("init") => cmd_init(),
        Some("help" | "--help" | "-h") => {
            print_help();
            Ok(())
        }
        Some(other) => Err(format!("unknown command `{other}`; try `xela-viz help`")),
    };

    if let Err(e) = result {
        error!(error = %e, "visualization failed");
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_run(archive: Option<PathBuf>) -> Result<(), String> {
    let mut cfg = load_config();
    if let Some(path) = archive {
        cfg.input = path;
    }
    let sequencer = build_sequencer(&cfg)?;

    println!("  Reading session from {}", cfg.input.display().to_string().bold());
    let frames = load_frames(&cfg.input).map_err(|e| e.to_string())?;
    let summary = sequencer.run(&frames).map_err(|e| e.to_string())?;

    println!(
        "  {} {} frames written to {}",
        "✓".green().bold(),
        summary.artifacts.len(),
        cfg.output_dir.display().to_string().bold()
    );
    println!(
        "  {} video saved to {}",
        "✓".green().bold(),
        summary.video.display().to_string().bold()
    );
    Ok(())
}

fn cmd_encode() -> Result<(), String> {
    let cfg = load_config();
    let summary = build_sequencer(&cfg)?
        .encode_existing()
        .map_err(|e| e.to_string())?;
    println!(
        "  {} {} frames encoded to {}",
        "✓".green().bold(),
        summary.artifacts.len(),
        summary.video.display().to_string().bold()
    );
    Ok(())
}

fn cmd_init() -> Result<(), String> {
    let path = config::config_path();
    if path.exists() {
        println!(
            "  {} already exists; leaving it untouched.",
            path.display().to_string().bold()
        );
        return Ok(());
    }
    config::save(&VisualizerConfig::default())?;
    println!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn print_help() {
    println!();
    println!(
        "  {} {}",
        "xela-viz".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Tactile hand session visualizer");
    println!();
    println!("  {}  render a session archive and encode the video", "run [ARCHIVE]".bold().cyan());
    println!("  {}         re-encode existing frame images", "encode".bold().cyan());
    println!("  {}           write the default config", "init".bold().cyan());
    println!("  {}           show this list", "help".bold().cyan());
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_config() -> VisualizerConfig {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = VisualizerConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = VisualizerConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

/// Resolve the configured hand and check it agrees with `total_taxels`.
fn build_sequencer(cfg: &VisualizerConfig) -> Result<Sequencer<FfmpegEncoder>, String> {
    let topology = xela_topology::for_hand(cfg.hand).map_err(|e| e.to_string())?;
    check_taxels(cfg, topology.as_ref())?;
    info!(hand = %cfg.hand, taxels = cfg.total_taxels, "topology resolved");
    Sequencer::new(topology.as_ref(), cfg.sequencer(), cfg.encoder()).map_err(|e| e.to_string())
}

fn check_taxels(cfg: &VisualizerConfig, topology: &dyn TopologyResolver) -> Result<(), String> {
    if cfg.total_taxels != topology.total_taxels() {
        return Err(format!(
            "total_taxels = {} but the {} hand has {} taxels",
            cfg.total_taxels,
            cfg.hand,
            topology.total_taxels()
        ));
    }
    Ok(())
}
