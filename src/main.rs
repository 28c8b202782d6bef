//! snapsheet - scenario replay harness

use clap::Parser;
use snapsheet::simulation::Scenario;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Replay a bottom-sheet scenario and print the lifecycle transcript
#[derive(Parser, Debug)]
#[command(name = "snapsheet")]
#[command(version)]
#[command(about = "Replay a TOML sheet scenario on a virtual clock and print what the host observed")]
pub struct Args {
    /// Path to the scenario TOML file
    pub scenario: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Replace every animation with a jump
    #[arg(long)]
    pub reduced_motion: bool,

    /// Print one JSON object per transcript entry
    #[arg(long)]
    pub json: bool,

    /// Write logs here instead of the configured path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = snapsheet::config::load_config_with_precedence(args.config.clone())?;
        let merged = snapsheet::config::merge_config(config_file);
        let with_env = snapsheet::config::apply_env_overrides(merged);
        let reduced_motion_override = if args.reduced_motion { Some(true) } else { None };
        snapsheet::config::apply_cli_overrides(
            with_env,
            reduced_motion_override,
            args.log_file.clone(),
        )
    };

    snapsheet::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let scenario = Scenario::load(&args.scenario)?;
    let transcript = scenario.run(&config);

    let mut stdout = std::io::stdout().lock();
    if args.json {
        stdout.write_all(transcript.to_json_lines()?.as_bytes())?;
    } else {
        write!(stdout, "{transcript}")?;
    }
    stdout.flush()?;

    if let Some(error) = transcript.fatal() {
        return Err(format!("scenario ended with a fatal error: {error}").into());
    }
    Ok(())
}
