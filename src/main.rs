use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sunspec_rs::logging::{init_logger, log_info};
use sunspec_rs::{decode_models, DecodeOptions, Snapshot};

#[derive(Parser)]
#[command(name = "sunspec-decode")]
#[command(about = "Decode SunSpec model blocks from a register snapshot")]
struct Cli {
    /// JSON snapshot file with `start`, `words` or `hex`, and `models`
    snapshot: PathBuf,

    /// Report inverters and meters with directional quantities reversed
    #[arg(short, long)]
    reversed: bool,

    /// Also report individual AC phases
    #[arg(short, long)]
    phases: bool,

    /// Only decode these model IDs
    #[arg(short, long = "model", value_name = "ID")]
    models: Vec<u16>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let mut snapshot = Snapshot::from_file(&cli.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", cli.snapshot.display()))?;
    if !cli.models.is_empty() {
        snapshot.models.retain(|m| cli.models.contains(&m.id));
    }

    let options = DecodeOptions {
        reversed: cli.reversed,
        phases: cli.phases,
    };
    let decoded = decode_models(&snapshot, options).context("Failed to decode snapshot")?;
    log_info(&format!("Decoded {} model(s)", decoded.len()));

    let output = if cli.pretty {
        serde_json::to_string_pretty(&decoded)?
    } else {
        serde_json::to_string(&decoded)?
    };
    println!("{output}");

    Ok(())
}
