//! Distroar CLI - offline renderer
//!
//! Command-line interface for the distortion engine.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use distroar::cli::commands::{defaults_json, render};
use distroar::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Distroar v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Render(args) => {
            let summary = render(&args).with_context(|| format!("failed to render {}", args.input.display()))?;
            println!(
                "Rendered {} frames ({} ch @ {} Hz) to {}",
                summary.frames,
                summary.channels,
                summary.sample_rate,
                args.output.display()
            );
            println!(
                "  input:  rms {:.1} dB, peak {:.1} dB",
                summary.input.rms_db, summary.input.peak_db
            );
            println!(
                "  output: rms {:.1} dB, peak {:.1} dB",
                summary.output.rms_db, summary.output.peak_db
            );
        }
        Commands::Defaults => {
            println!("{}", defaults_json().context("failed to serialize defaults")?);
        }
    }

    Ok(())
}
