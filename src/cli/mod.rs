//! CLI Module
//!
//! Offline front end for the distortion engine: renders WAV files block by
//! block the way a host would.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Distroar - multiband distortion renderer
#[derive(Parser, Debug)]
#[command(name = "distroar-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a WAV file through the engine
    #[command(name = "render")]
    Render(RenderArgs),

    /// Print the default parameters and engine configuration as JSON
    #[command(name = "defaults")]
    Defaults,
}

/// Options for `render`
///
/// Explicit parameter flags override values from `--style` and `--preset`.
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Input WAV file (mono or stereo)
    pub input: PathBuf,

    /// Output WAV file (32-bit float)
    pub output: PathBuf,

    /// Output volume (0 to 1)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Distorted/clean blend (0 = clean, 1 = fully distorted)
    #[arg(long)]
    pub blend: Option<f32>,

    /// Drive amount (0 to 1)
    #[arg(long)]
    pub drive: Option<f32>,

    /// Tone low-pass cutoff in Hz (600 to 20000)
    #[arg(long)]
    pub tone: Option<f32>,

    /// Gate threshold in dB (-90 to 0)
    #[arg(long)]
    pub gate: Option<f32>,

    /// Pass audio through untouched
    #[arg(long)]
    pub bypass: bool,

    /// Built-in parameter set: default, crunch, high-gain
    #[arg(long)]
    pub style: Option<String>,

    /// JSON parameter preset file
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// JSON engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Frames per processing block
    #[arg(long, default_value_t = 512)]
    pub block_size: usize,
}
