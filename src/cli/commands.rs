//! CLI Command Implementations

use log::{debug, info};

use super::RenderArgs;
use crate::audio::io::{load_wav, save_wav};
use crate::audio::verification::LevelReport;
use crate::config::EngineConfig;
use crate::engine::{DistortionEngine, EngineParameters};
use crate::error::{DistroarError, Result};

/// Outcome of a render, for reporting
#[derive(Debug, Clone, Copy)]
pub struct RenderSummary {
    pub frames: usize,
    pub channels: usize,
    pub sample_rate: u32,
    pub input: LevelReport,
    pub output: LevelReport,
}

/// Build the block parameters from a style, a preset file and flag overrides
pub fn resolve_parameters(args: &RenderArgs) -> Result<EngineParameters> {
    let mut params = match &args.style {
        Some(name) => EngineParameters::preset(name).ok_or_else(|| DistroarError::InvalidConfig {
            param: "style".to_string(),
            value: name.clone(),
            expected: "default, crunch or high-gain".to_string(),
        })?,
        None => EngineParameters::default(),
    };

    if let Some(path) = &args.preset {
        debug!("Loading preset: {}", path.display());
        params = EngineParameters::from_file(path)?;
    }

    if let Some(volume) = args.volume {
        params.volume = volume;
    }
    if let Some(blend) = args.blend {
        params.blend = blend;
    }
    if let Some(drive) = args.drive {
        params.drive = drive;
    }
    if let Some(tone) = args.tone {
        params.tone_cutoff_hz = tone;
    }
    if let Some(gate) = args.gate {
        params.gate_threshold_db = gate;
    }
    if args.bypass {
        params.enabled = false;
    }

    Ok(params.clamped())
}

/// Load the engine configuration, falling back to the shipped tuning
pub fn resolve_config(args: &RenderArgs) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => {
            debug!("Loading engine config: {}", path.display());
            EngineConfig::from_file(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Render `args.input` through the engine into `args.output`.
pub fn render(args: &RenderArgs) -> Result<RenderSummary> {
    let params = resolve_parameters(args)?;
    let config = resolve_config(args)?;

    info!("Rendering {} -> {}", args.input.display(), args.output.display());
    let mut buffer = load_wav(&args.input)?;
    let input = LevelReport::measure(buffer.samples());

    let mut engine = DistortionEngine::with_config(config);
    engine.prepare(buffer.sample_rate() as f64, args.block_size, buffer.num_channels())?;
    engine.process_buffer(&mut buffer, &params)?;

    save_wav(&buffer, &args.output)?;
    let summary = RenderSummary {
        frames: buffer.num_frames(),
        channels: buffer.num_channels(),
        sample_rate: buffer.sample_rate(),
        input,
        output: LevelReport::measure(buffer.samples()),
    };
    info!(
        "Rendered {} frames, peak {:.1} dB -> {:.1} dB",
        summary.frames, summary.input.peak_db, summary.output.peak_db
    );
    Ok(summary)
}

/// JSON document with the default parameters and engine configuration.
pub fn defaults_json() -> Result<String> {
    let document = serde_json::json!({
        "parameters": EngineParameters::default(),
        "config": EngineConfig::default(),
    });
    Ok(serde_json::to_string_pretty(&document)?)
}
