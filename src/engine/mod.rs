//! Distortion engine
//!
//! The pipeline controller that owns every DSP stage and runs them in order
//! over each block:
//! - Lifecycle and bypass state machine
//! - Per-block parameter sampling
//! - Scratch buffers for the band split and the blend reference

pub mod params;
mod pipeline;

pub use params::EngineParameters;
pub use pipeline::{DistortionEngine, EngineState, MAX_CHANNELS};
