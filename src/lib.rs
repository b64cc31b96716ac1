//! Distroar - multiband distortion engine
//!
//! A block-based stereo effect that gates, compresses and splits the input
//! into three bands, saturates each band with its own curve and adaptive
//! drive, then recombines, tone-filters and levels the result.
//!
//! # Example
//!
//! ```
//! use distroar::{AudioBuffer, DistortionEngine, EngineParameters};
//!
//! let mut engine = DistortionEngine::new();
//! engine.prepare(48000.0, 256, 2).unwrap();
//!
//! let mut buffer = AudioBuffer::sine_wave(110.0, 0.5, 0.1, 2, 48000);
//! engine.process_buffer(&mut buffer, &EngineParameters::default()).unwrap();
//! assert!(buffer.is_valid());
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;

pub use audio::{AudioBlock, AudioBuffer};
pub use config::EngineConfig;
pub use engine::{DistortionEngine, EngineParameters, EngineState};
pub use error::{DistroarError, Result};
