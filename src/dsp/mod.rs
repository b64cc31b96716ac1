//! DSP building blocks
//!
//! Every stage of the distortion chain lives here. Stateful stages implement
//! the `Effect` trait; the stateless band helpers in `shaper` and `mix`
//! operate on plain slices.

pub mod compressor;
pub mod crossover;
mod effect;
pub mod envelope;
pub mod filter;
mod gain;
pub mod gate;
pub mod mix;
pub mod shaper;
pub mod tone;

pub use compressor::{Compressor, CompressorSettings};
pub use crossover::Crossover;
pub use effect::{Effect, ProcessSpec};
pub use envelope::EnvelopeFollower;
pub use filter::{BiquadCoeffs, FilterKind, LinkwitzRiley};
pub use gain::Gain;
pub use gate::{Gate, GateSettings};
pub use shaper::{BandShaper, CabinetSettings, CabinetSim};
pub use tone::ToneFilter;

pub use crate::audio::verification::{db_to_linear, linear_to_db};
