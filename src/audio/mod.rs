//! Audio containers and offline I/O
//!
//! `AudioBuffer` owns interleaved samples for offline work (file renders,
//! tests). `AudioBlock` is the borrowed view the engine processes on the
//! real-time path.

pub mod block;
pub mod buffer;
pub mod io;
pub mod verification;

pub use block::AudioBlock;
pub use buffer::AudioBuffer;
