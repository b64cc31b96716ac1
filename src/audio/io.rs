//! Audio file I/O operations
//!
//! Handles loading and saving WAV files using the hound crate.

use super::AudioBuffer;
use crate::error::{DistroarError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Load a WAV file into an AudioBuffer
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let read_error = |source: hound::Error| DistroarError::AudioReadError {
        path: path.display().to_string(),
        source,
    };

    let reader = WavReader::open(path).map_err(read_error)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(read_error))
            .collect::<Result<Vec<f32>>>()?,
        SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val).map_err(read_error))
                .collect::<Result<Vec<f32>>>()?
        }
    };

    AudioBuffer::from_interleaved(samples, spec.channels as usize, spec.sample_rate)
}

/// Save an AudioBuffer to a WAV file (32-bit float)
pub fn save_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source: hound::Error| DistroarError::AudioWriteError {
        path: path.display().to_string(),
        source,
    };

    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_error)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample).map_err(write_error)?;
    }
    writer.finalize().map_err(write_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wav_round_trip_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.5, 0.25, 2, 44100);
        save_wav(&original, &path).unwrap();

        let loaded = load_wav(&path).unwrap();
        assert_eq!(original.num_channels(), loaded.num_channels());
        assert_eq!(original.sample_rate(), loaded.sample_rate());
        assert_eq!(original.num_frames(), loaded.num_frames());
        assert!(original.is_approx_equal(&loaded, 1e-6));
    }

    #[test]
    fn test_load_16bit_int() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("int.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(16384i16).unwrap();
        writer.write_sample(-32768i16).unwrap();
        writer.finalize().unwrap();

        let loaded = load_wav(&path).unwrap();
        assert_eq!(loaded.samples(), &[0.5, -1.0]);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_wav("nonexistent_file.wav");
        assert!(matches!(result, Err(DistroarError::AudioReadError { .. })));
    }
}
