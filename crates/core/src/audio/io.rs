//! Audio I/O: WAV loading into [`Sample`]s, fixture writing, content hashing.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::types::{Sample, SampleFrame};

/// Read a WAV file into a stereo [`Sample`] identified by its path.
///
/// - Normalizes integer PCM to [-1, 1]
/// - Passes through float WAVs
/// - Duplicates mono onto both sides; channels past the second are ignored
pub fn read_wav(path: &Path) -> Result<Sample> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to read WAV samples")?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read WAV samples")?,
    };

    let frames: Vec<SampleFrame> = interleaved
        .chunks_exact(channels)
        .map(|frame| match frame {
            [mono] => SampleFrame::mono(*mono),
            [left, right, ..] => SampleFrame::new(*left, *right),
            [] => SampleFrame::default(),
        })
        .collect();

    log::debug!(
        "Read {} frames ({} ch, {} Hz) from {}",
        frames.len(),
        channels,
        spec.sample_rate,
        path.display()
    );
    Ok(Sample::new(path.display().to_string(), frames))
}

/// Write a sample as 16-bit stereo PCM.
///
/// Clips values to [-1, 1]. Creates parent directories if needed.
pub fn write_wav(path: &Path, sample: &Sample, sample_rate: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for frame in sample.frames() {
        for value in [frame.left, frame.right] {
            writer.write_sample((value.clamp(-1.0, 1.0) * 32767.0) as i16)?;
        }
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// SHA-256 of the file contents as lowercase hex.
///
/// Stable across renames, so it can stand in for the path as a sample
/// identity.
pub fn content_identity(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;
    std::io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to hash file: {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Sample {
        let frames = (0..len)
            .map(|i| {
                let value = i as f32 / len as f32 - 0.5;
                SampleFrame::new(value, -value)
            })
            .collect();
        Sample::new("ramp", frames)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        let sample = ramp(1000);
        write_wav(&path, &sample, 44100).unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(read.len(), 1000);
        assert_eq!(read.identity(), path.display().to_string());

        // 16-bit quantization
        for (a, b) in sample.frames().iter().zip(read.frames()) {
            assert!((a.left - b.left).abs() < 0.001, "{} vs {}", a.left, b.left);
            assert!((a.right - b.right).abs() < 0.001, "{} vs {}", a.right, b.right);
        }
    }

    #[test]
    fn test_write_clips_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let sample = Sample::new("clip", vec![SampleFrame::new(2.0, -2.0)]);
        write_wav(&path, &sample, 8000).unwrap();

        let read = read_wav(&path).unwrap();
        let frame = read.frames()[0];
        assert!(frame.left > 0.99 && frame.left <= 1.0);
        assert!(frame.right < -0.99 && frame.right >= -1.0);
    }

    #[test]
    fn test_read_mono_duplicates_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0i16, 16384, -16384] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(read.frames()[1], SampleFrame::mono(0.5));
        assert_eq!(read.frames()[2], SampleFrame::mono(-0.5));
    }

    #[test]
    fn test_read_float_multichannel_keeps_first_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.wav");
        let spec = WavSpec {
            channels: 4,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0.25f32, -0.75, 0.9, 0.9, 0.1, 0.2, 0.9, 0.9] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(
            read.frames(),
            &[SampleFrame::new(0.25, -0.75), SampleFrame::new(0.1, 0.2)]
        );
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_wav(&dir.path().join("missing.wav")).unwrap_err();
        assert!(format!("{}", err).contains("missing.wav"));
    }

    #[test]
    fn test_content_identity_ignores_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_wav(&a, &ramp(64), 8000).unwrap();
        std::fs::copy(&a, &b).unwrap();
        write_wav(&dir.path().join("c.wav"), &ramp(65), 8000).unwrap();

        let id_a = content_identity(&a).unwrap();
        assert_eq!(id_a.len(), 64);
        assert_eq!(id_a, content_identity(&b).unwrap());
        assert_ne!(id_a, content_identity(&dir.path().join("c.wav")).unwrap());
    }
}
