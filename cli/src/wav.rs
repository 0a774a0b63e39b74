use castape_core::{SampleBuffer, SampleFormat};
use hound::{WavReader, WavSpec, WavWriter};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV error: {0}")]
    Hound(#[from] hound::Error),

    #[error("Unsupported WAV layout: {0}")]
    Unsupported(String),
}

/// hound centres 8-bit samples on zero; the codec works on the unsigned levels
fn unsigned_offset(bits_per_sample: u16) -> i32 {
    if bits_per_sample == 8 {
        128
    } else {
        0
    }
}

/// Left shift that lifts a right-justified sample onto the signed 32-bit range
///
/// 8, 16 and 32-bit files keep their native levels; any other depth (24-bit in
/// practice) is read through the 32-bit level range.
fn justify_shift(bits_per_sample: u16) -> u32 {
    match bits_per_sample {
        8 | 16 | 32 => 0,
        bits => 32u32.saturating_sub(bits as u32),
    }
}

/// Read a whole WAV file into memory as mono amplitude samples
///
/// 8, 16 and 32-bit integer files keep their native levels; other integer
/// depths are left-justified to 32 bits. Float files are rescaled to 16-bit
/// levels. Only the first channel of a multi-channel file is kept.
pub fn read_wav(path: &Path) -> Result<SampleBuffer, WavError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    if channels == 0 {
        return Err(WavError::Unsupported("no channels".to_string()));
    }
    if channels > 1 {
        log::warn!("{} channels in {}, decoding the first", channels, path.display());
    }

    let buffer = match spec.sample_format {
        hound::SampleFormat::Int => {
            let format = SampleFormat::new(spec.bits_per_sample, spec.sample_rate);
            let offset = unsigned_offset(spec.bits_per_sample);
            let shift = justify_shift(spec.bits_per_sample);
            if shift > 0 {
                log::debug!("{}-bit samples shifted left by {}", spec.bits_per_sample, shift);
            }
            let samples = reader
                .samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| (v << shift) + offset))
                .collect::<Result<Vec<_>, _>>()?;
            SampleBuffer::new(format, samples)
        }
        hound::SampleFormat::Float => {
            log::warn!("float samples rescaled to 16-bit levels");
            let format = SampleFormat::new(16, spec.sample_rate);
            let samples = reader
                .samples::<f32>()
                .step_by(channels)
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * 32767.0) as i32))
                .collect::<Result<Vec<_>, _>>()?;
            SampleBuffer::new(format, samples)
        }
    };

    Ok(buffer)
}

/// Write mono integer PCM in the given format
pub fn write_wav(path: &Path, format: &SampleFormat, samples: &[i32]) -> Result<(), WavError> {
    if !matches!(format.bits_per_sample, 8 | 16 | 32) {
        return Err(WavError::Unsupported(format!(
            "{}-bit output",
            format.bits_per_sample
        )));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let offset = unsigned_offset(format.bits_per_sample);
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample - offset)?;
    }
    writer.finalize()?;

    Ok(())
}
