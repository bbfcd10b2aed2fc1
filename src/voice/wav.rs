//! WAV helpers
//!
//! Inbound chunks are never validated; probing is for diagnostics only.

use std::io::Cursor;

use crate::{Error, Result};

/// Format of a WAV payload, as read from its header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub duration_secs: f32,
}

/// Read the header of a WAV payload
///
/// Returns `None` if the bytes are not a WAV container hound can read.
#[must_use]
pub fn probe_wav(bytes: &[u8]) -> Option<WavInfo> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();

    #[allow(clippy::cast_precision_loss)]
    let duration_secs = if spec.sample_rate == 0 {
        0.0
    } else {
        reader.duration() as f32 / spec.sample_rate as f32
    };

    Some(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        duration_secs,
    })
}

/// Encode mono f32 samples as 16-bit PCM WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reads_back_encoded_format() {
        let samples = vec![0.0f32; 8000];
        let wav = samples_to_wav(&samples, 16_000).unwrap();

        let info = probe_wav(&wav).unwrap();
        assert_eq!(info.channels, 1);
        assert_eq!(info.sample_rate, 16_000);
        assert_eq!(info.bits_per_sample, 16);
        assert!((info.duration_secs - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn probe_rejects_non_wav() {
        assert!(probe_wav(b"definitely not audio").is_none());
        assert!(probe_wav(&[]).is_none());
    }

    #[test]
    fn samples_are_clamped() {
        let wav = samples_to_wav(&[2.0, -2.0], 8000).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![32767, -32768]);
    }
}
