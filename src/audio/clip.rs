//! Finalized audio clips
//!
//! Buffered PCM samples become a single immutable WAV payload on stop

use std::io::Cursor;
use thiserror::Error;

/// Container MIME type for every finalized clip
pub const CLIP_MIME: &str = "audio/wav";

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

/// A finalized recording, immutable once created
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub duration_secs: u32,
}

impl AudioClip {
    /// Wrap raw mono PCM samples in a WAV container
    pub fn from_samples(
        samples: &[i16],
        sample_rate: u32,
        duration_secs: u32,
    ) -> Result<Self, ClipError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }

        Ok(Self {
            mime_type: CLIP_MIME,
            bytes: cursor.into_inner(),
            duration_secs,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_container_shape() {
        let clip = AudioClip::from_samples(&[0i16; 160], 16000, 1).unwrap();
        assert_eq!(&clip.bytes[0..4], b"RIFF");
        assert_eq!(&clip.bytes[8..12], b"WAVE");
        assert_eq!(clip.mime_type, "audio/wav");
        assert_eq!(clip.duration_secs, 1);
        // 44-byte PCM header plus two bytes per sample
        assert_eq!(clip.bytes.len(), 44 + 160 * 2);
    }

    #[test]
    fn test_silent_buffer_still_forms_a_container() {
        let clip = AudioClip::from_samples(&[], 16000, 0).unwrap();
        assert!(!clip.is_empty());
        assert_eq!(clip.duration_secs, 0);
    }
}
