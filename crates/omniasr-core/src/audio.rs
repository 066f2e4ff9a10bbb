//! Audio intake: decode, validate and bound uploads before they reach the
//! batch queue. Rejecting here keeps bad requests out of shared batches.

use std::io::Cursor;

use crate::error::{Error, Result};

/// PCM audio extracted from an upload.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode raw upload bytes into mono f32 PCM.
pub fn decode_audio(bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| Error::AudioDecode(e.to_string()))?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels.max(1) as usize;

    let mut samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample.max(1) as u32;
            let max_val = if bits > 1 {
                ((1i64 << (bits - 1)) - 1) as f32
            } else {
                1.0
            };
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| (s as f32 / max_val).clamp(-1.0, 1.0))
                .collect()
        }
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
    };

    if channels > 1 {
        let mut mono = Vec::with_capacity(samples.len() / channels + 1);
        for frame in samples.chunks(channels) {
            let sum: f32 = frame.iter().copied().sum();
            mono.push(sum / frame.len() as f32);
        }
        samples = mono;
    }

    for sample in &mut samples {
        if !sample.is_finite() {
            *sample = 0.0;
        } else {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Decode and enforce the model's duration ceiling. This runs before
/// scheduler admission so an over-long file never occupies a batch slot.
pub fn admit(bytes: &[u8], max_duration_secs: Option<f32>) -> Result<DecodedAudio> {
    let audio = decode_audio(bytes)?;
    if let Some(limit) = max_duration_secs {
        let actual = audio.duration_secs();
        if actual > limit {
            return Err(Error::AudioTooLong { actual, limit });
        }
    }
    Ok(audio)
}

/// Re-encode mono PCM as an in-memory WAV, the wire format the sidecar
/// daemon consumes.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        // Writing into a Vec cannot fail.
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("in-memory WAV writer");
        for &sample in samples {
            writer.write_sample(sample).expect("in-memory WAV sample");
        }
        writer.finalize().expect("in-memory WAV finalize");
    }
    cursor.into_inner()
}
