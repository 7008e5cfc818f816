use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::{debug, info};

use super::TranscriptionError;

/// Sample rate expected by the speech model
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Decodes a WAV clip into 16kHz mono f32 samples
///
/// Integer PCM is scaled into `[-1.0, 1.0]`; float PCM is taken as-is.
///
/// # Errors
/// Returns [`TranscriptionError::UnsupportedFormat`] if the file isn't a WAV
/// file hound can read, or declares zero channels or a zero sample rate
pub fn load_clip(path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let unsupported = |reason: String| TranscriptionError::UnsupportedFormat {
        path: path.display().to_string(),
        reason,
    };

    let reader = WavReader::open(path)
        .map_err(|e| unsupported(format!("only WAV clips are supported ({e})")))?;
    let spec = reader.spec();
    debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "decoding clip"
    );

    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(unsupported(format!(
            "invalid stream layout: {} channels at {} Hz",
            spec.channels, spec.sample_rate
        )));
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| unsupported(e.to_string()))?,
        SampleFormat::Int => {
            let scale = 2.0_f32.powi(i32::from(spec.bits_per_sample) - 1);
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|value| pcm_to_f32(value, scale)))
                .collect::<Result<_, _>>()
                .map_err(|e| unsupported(e.to_string()))?
        }
    };

    let converted = convert_to_16khz_mono(&samples, spec.sample_rate, spec.channels);
    info!(
        input_samples = samples.len(),
        output_samples = converted.len(),
        "clip loaded"
    );
    Ok(converted)
}

// i32 → f32: PCM values fit the mantissa for bit depths up to 24
#[allow(clippy::cast_precision_loss)]
fn pcm_to_f32(value: i32, scale: f32) -> f32 {
    value as f32 / scale
}

/// Downmixes interleaved samples to mono and resamples to 16kHz
///
/// Channels are averaged; resampling is linear interpolation.
// Fractional index math needs f64 ↔ usize conversions
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn convert_to_16khz_mono(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<f32> {
    let _span = tracing::debug_span!("convert_to_16khz_mono").entered();

    let mono_samples = if channels <= 1 {
        samples.to_vec()
    } else {
        let channels_f64 = f64::from(channels);
        samples
            .chunks(usize::from(channels))
            .map(|frame| {
                let sum_f64: f64 = frame.iter().map(|&s| f64::from(s)).sum();
                // f64 → f32: audio samples are stored as f32, precision sufficient
                (sum_f64 / channels_f64) as f32
            })
            .collect()
    };

    if sample_rate == TARGET_SAMPLE_RATE || sample_rate == 0 {
        return mono_samples;
    }

    let ratio = f64::from(sample_rate) / f64::from(TARGET_SAMPLE_RATE);

    let output_len_f64 = (mono_samples.len() as f64) / ratio;
    let output_len = if output_len_f64.is_finite() && output_len_f64 >= 0.0 {
        output_len_f64.ceil() as usize
    } else {
        mono_samples.len()
    };

    let last = mono_samples.len().saturating_sub(1);
    let mut resampled = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let src_idx_f64 = (i as f64) * ratio;
        let src_idx_floor = src_idx_f64.floor() as usize;
        let src_idx_ceil = (src_idx_floor + 1).min(last);
        let fract = src_idx_f64 - src_idx_f64.floor();

        let sample = match (mono_samples.get(src_idx_floor), mono_samples.get(src_idx_ceil)) {
            (Some(&s1), Some(&s2)) => f64::from(s1).mul_add(1.0 - fract, f64::from(s2) * fract) as f32,
            _ => 0.0_f32,
        };
        resampled.push(sample);
    }

    debug!(
        source_rate = sample_rate,
        target_rate = TARGET_SAMPLE_RATE,
        input_samples = mono_samples.len(),
        output_samples = resampled.len(),
        "resampling completed"
    );

    resampled
}
