use anyhow::Context;
use std::path::Path;
use std::sync::{Arc, Mutex};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{Transcriber, TranscriptionError};

/// Local speech-to-text backed by whisper.cpp
pub struct WhisperTranscriber {
    /// Whisper context (thread-safe)
    ctx: Arc<Mutex<WhisperContext>>,
    /// Number of CPU threads for inference
    threads: i32,
    /// Beam search width
    beam_size: i32,
    /// Language code (None = auto-detect)
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Determines sampling strategy based on beam size
    const fn sampling_strategy(beam_size: i32) -> SamplingStrategy {
        if beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size,
                patience: -1.0,
            }
        } else {
            SamplingStrategy::Greedy { best_of: 1 }
        }
    }

    /// Loads the model at `model_path`
    ///
    /// # Errors
    /// Returns [`TranscriptionError::ModelLoad`] if the model is missing or
    /// invalid, or if `threads`/`beam_size` are zero or exceed `i32::MAX`
    pub fn new(
        model_path: &Path,
        threads: usize,
        beam_size: usize,
        language: Option<String>,
    ) -> Result<Self, TranscriptionError> {
        let model_error = |source: anyhow::Error| TranscriptionError::ModelLoad {
            path: model_path.display().to_string(),
            source,
        };

        if threads == 0 {
            return Err(model_error(anyhow::anyhow!("threads must be > 0")));
        }
        if beam_size == 0 {
            return Err(model_error(anyhow::anyhow!("beam_size must be > 0")));
        }

        // whisper-rs takes i32 parameters
        let threads_i32 = i32::try_from(threads).map_err(|_| {
            model_error(anyhow::anyhow!("threads value too large (max: {})", i32::MAX))
        })?;
        let beam_size_i32 = i32::try_from(beam_size).map_err(|_| {
            model_error(anyhow::anyhow!("beam_size value too large (max: {})", i32::MAX))
        })?;

        tracing::info!(
            path = %model_path.display(),
            threads = threads,
            beam_size = beam_size,
            language = ?language,
            "loading whisper model"
        );

        let path_str = model_path
            .to_str()
            .ok_or_else(|| model_error(anyhow::anyhow!("model path contains invalid UTF-8")))?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| model_error(anyhow::anyhow!("{e:?}")))?;

        tracing::info!("whisper model loaded successfully");

        Ok(Self {
            ctx: Arc::new(Mutex::new(ctx)),
            threads: threads_i32,
            beam_size: beam_size_i32,
            language,
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError> {
        let _span = tracing::debug_span!("transcription", samples = samples.len()).entered();

        let mut state = self
            .ctx
            .lock()
            .map_err(|e| anyhow::anyhow!("mutex poisoned: {e}"))?
            .create_state()
            .map_err(|e| anyhow::anyhow!("failed to create whisper state: {e:?}"))?;

        let mut params = FullParams::new(Self::sampling_strategy(self.beam_size));
        params.set_n_threads(self.threads);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_language(self.language.as_deref());
        params.set_translate(false);

        let start = std::time::Instant::now();
        state
            .full(params, samples)
            .context("whisper inference failed")?;
        let inference_duration = start.elapsed();

        let mut result = String::new();
        for segment in state.as_iter() {
            result.push_str(&segment.to_string());
        }
        let result = result.trim().to_owned();

        tracing::info!(
            segments = state.full_n_segments(),
            text_len = result.len(),
            inference_ms = inference_duration.as_millis(),
            "transcription completed"
        );

        if result.is_empty() {
            return Err(TranscriptionError::NoSpeech);
        }
        Ok(result)
    }
}
