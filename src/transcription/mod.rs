/// WAV clip decoding and 16kHz mono conversion
pub mod audio;
/// Model download and management
#[cfg(feature = "whisper")]
pub mod download;
/// Whisper model inference engine
#[cfg(feature = "whisper")]
pub mod engine;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::TranscriptionConfig;

#[cfg(feature = "whisper")]
pub use download::ensure_model_downloaded;
#[cfg(feature = "whisper")]
pub use engine::WhisperTranscriber;

/// Speech-to-text collaborator that pre-fills expense descriptions
///
/// Input is 16kHz mono f32 samples (see [`audio::load_clip`]). Whether the
/// implementation is local, networked or cached is invisible to callers.
#[cfg_attr(test, mockall::automock)]
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text
    ///
    /// # Errors
    /// Returns error if no text could be produced for any reason
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError>;
}

/// Reasons a clip produced no text
///
/// The ledger never distinguishes between them: every failure simply leaves
/// the description for manual entry.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// Clip is not a readable WAV file
    #[error("unsupported audio clip {path}: {reason}")]
    UnsupportedFormat {
        /// Path of the clip
        path: String,
        /// What the decoder rejected
        reason: String,
    },

    /// Failed to load the speech model
    #[error("failed to load speech model from {path}: {source}")]
    ModelLoad {
        /// Path to model file
        path: String,
        /// Underlying error
        source: anyhow::Error,
    },

    /// Fetching the model failed
    #[error("network error: {0}")]
    Network(anyhow::Error),

    /// Clip decoded fine but contained no recognizable speech
    #[error("no speech detected")]
    NoSpeech,

    /// Transcription inference failed
    #[error("failed to transcribe audio")]
    Inference(#[from] anyhow::Error),
}

/// Loads a WAV clip from disk and transcribes it
///
/// # Errors
/// Returns [`TranscriptionError::UnsupportedFormat`] if the clip can't be
/// decoded, otherwise whatever the transcriber reports
pub fn transcribe_clip(
    transcriber: &dyn Transcriber,
    path: &Path,
) -> Result<String, TranscriptionError> {
    let _span = tracing::debug_span!("transcribe_clip", path = %path.display()).entered();
    let samples = audio::load_clip(path)?;
    transcriber.transcribe(&samples)
}

/// Turns a transcription outcome into description text
///
/// Any failure yields an empty description; the kind of failure is logged and
/// otherwise dropped.
#[must_use]
pub fn description_from(result: Result<String, TranscriptionError>) -> String {
    match result {
        Ok(text) => {
            let text = text.trim();
            debug!(text_len = text.len(), "description from transcription");
            text.to_owned()
        }
        Err(err) => {
            warn!(error = %err, "transcription failed, description left for manual entry");
            String::new()
        }
    }
}

/// Builds the configured transcriber
///
/// Returns `Ok(None)` when voice input is disabled or the binary was built
/// without the `whisper` feature.
///
/// # Errors
/// Returns error if the model can't be downloaded or loaded
pub fn build_transcriber(
    config: &TranscriptionConfig,
) -> Result<Option<Arc<dyn Transcriber>>, TranscriptionError> {
    if !config.enabled {
        info!("voice input disabled in config");
        return Ok(None);
    }
    load_transcriber(config)
}

#[cfg(feature = "whisper")]
fn load_transcriber(
    config: &TranscriptionConfig,
) -> Result<Option<Arc<dyn Transcriber>>, TranscriptionError> {
    let model_path = crate::config::Config::expand_path(&config.model_path).map_err(|source| {
        TranscriptionError::ModelLoad {
            path: config.model_path.clone(),
            source,
        }
    })?;

    ensure_model_downloaded(&config.model_name, &model_path)?;

    let engine = WhisperTranscriber::new(
        &model_path,
        config.threads,
        config.beam_size,
        config.language.clone(),
    )?;
    Ok(Some(Arc::new(engine)))
}

#[cfg(not(feature = "whisper"))]
#[allow(clippy::unnecessary_wraps)] // Same signature as the whisper build
fn load_transcriber(
    _config: &TranscriptionConfig,
) -> Result<Option<Arc<dyn Transcriber>>, TranscriptionError> {
    warn!("built without the `whisper` feature, voice input unavailable");
    Ok(None)
}
