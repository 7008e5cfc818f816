use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;

use super::TranscriptionError;

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Download URL for a ggml model name such as `base.en`
fn model_url(model_name: &str) -> Result<String> {
    let valid = !model_name.is_empty()
        && model_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if !valid {
        bail!("invalid model name '{model_name}'");
    }
    Ok(format!("{MODEL_BASE_URL}/ggml-{model_name}.bin"))
}

/// Downloads the model unless `model_path` already exists
///
/// Returns `true` if a download happened.
///
/// # Errors
/// Returns [`TranscriptionError::Network`] if the download or the write fails
pub fn ensure_model_downloaded(
    model_name: &str,
    model_path: &Path,
) -> Result<bool, TranscriptionError> {
    if model_path.exists() {
        tracing::debug!(path = %model_path.display(), "model present");
        return Ok(false);
    }

    let bytes = fetch_model(model_name, model_path).map_err(TranscriptionError::Network)?;
    tracing::info!(
        model = model_name,
        path = %model_path.display(),
        size = bytes,
        "model downloaded"
    );
    Ok(true)
}

/// Streams the model into a temp file next to `model_path`, then persists it
///
/// A failed download leaves nothing at `model_path`.
fn fetch_model(model_name: &str, model_path: &Path) -> Result<u64> {
    let url = model_url(model_name)?;
    let dir = model_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).context("failed to create model directory")?;

    tracing::info!(url = %url, "fetching speech model");
    let mut response =
        reqwest::blocking::get(&url).with_context(|| format!("request to {url} failed"))?;
    if !response.status().is_success() {
        bail!("model server answered {} for {url}", response.status());
    }

    let mut staged = NamedTempFile::new_in(dir).context("failed to stage model file")?;
    let bytes = response
        .copy_to(staged.as_file_mut())
        .context("model download interrupted")?;
    staged
        .persist(model_path)
        .with_context(|| format!("failed to move model into {}", model_path.display()))?;

    Ok(bytes)
}
