//! Profile photo loading.
//!
//! Photos are embedded in the profile record as `data:` URLs so the profile
//! stays self-contained and the report can show the picture without the
//! original file.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{EngineError, ResultEngine};

/// Reads an image file and returns it as a `data:<mime>;base64,...` URL.
///
/// The mime type is derived from the file extension; the read completes
/// before the caller touches any stored state.
pub async fn read_data_url(path: &Path) -> ResultEngine<String> {
    let mime = mime_for(path)?;
    let bytes = tokio::fs::read(path).await.map_err(EngineError::Photo)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "photo loaded");
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn mime_for(path: &Path) -> ResultEngine<&'static str> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "bmp" => Ok("image/bmp"),
        "svg" => Ok("image/svg+xml"),
        _ => Err(EngineError::UnsupportedImage(path.display().to_string())),
    }
}
