use anyhow::{Context, Result};
use medassist_core::ImageFile;
use std::path::Path;

/// Reads a file from disk, declaring its media type from the extension.
///
/// Whether the type is acceptable is the upload controller's call, not ours.
pub async fn load(path: &Path) -> Result<ImageFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let media_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(ImageFile::new(name, media_type, bytes))
}
