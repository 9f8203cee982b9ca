//! Storage for uploaded images
//!
//! Clients upload images inline as `data:image/<ext>;base64,<payload>` strings.
//! Files land under the media root in a per-kind subdirectory with a random
//! name; the database stores the path relative to the root.

use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{FoodgramError, Result};

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

/// Decoded inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Parse a `data:image/<ext>;base64,` URI
pub fn decode_data_uri(input: &str, max_bytes: usize) -> Result<DecodedImage> {
    let rest = input
        .strip_prefix("data:image/")
        .ok_or_else(|| FoodgramError::media("Upload a valid image. Expected a base64 data URI."))?;

    let (extension, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| FoodgramError::media("Upload a valid image. Expected a base64 data URI."))?;

    let extension = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(FoodgramError::media(format!(
            "Unsupported image type '{extension}'."
        )));
    }

    // Every 4 base64 characters carry 3 bytes
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(FoodgramError::media("The uploaded image is too large."));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| FoodgramError::media("Upload a valid image. The data is not valid base64."))?;

    if bytes.is_empty() {
        return Err(FoodgramError::media("The submitted file is empty."));
    }
    if bytes.len() > max_bytes {
        return Err(FoodgramError::media("The uploaded image is too large."));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Writes, resolves and removes media files
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.root, &config.base_url, config.max_image_bytes)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode a data URI and store it under `subdir`, returning the relative path
    pub async fn save_data_uri(&self, subdir: &str, data_uri: &str) -> Result<String> {
        let image = decode_data_uri(data_uri, self.max_bytes)?;
        let relative = format!("{subdir}/{}.{}", Uuid::new_v4().simple(), image.extension);

        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &image.bytes).await?;

        debug!(path = %relative, size = image.bytes.len(), "Stored uploaded image");
        Ok(relative)
    }

    /// Public URL of a stored file
    pub fn url(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }

    /// Remove a stored file; failures are logged and ignored
    pub async fn delete(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            warn!(path = %relative, "Refusing to delete media outside the media root");
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %relative, error = %e, "Failed to delete media file");
            }
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}
