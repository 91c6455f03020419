//! Local filesystem storage for uploaded recipe images

use anyhow::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Directory, relative to the media root, holding recipe images
const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Sniff the format from the file signature
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageFormat::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::Webp)
            }
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

/// Stores media files under a root directory and builds their public URLs
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
    max_upload_bytes: usize,
}

impl MediaStorage {
    /// Create a new media storage
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Public URL of a stored file
    pub fn url(&self, relative_path: &str) -> String {
        format!("{}/{}", self.url_prefix, relative_path)
    }

    /// Write a recipe image under a fresh unique name
    ///
    /// Returns the path relative to the media root.
    pub async fn save_recipe_image(&self, format: ImageFormat, data: &[u8]) -> Result<String> {
        let relative_path = format!(
            "{}/{}.{}",
            RECIPE_IMAGE_DIR,
            Uuid::new_v4(),
            format.extension()
        );

        let path = self.root.join(&relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        info!("Stored recipe image {} ({} bytes)", relative_path, data.len());
        Ok(relative_path)
    }

    /// Remove a stored file; a missing file is not an error
    pub async fn remove(&self, relative_path: &str) -> Result<()> {
        match tokio::fs::remove_file(self.root.join(relative_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Media file {} was already gone", relative_path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
