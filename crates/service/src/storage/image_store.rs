use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Image formats accepted for upload, detected from the file signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    fn codec(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::Webp => image::ImageFormat::WebP,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";

/// Sniff the format, then decode the whole payload so truncated or corrupt
/// files are rejected even when their signature looks right.
pub fn verify_image(bytes: &[u8]) -> Result<ImageFormat, ServiceError> {
    if bytes.is_empty() {
        return Err(ServiceError::field("image", EMPTY_FILE));
    }
    let format = ImageFormat::sniff(bytes).ok_or_else(|| ServiceError::field("image", INVALID_IMAGE))?;
    let mut reader = image::ImageReader::new(Cursor::new(bytes));
    reader.set_format(format.codec());
    reader.decode().map_err(|e| {
        debug!(?format, err = %e, "image_decode_failed");
        ServiceError::field("image", INVALID_IMAGE)
    })?;
    Ok(format)
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Validate and persist an image under `folder`; returns its media-relative path.
    async fn save(&self, folder: &str, bytes: &[u8]) -> Result<String, ServiceError>;
    /// Remove a previously saved image. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), ServiceError>;
    /// Public URL of a media-relative path.
    fn url_for(&self, path: &str) -> String;
}

/// Filesystem store rooted at the configured media directory.
#[derive(Clone, Debug)]
pub struct LocalImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self { root: root.into(), url_prefix: url_prefix.trim_end_matches('/').to_string() }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = Path::new(path);
        if rel.components().all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(rel))
        } else {
            None
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, folder: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let format = verify_image(bytes)?;
        let rel = format!("uploads/{}/{}.{}", folder, Uuid::new_v4(), format.extension());
        let full = self
            .resolve(&rel)
            .ok_or_else(|| ServiceError::Storage(format!("invalid upload folder {folder}")))?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        fs::write(&full, bytes).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        debug!(path = %rel, size = bytes.len(), "image_saved");
        Ok(rel)
    }

    async fn remove(&self, path: &str) -> Result<(), ServiceError> {
        let Some(full) = self.resolve(path) else {
            warn!(%path, "refusing to remove path outside media root");
            return Ok(());
        };
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.url_prefix, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::encoded_image;

    const PNG_HEADER: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
    ];

    fn temp_store() -> LocalImageStore {
        let root = std::env::temp_dir().join(format!("recipe_store_{}", Uuid::new_v4()));
        LocalImageStore::new(root, "/media/")
    }

    #[test]
    fn sniffs_known_signatures() {
        assert_eq!(ImageFormat::sniff(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"notanimage"), None);
    }

    #[tokio::test]
    async fn save_then_remove() {
        let store = temp_store();
        let rel = store.save("recipe", &encoded_image(image::ImageFormat::Png)).await.unwrap();
        assert!(rel.starts_with("uploads/recipe/") && rel.ends_with(".png"));
        assert_eq!(store.url_for(&rel), format!("/media/{rel}"));
        assert!(store.root().join(&rel).exists());

        store.remove(&rel).await.unwrap();
        assert!(!store.root().join(&rel).exists());
        store.remove(&rel).await.unwrap();
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn rejects_empty_and_non_images() {
        let store = temp_store();
        assert!(matches!(store.save("recipe", b"").await, Err(ServiceError::Validation(_))));
        assert!(matches!(store.save("recipe", b"plain text").await, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn decodes_every_accepted_format() {
        for (codec, expected) in [
            (image::ImageFormat::Png, ImageFormat::Png),
            (image::ImageFormat::Jpeg, ImageFormat::Jpeg),
        ] {
            assert_eq!(verify_image(&encoded_image(codec)).unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn rejects_corrupt_payloads_behind_valid_signatures() {
        let store = temp_store();
        let png = encoded_image(image::ImageFormat::Png);
        let truncated_png = &png[..png.len() / 2];
        let fake_jpeg = b"\xFF\xD8\xFFthis is definitely not a jpeg body";

        for bytes in [PNG_HEADER, truncated_png, &fake_jpeg[..]] {
            match store.save("recipe", bytes).await {
                Err(ServiceError::Validation(errors)) => assert_eq!(errors["image"], vec![INVALID_IMAGE.to_string()]),
                other => panic!("corrupt image accepted: {other:?}"),
            }
        }
        assert!(!store.root().join("uploads").exists());
    }

    #[test]
    fn resolve_refuses_escapes() {
        let store = temp_store();
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("uploads/recipe/x.png").is_some());
    }
}
