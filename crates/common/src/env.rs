//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Ensure the media root (and its upload subdirectory) exists and is writable.
pub async fn ensure_env(media_root: &str) -> anyhow::Result<()> {
    let uploads = std::path::Path::new(media_root).join("uploads");
    tokio::fs::create_dir_all(&uploads)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", uploads.display()))?;
    let meta = tokio::fs::metadata(media_root).await?;
    if meta.permissions().readonly() {
        anyhow::bail!("media root {media_root} is read-only");
    }
    info!(%media_root, "media directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_upload_directory() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("recipe_media_{}", std::process::id()));
        let root_str = root.to_string_lossy().to_string();
        ensure_env(&root_str).await?;
        assert!(tokio::fs::metadata(root.join("uploads")).await?.is_dir());
        tokio::fs::remove_dir_all(&root).await.ok();
        Ok(())
    }
}
