// src/core/fs_ops.rs
//! File system operations for the upload folder

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

pub struct FsOps;

impl FsOps {
    /// Ensure directory exists. An existing directory is not an error.
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        match fs::create_dir_all(path).await {
            Ok(()) => {
                info!("Directory ready: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to create directory: {}", path.display())),
        }
    }

    /// Remove a file, treating a missing file as already removed
    pub async fn remove_file_if_exists(path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("Removed file: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove file: {}", path.display()))
            }
        }
    }

    /// Best-effort removal used when cleaning up after a failed or cascaded write
    pub async fn discard_file(path: &Path) {
        if let Err(e) = Self::remove_file_if_exists(path).await {
            warn!("Could not discard {}: {:#}", path.display(), e);
        }
    }

    /// Join a stored relative path onto `base`, refusing anything that escapes it
    pub fn resolve_within(base: &Path, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if relative.as_os_str().is_empty() || !is_plain {
            return None;
        }

        Some(base.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_within() {
        let base = Path::new("/srv/uploads");
        assert_eq!(
            FsOps::resolve_within(base, "abc_resume.pdf"),
            Some(PathBuf::from("/srv/uploads/abc_resume.pdf"))
        );
        assert_eq!(FsOps::resolve_within(base, "../etc/passwd"), None);
        assert_eq!(FsOps::resolve_within(base, "/etc/passwd"), None);
        assert_eq!(FsOps::resolve_within(base, ""), None);
    }

    #[tokio::test]
    async fn test_ensure_dir_and_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("static").join("uploads");

        FsOps::ensure_dir_exists(&nested).await.unwrap();
        FsOps::ensure_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());

        let file = nested.join("resume.txt");
        tokio::fs::write(&file, "hello").await.unwrap();
        assert!(FsOps::remove_file_if_exists(&file).await.unwrap());
        assert!(!FsOps::remove_file_if_exists(&file).await.unwrap());
    }
}
