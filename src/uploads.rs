// src/uploads.rs
//! Resume files: validation, collision-free naming and cleanup

use rocket::data::Capped;
use rocket::fs::TempFile;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::{FsOps, PortalConfig};
use crate::error::PortalError;
use crate::utils::{stored_file_name, validate_file_extension};

/// Client-supplied file name, unsanitized. Only used to derive a safe stem and extension.
fn original_name<'a>(file: &'a TempFile<'_>) -> Option<&'a str> {
    file.raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .filter(|name| !name.trim().is_empty())
}

/// Store an uploaded resume under the upload folder.
///
/// Returns the stored name relative to the upload folder, or `None` when the
/// form carried no file.
pub async fn store_resume(
    config: &PortalConfig,
    upload: Option<&mut Capped<TempFile<'_>>>,
) -> Result<Option<String>, PortalError> {
    let Some(upload) = upload else {
        return Ok(None);
    };

    let Some(original) = original_name(&upload.value).map(str::to_owned) else {
        if upload.value.len() == 0 {
            return Ok(None);
        }
        return Err(PortalError::Validation(
            "The uploaded resume has no file name.".to_string(),
        ));
    };

    if !upload.is_complete() || upload.value.len() > config.max_upload_bytes {
        warn!("Rejected oversized resume upload '{}'", original);
        return Err(PortalError::Validation(format!(
            "Resume files may be at most {} MB.",
            config.max_upload_bytes / (1024 * 1024)
        )));
    }

    let ext = validate_file_extension(&original, &config.allowed_extensions)
        .map_err(PortalError::Validation)?;

    let stored = stored_file_name(&original, &ext, Uuid::new_v4());
    let target = config.upload_dir.join(&stored);

    upload.value.persist_to(&target).await.map_err(|e| {
        error!("Failed to store resume at {}: {}", target.display(), e);
        PortalError::Internal(anyhow::anyhow!("Failed to store resume: {}", e))
    })?;

    info!("Stored resume '{}' as {}", original, stored);
    Ok(Some(stored))
}

/// Remove stored resumes, logging rather than failing on I/O errors
pub async fn discard_resumes<I, S>(config: &PortalConfig, stored: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in stored {
        match FsOps::resolve_within(&config.upload_dir, name.as_ref()) {
            Some(path) => FsOps::discard_file(&path).await,
            None => warn!("Refusing to remove resume outside the upload folder: {}", name.as_ref()),
        }
    }
}
