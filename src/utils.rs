// src/utils.rs
use std::path::Path;
use uuid::Uuid;

const MAX_STEM_LEN: usize = 64;

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types, returning the normalized extension
pub fn validate_file_extension(filename: &str, allowed: &[String]) -> Result<String, String> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| format!("File has no extension: {}", filename))?;

    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        return Err(format!(
            "Unsupported file type .{}. Allowed: {}",
            ext,
            allowed.join(", ")
        ));
    }

    Ok(ext)
}

/// Reduce a client-supplied file stem to `[A-Za-z0-9_-]`
pub fn sanitize_file_stem(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "resume".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collision-free name for an uploaded file
pub fn stored_file_name(original: &str, ext: &str, id: Uuid) -> String {
    format!("{}_{}.{}", id.simple(), sanitize_file_stem(original), ext)
}

/// Accept only local absolute paths as post-login redirect targets
pub fn safe_redirect_target(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.contains("://")
        && !next.chars().any(|c| c.is_control());

    local.then(|| next.to_string())
}

/// Basic shape check: one `@`, non-empty local part, dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// First `max_chars` characters of `text`, with an ellipsis when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}
