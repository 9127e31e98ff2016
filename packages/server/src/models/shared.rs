use std::collections::BTreeSet;

use crate::error::AppError;

/// Current time as unix seconds.
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Absent or zero timestamps mean "now".
pub fn resolve_created_at(created_at: Option<i64>) -> i64 {
    match created_at {
        Some(ts) if ts != 0 => ts,
        _ => now_unix(),
    }
}

/// Trim a tag and reject it if nothing is left.
pub fn validate_tag(tag: &str) -> Result<String, AppError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(AppError::Validation("Tag must not be empty".into()));
    }
    Ok(tag.to_string())
}

/// Trim tags, drop blank ones and collapse duplicates.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| validate_tag(tag.as_ref()).ok())
        .collect()
}

pub fn validate_page_size(page_size: u64) -> Result<(), AppError> {
    if page_size == 0 {
        return Err(AppError::Validation("Page size must be positive".into()));
    }
    Ok(())
}
