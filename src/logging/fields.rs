//! Field helpers for structured logging

use uuid::Uuid;

/// Characters of query/answer text kept in log previews
pub const PREVIEW_CHARS: usize = 100;

/// Generate a unique ID for one `route` call
///
/// # Examples
///
/// ```
/// use frugal::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert_eq!(request_id.len(), 36);
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Preview of `text` for logs, or `None` when content logging is disabled.
pub fn content_preview(text: &str, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging || text.is_empty() {
        return None;
    }
    Some(truncate_chars(text, PREVIEW_CHARS))
}

/// Truncate to `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
