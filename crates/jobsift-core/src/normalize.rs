//! Maps adapter output into the canonical [`Job`] shape.

use crate::models::{Job, NOT_SPECIFIED, RawEntry};

/// Maximum number of characters kept from a listing description.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Normalize a raw entry into a [`Job`].
///
/// Returns `None` when both title and company are blank after trimming;
/// such entries carry no usable identity and are dropped.
pub fn normalize(raw: &RawEntry, source: &str, query: &str) -> Option<Job> {
    let title = clean(raw.title.as_deref());
    let company = clean(raw.company.as_deref());
    if title.is_empty() && company.is_empty() {
        return None;
    }

    Some(Job {
        title,
        company,
        location: or_not_specified(raw.location.as_deref()),
        salary: raw.salary.clone(),
        job_type: or_not_specified(raw.job_type.as_deref()),
        url: clean(raw.url.as_deref()),
        posted: or_not_specified(raw.posted.as_deref()),
        source: source.to_string(),
        description: truncate_chars(&clean(raw.description.as_deref()), MAX_DESCRIPTION_CHARS),
        query: query.to_string(),
    })
}

/// Trim and collapse internal whitespace runs to a single space.
fn clean(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_not_specified(value: Option<&str>) -> String {
    let cleaned = clean(value);
    if cleaned.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        cleaned
    }
}

/// Truncate to at most `max` characters, never splitting a code point.
fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
