//! Query normalization and pagination parameters.

/// Queries shorter than this (in characters, after trimming) match nothing.
pub const MIN_QUERY_CHARS: usize = 2;

pub const DEFAULT_LIMIT: usize = 30;
pub const MAX_LIMIT: usize = 100;

/// Trims and lowercases a raw query. Returns `None` for queries too short
/// to search.
pub fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim().to_lowercase();

    if query.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(query)
}

/// Server-clamped page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Builds a page window from raw query-string values.
    ///
    /// Values are read like `parseInt`: leading digits count, anything
    /// unparsable falls back to the default. The limit is clamped to
    /// `1..=MAX_LIMIT` and negative offsets become 0.
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(parse_leading_int)
            .unwrap_or(DEFAULT_LIMIT as i64)
            .clamp(1, MAX_LIMIT as i64) as usize;

        let offset = offset
            .and_then(parse_leading_int)
            .unwrap_or(0)
            .max(0);

        Self {
            limit,
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
        }
    }
}

pub(crate) fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate absurdly long inputs instead of rejecting them
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
