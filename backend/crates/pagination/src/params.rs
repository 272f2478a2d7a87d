//! Request-side pagination parameters.

use serde::{Deserialize, Serialize};

/// Page size used when the client does not supply one.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest page size a client may request.
pub const MAX_LIMIT: usize = 100;

/// Query-string parameters accepted by paginated endpoints.
///
/// `limit` is clamped into `1..=MAX_LIMIT`; a missing limit falls back to
/// [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    cursor: Option<String>,
    limit: Option<usize>,
}

impl PageParams {
    /// Build parameters from optional raw values.
    #[must_use]
    pub const fn new(cursor: Option<String>, limit: Option<usize>) -> Self {
        Self { cursor, limit }
    }

    /// Opaque cursor token supplied by the client, ignoring blank values.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Effective page size.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    //! Page parameter normalisation coverage.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, DEFAULT_LIMIT)]
    #[case(Some(0), 1)]
    #[case(Some(5), 5)]
    #[case(Some(MAX_LIMIT + 1), MAX_LIMIT)]
    fn limit_is_clamped(#[case] raw: Option<usize>, #[case] expected: usize) {
        assert_eq!(PageParams::new(None, raw).limit(), expected);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some(" abc "), Some("abc"))]
    fn blank_cursors_are_ignored(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let params = PageParams::new(raw.map(str::to_owned), None);
        assert_eq!(params.cursor(), expected);
    }
}
