//! Free-text article search terms.

use std::fmt;

/// Maximum accepted search term length in characters.
pub const SEARCH_TERM_MAX: usize = 100;

/// Validation errors returned by [`SearchTerm::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchTermValidationError {
    /// The query was blank.
    #[error("search query must not be empty")]
    Empty,
    /// The query was too long.
    #[error("search query must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Trimmed search query matched case-insensitively against titles and content.
///
/// The term is kept verbatim; adapters are responsible for escaping any
/// pattern syntax (such as SQL `LIKE` wildcards) before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Validate a raw query string.
    pub fn new(raw: &str) -> Result<Self, SearchTermValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchTermValidationError::Empty);
        }
        if trimmed.chars().count() > SEARCH_TERM_MAX {
            return Err(SearchTermValidationError::TooLong {
                max: SEARCH_TERM_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive substring test used by in-memory adapters.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
