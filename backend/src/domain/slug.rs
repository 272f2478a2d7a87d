//! Article slugs derived from titles.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens. They are unique per author; collisions are
//! resolved by appending `-2`, `-3`, and so on.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a generated slug.
pub const SLUG_MAX: usize = 80;
/// Slug used when a title contains no usable characters.
pub const FALLBACK_SLUG: &str = "article";

/// Validation errors returned by [`Slug::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    /// The slug was empty or padded with whitespace.
    #[error("slug must not be empty")]
    Empty,
    /// The slug contained characters outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacters,
}

/// URL-safe article identifier, unique per author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate an existing slug, for example one taken from a URL path.
    pub fn new(raw: impl Into<String>) -> Result<Self, SlugValidationError> {
        let raw = raw.into();
        if !is_trimmed_non_empty(&raw) {
            return Err(SlugValidationError::Empty);
        }
        if !has_allowed_slug_chars(&raw) {
            return Err(SlugValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Derive a slug from a title.
///
/// ASCII letters are lowercased and kept along with digits; every other run of
/// characters collapses to a single hyphen. The result is capped at
/// [`SLUG_MAX`] characters, cutting at a hyphen when one is available.
///
/// # Examples
/// ```
/// use newsroom::domain::slugify;
///
/// assert_eq!(slugify("Hello, World!").as_ref(), "hello-world");
/// assert_eq!(slugify("¿¡!?").as_ref(), "article");
/// ```
pub fn slugify(title: &str) -> Slug {
    let mut slug = String::with_capacity(title.len().min(SLUG_MAX));
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    Slug(truncate(slug))
}

fn truncate(mut slug: String) -> String {
    if slug.len() > SLUG_MAX {
        // Slugs are ASCII, so byte offsets are character offsets.
        slug.truncate(SLUG_MAX);
        if let Some(cut) = slug.rfind('-').filter(|cut| *cut > SLUG_MAX / 2) {
            slug.truncate(cut);
        }
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// Pick the first free slug for `base` given the slugs already taken.
///
/// Returns `base` when it is free, otherwise `base-N` for the smallest
/// `N >= 2` not in `taken`.
///
/// # Examples
/// ```
/// use std::collections::HashSet;
/// use newsroom::domain::{allocate_slug, slugify};
///
/// let taken: HashSet<String> = ["news".into(), "news-2".into()].into_iter().collect();
/// assert_eq!(allocate_slug(&slugify("News"), &taken).as_ref(), "news-3");
/// ```
pub fn allocate_slug(base: &Slug, taken: &HashSet<String>) -> Slug {
    if !taken.contains(base.as_ref()) {
        return base.clone();
    }
    (2_u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .map(Slug)
        .unwrap_or_else(|| base.clone())
}
