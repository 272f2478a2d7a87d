//! Article aggregate and its value types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    ArticleContent, ContentFormat, ContentValidationError, DisplayName, ImageName, Slug, UserId,
    render,
};

/// Maximum accepted title length in characters.
pub const TITLE_MAX: usize = 200;

/// Validation errors for article input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArticleValidationError {
    /// The identifier was not a UUID.
    #[error("article id must be a valid UUID")]
    InvalidId,
    /// The title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// The title was too long.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The body failed validation.
    #[error(transparent)]
    Content(#[from] ContentValidationError),
}

/// Stable article identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleId(Uuid);

impl ArticleId {
    /// Validate and construct an [`ArticleId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ArticleValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ArticleValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ArticleId> for String {
    fn from(value: ArticleId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ArticleId {
    type Error = ArticleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Article headline; trimmed, 1..=200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Validate a raw title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ArticleValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(ArticleValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive comparison used by the duplicate-title rule.
    pub fn same_as(&self, other: &Title) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl TryFrom<String> for Title {
    type Error = ArticleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Author reference shown with an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Byline {
    /// Author account.
    pub id: UserId,
    /// Author display name at read time.
    pub display_name: DisplayName,
}

/// Published article.
///
/// ## Invariants
/// - `(byline.id, slug)` is unique.
/// - `title` is unique per author, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Identifier.
    pub id: ArticleId,
    /// Author reference.
    pub byline: Byline,
    /// Headline.
    pub title: Title,
    /// Per-author URL identifier.
    pub slug: Slug,
    /// Body.
    pub content: ArticleContent,
    /// Optional banner image.
    pub image: Option<ImageName>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Whether `user` wrote this article.
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.byline.id == user
    }
}

/// Validated title and body submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    /// Headline.
    pub title: Title,
    /// Rendered and sanitised body.
    pub content: ArticleContent,
}

impl ArticleDraft {
    /// Validate raw form fields and render the body.
    ///
    /// # Examples
    /// ```
    /// use newsroom::domain::{ArticleDraft, ContentFormat};
    ///
    /// let draft = ArticleDraft::try_from_parts(" Launch ", "**big** news", ContentFormat::Markdown)
    ///     .unwrap();
    /// assert_eq!(draft.title.as_ref(), "Launch");
    /// assert!(draft.content.html().contains("<strong>big</strong>"));
    /// ```
    pub fn try_from_parts(
        title: &str,
        content: &str,
        format: ContentFormat,
    ) -> Result<Self, ArticleValidationError> {
        Ok(Self {
            title: Title::new(title)?,
            content: render(format, content)?,
        })
    }
}

/// Record handed to repositories when inserting an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    /// Identifier.
    pub id: ArticleId,
    /// Author account.
    pub author: UserId,
    /// Headline.
    pub title: Title,
    /// Allocated slug.
    pub slug: Slug,
    /// Body.
    pub content: ArticleContent,
    /// Optional stored banner.
    pub image: Option<ImageName>,
    /// Creation instant; also the initial update instant.
    pub created_at: DateTime<Utc>,
}

/// Record handed to repositories when updating an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleChanges {
    /// Target article.
    pub id: ArticleId,
    /// New headline.
    pub title: Title,
    /// Slug after the update (unchanged unless the title changed).
    pub slug: Slug,
    /// New body.
    pub content: ArticleContent,
    /// Banner after the update.
    pub image: Option<ImageName>,
    /// Modification instant.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Validation coverage for article primitives.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", Err(ArticleValidationError::EmptyTitle))]
    #[case("   ", Err(ArticleValidationError::EmptyTitle))]
    #[case("  Election night ", Ok("Election night"))]
    fn titles_are_trimmed_and_required(
        #[case] raw: &str,
        #[case] expected: Result<&str, ArticleValidationError>,
    ) {
        let result = Title::new(raw).map(String::from);
        assert_eq!(result, expected.map(str::to_owned));
    }

    #[rstest]
    fn overlong_titles_are_rejected() {
        assert_eq!(
            Title::new("t".repeat(TITLE_MAX + 1)),
            Err(ArticleValidationError::TitleTooLong { max: TITLE_MAX })
        );
        assert!(Title::new("t".repeat(TITLE_MAX)).is_ok());
    }

    #[rstest]
    fn title_comparison_ignores_case() {
        let a = Title::new("Breaking News").expect("valid");
        let b = Title::new("breaking news").expect("valid");
        let c = Title::new("Other").expect("valid");
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[rstest]
    fn draft_surfaces_content_errors() {
        let err = ArticleDraft::try_from_parts("Title", "   ", ContentFormat::Html)
            .expect_err("blank body");
        assert_eq!(
            err,
            ArticleValidationError::Content(ContentValidationError::Empty)
        );
    }

    #[rstest]
    fn article_ids_parse() {
        assert!(ArticleId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
        assert_eq!(
            ArticleId::new("nope"),
            Err(ArticleValidationError::InvalidId)
        );
    }
}
