//! Driving port for article mutations.

use async_trait::async_trait;

use crate::domain::{Article, ArticleDraft, ArticleId, Error, ImageUpload, User};

/// Validated article form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSubmission {
    /// Title and rendered body.
    pub draft: ArticleDraft,
    /// Optional new banner image.
    pub image: Option<ImageUpload>,
}

/// Domain use-case port for publishing, editing and deleting articles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleCommand: Send + Sync {
    /// Publish a new article as `actor`.
    async fn create(&self, actor: &User, submission: ArticleSubmission) -> Result<Article, Error>;

    /// Replace an article's title, body and optionally its banner.
    ///
    /// The slug is only regenerated when the title changes. Omitting the
    /// image keeps the current banner.
    async fn update(
        &self,
        actor: &User,
        id: &ArticleId,
        submission: ArticleSubmission,
    ) -> Result<Article, Error>;

    /// Delete an article and its banner.
    async fn delete(&self, actor: &User, id: &ArticleId) -> Result<(), Error>;
}
