//! Port abstraction for article persistence adapters and their errors.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{
    Article, ArticleChanges, ArticleId, ArticleListQuery, NewArticle, Slug, Title, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by article repository adapters.
    pub enum ArticlePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "article repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "article repository query failed: {message}",
        /// The author already has an article with this slug.
        DuplicateSlug { slug: String } => "slug already used by this author: {slug}",
        /// The author already has an article with this title.
        DuplicateTitle => "title already used by this author",
    }
}

/// Port for storing and reading articles.
///
/// Read operations return articles with their byline resolved.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new article and return it as stored.
    async fn insert(&self, article: &NewArticle) -> Result<Article, ArticlePersistenceError>;

    /// Apply changes to an existing article, returning it when it exists.
    async fn update(
        &self,
        changes: &ArticleChanges,
    ) -> Result<Option<Article>, ArticlePersistenceError>;

    /// Delete an article; `true` when a row was removed.
    async fn delete(&self, id: &ArticleId) -> Result<bool, ArticlePersistenceError>;

    /// Fetch an article by identifier.
    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, ArticlePersistenceError>;

    /// Fetch an article by author and slug.
    async fn find_by_slug(
        &self,
        author: &UserId,
        slug: &Slug,
    ) -> Result<Option<Article>, ArticlePersistenceError>;

    /// Slugs of `author`'s articles equal to `base` or starting with `base-`.
    async fn slugs_with_prefix(
        &self,
        author: &UserId,
        base: &Slug,
    ) -> Result<HashSet<String>, ArticlePersistenceError>;

    /// Whether `author` has another article with this title, ignoring case.
    ///
    /// `excluding` names the article being edited so it does not clash with
    /// itself.
    async fn title_taken(
        &self,
        author: &UserId,
        title: &Title,
        excluding: Option<ArticleId>,
    ) -> Result<bool, ArticlePersistenceError>;

    /// Return up to `query.limit` articles in listing order.
    async fn list(&self, query: &ArticleListQuery) -> Result<Vec<Article>, ArticlePersistenceError>;
}
