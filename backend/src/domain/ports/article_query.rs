//! Driving port for article reads.

use async_trait::async_trait;

use crate::domain::{
    Article, ArticleId, ArticlePage, Error, PageRequest, SearchTerm, Slug, User, UserId,
};

/// Domain use-case port for reading and listing articles.
///
/// Listings are newest first and paginated by keyset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleQuery: Send + Sync {
    /// Fetch one article by identifier.
    async fn get(&self, id: &ArticleId) -> Result<Article, Error>;

    /// Fetch one article by author and slug.
    async fn get_by_slug(&self, author: &UserId, slug: &Slug) -> Result<Article, Error>;

    /// Every article.
    async fn list(&self, page: PageRequest) -> Result<ArticlePage, Error>;

    /// Articles by one author.
    async fn list_by_author(
        &self,
        author: &UserId,
        page: PageRequest,
    ) -> Result<ArticlePage, Error>;

    /// Articles whose title or body contains `term`.
    async fn search(&self, term: &SearchTerm, page: PageRequest) -> Result<ArticlePage, Error>;

    /// Articles `actor` may manage: all of them for admins, their own for
    /// writers.
    async fn dashboard(&self, actor: &User, page: PageRequest) -> Result<ArticlePage, Error>;
}
