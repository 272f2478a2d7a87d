//! Keyset listing of articles.
//!
//! Listings are ordered newest first by `(created_at, id)` descending. A page
//! is fetched with one extra row so the service can tell whether another page
//! follows without a count query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Article, SearchTerm, UserId};

/// Ordering key of the last article on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCursorKey {
    /// Creation instant of the last article returned.
    pub created_at: DateTime<Utc>,
    /// Identifier of the last article returned; breaks timestamp ties.
    pub id: Uuid,
}

impl ArticleCursorKey {
    /// Key positioned just after `article`.
    pub fn after(article: &Article) -> Self {
        Self {
            created_at: article.created_at,
            id: *article.id.as_uuid(),
        }
    }

    /// Whether `article` sorts strictly after this key in listing order.
    pub fn precedes(&self, article: &Article) -> bool {
        (article.created_at, *article.id.as_uuid()) < (self.created_at, self.id)
    }
}

/// Which articles a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    /// Every article.
    All,
    /// Articles written by one author.
    ByAuthor(UserId),
    /// Articles whose title or content source contains the term.
    Search(SearchTerm),
}

/// Page request passed to repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListQuery {
    /// Selection.
    pub filter: ArticleFilter,
    /// Resume after this key; `None` starts from the newest article.
    pub after: Option<ArticleCursorKey>,
    /// Maximum number of rows to return.
    pub limit: usize,
}

/// Page request from a driving adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Resume after this key.
    pub after: Option<ArticleCursorKey>,
    /// Page size.
    pub limit: usize,
}

impl PageRequest {
    /// Build a page request.
    pub const fn new(after: Option<ArticleCursorKey>, limit: usize) -> Self {
        Self { after, limit }
    }

    /// Repository query fetching one row beyond the page to detect a next page.
    pub fn overfetch(self, filter: ArticleFilter) -> ArticleListQuery {
        ArticleListQuery {
            filter,
            after: self.after,
            limit: self.limit.saturating_add(1),
        }
    }
}

/// One page of articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    /// Articles on this page, newest first.
    pub articles: Vec<Article>,
    /// Key to resume from, present when more articles follow.
    pub next: Option<ArticleCursorKey>,
}

impl ArticlePage {
    /// Trim an overfetched result set down to `limit` rows.
    pub fn from_overfetch(mut rows: Vec<Article>, limit: usize) -> Self {
        if rows.len() > limit {
            rows.truncate(limit);
            let next = rows.last().map(ArticleCursorKey::after);
            return Self {
                articles: rows,
                next,
            };
        }
        Self {
            articles: rows,
            next: None,
        }
    }
}
