//! In-memory driven port implementations.
//!
//! These back the real domain services in handler tests and the behaviour
//! suite so workflows run end to end without PostgreSQL.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ArticlePersistenceError, ArticleRepository, ImageStore, ImageStoreError, PasswordHashError,
    PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Article, ArticleChanges, ArticleFilter, ArticleId, ArticleListQuery, Byline, Email, ImageName,
    NewArticle, PasswordDigest, Role, Slug, Title, User, UserAccount, UserId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User repository holding accounts in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Vec<UserAccount>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn find_user(&self, id: &UserId) -> Option<User> {
        lock(&self.accounts)
            .iter()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        if accounts
            .iter()
            .any(|existing| existing.user.email() == account.user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().to_string(),
            ));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.find_user(id))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|account| account.user.email() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .iter()
            .map(|account| account.user.clone())
            .collect())
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        let Some(account) = accounts.iter_mut().find(|account| account.user.id() == id) else {
            return Ok(None);
        };
        account.user = account.user.clone().with_role(role);
        Ok(Some(account.user.clone()))
    }

    async fn demote_admin(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        let admins = accounts
            .iter()
            .filter(|account| account.user.role().is_admin())
            .count();
        let Some(account) = accounts.iter_mut().find(|account| account.user.id() == id) else {
            return Ok(None);
        };
        if account.user.role().is_admin() && admins <= 1 {
            return Err(UserPersistenceError::last_admin());
        }
        account.user = account.user.clone().with_role(role);
        Ok(Some(account.user.clone()))
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, UserPersistenceError> {
        let count = lock(&self.accounts)
            .iter()
            .filter(|account| account.user.role() == role)
            .count();
        u64::try_from(count).map_err(|err| UserPersistenceError::query(err.to_string()))
    }
}

#[derive(Debug, Clone)]
struct ArticleRow {
    id: ArticleId,
    author: UserId,
    title: Title,
    slug: Slug,
    content: crate::domain::ArticleContent,
    image: Option<ImageName>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&NewArticle> for ArticleRow {
    fn from(value: &NewArticle) -> Self {
        Self {
            id: value.id,
            author: value.author,
            title: value.title.clone(),
            slug: value.slug.clone(),
            content: value.content.clone(),
            image: value.image.clone(),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

/// Article repository resolving bylines against an [`InMemoryUserRepository`].
#[derive(Debug)]
pub struct InMemoryArticleRepository {
    users: Arc<InMemoryUserRepository>,
    rows: Mutex<Vec<ArticleRow>>,
}

impl InMemoryArticleRepository {
    /// Create an empty repository joined to `users`.
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            rows: Mutex::new(Vec::new()),
        }
    }

    fn hydrate(&self, row: ArticleRow) -> Result<Article, ArticlePersistenceError> {
        let author = self.users.find_user(&row.author).ok_or_else(|| {
            ArticlePersistenceError::query(format!("author {} missing", row.author))
        })?;
        Ok(Article {
            id: row.id,
            byline: Byline {
                id: row.author,
                display_name: author.display_name().clone(),
            },
            title: row.title,
            slug: row.slug,
            content: row.content,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn find_row(&self, predicate: impl Fn(&ArticleRow) -> bool) -> Option<ArticleRow> {
        lock(&self.rows).iter().find(|row| predicate(row)).cloned()
    }
}

fn matches_filter(filter: &ArticleFilter, row: &ArticleRow) -> bool {
    match filter {
        ArticleFilter::All => true,
        ArticleFilter::ByAuthor(author) => &row.author == author,
        ArticleFilter::Search(term) => {
            term.matches(row.title.as_ref()) || term.matches(row.content.source())
        }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn insert(&self, article: &NewArticle) -> Result<Article, ArticlePersistenceError> {
        let row = ArticleRow::from(article);
        {
            let mut rows = lock(&self.rows);
            let same_author = rows.iter().filter(|existing| existing.author == row.author);
            for existing in same_author {
                if existing.slug == row.slug {
                    return Err(ArticlePersistenceError::duplicate_slug(row.slug.to_string()));
                }
                if existing.title.same_as(&row.title) {
                    return Err(ArticlePersistenceError::duplicate_title());
                }
            }
            rows.push(row.clone());
        }
        self.hydrate(row)
    }

    async fn update(
        &self,
        changes: &ArticleChanges,
    ) -> Result<Option<Article>, ArticlePersistenceError> {
        let updated = {
            let mut rows = lock(&self.rows);
            let Some(author) = rows
                .iter()
                .find(|row| row.id == changes.id)
                .map(|row| row.author)
            else {
                return Ok(None);
            };
            for other in rows
                .iter()
                .filter(|row| row.author == author && row.id != changes.id)
            {
                if other.slug == changes.slug {
                    return Err(ArticlePersistenceError::duplicate_slug(
                        changes.slug.to_string(),
                    ));
                }
                if other.title.same_as(&changes.title) {
                    return Err(ArticlePersistenceError::duplicate_title());
                }
            }
            let Some(row) = rows.iter_mut().find(|row| row.id == changes.id) else {
                return Ok(None);
            };
            row.title = changes.title.clone();
            row.slug = changes.slug.clone();
            row.content = changes.content.clone();
            row.image = changes.image.clone();
            row.updated_at = changes.updated_at;
            row.clone()
        };
        self.hydrate(updated).map(Some)
    }

    async fn delete(&self, id: &ArticleId) -> Result<bool, ArticlePersistenceError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|row| &row.id != id);
        Ok(rows.len() != before)
    }

    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, ArticlePersistenceError> {
        self.find_row(|row| &row.id == id)
            .map(|row| self.hydrate(row))
            .transpose()
    }

    async fn find_by_slug(
        &self,
        author: &UserId,
        slug: &Slug,
    ) -> Result<Option<Article>, ArticlePersistenceError> {
        self.find_row(|row| &row.author == author && &row.slug == slug)
            .map(|row| self.hydrate(row))
            .transpose()
    }

    async fn slugs_with_prefix(
        &self,
        author: &UserId,
        base: &Slug,
    ) -> Result<HashSet<String>, ArticlePersistenceError> {
        let base = base.to_string();
        let prefix = format!("{base}-");
        Ok(lock(&self.rows)
            .iter()
            .filter(|row| &row.author == author)
            .map(|row| row.slug.to_string())
            .filter(|slug| *slug == base || slug.starts_with(&prefix))
            .collect())
    }

    async fn title_taken(
        &self,
        author: &UserId,
        title: &Title,
        excluding: Option<ArticleId>,
    ) -> Result<bool, ArticlePersistenceError> {
        Ok(lock(&self.rows).iter().any(|row| {
            &row.author == author && Some(row.id) != excluding && row.title.same_as(title)
        }))
    }

    async fn list(&self, query: &ArticleListQuery) -> Result<Vec<Article>, ArticlePersistenceError> {
        let mut rows: Vec<ArticleRow> = lock(&self.rows)
            .iter()
            .filter(|row| matches_filter(&query.filter, row))
            .filter(|row| {
                query
                    .after
                    .is_none_or(|key| (row.created_at, *row.id.as_uuid()) < (key.created_at, key.id))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.created_at, *b.id.as_uuid()).cmp(&(a.created_at, *a.id.as_uuid()))
        });
        rows.into_iter()
            .take(query.limit)
            .map(|row| self.hydrate(row))
            .collect()
    }
}

/// Image store keeping files in a map.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    files: Mutex<HashMap<ImageName, Vec<u8>>>,
}

impl InMemoryImageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        lock(&self.files).keys().any(|stored| stored.to_string() == name)
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        lock(&self.files).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        lock(&self.files).is_empty()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn save(&self, name: &ImageName, bytes: &[u8]) -> Result<(), ImageStoreError> {
        lock(&self.files).insert(name.clone(), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, name: &ImageName) -> Result<Option<Vec<u8>>, ImageStoreError> {
        Ok(lock(&self.files).get(name).cloned())
    }

    async fn remove(&self, name: &ImageName) -> Result<(), ImageStoreError> {
        lock(&self.files).remove(name);
        Ok(())
    }
}

/// Reversible "hasher" for tests; never use outside them.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextHasher;

const PLAIN_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlainTextHasher {
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        Ok(PasswordDigest::new(format!("{PLAIN_PREFIX}{password}")))
    }

    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let stored = digest
            .as_str()
            .strip_prefix(PLAIN_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed_digest("missing plain prefix"))?;
        Ok(stored == password)
    }
}
