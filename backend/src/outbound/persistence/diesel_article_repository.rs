//! PostgreSQL-backed `ArticleRepository` implementation using Diesel ORM.
//!
//! Reads join `users` to resolve bylines. Listings use keyset pagination on
//! `(created_at, id)` descending, which the `articles_listing_idx` index
//! serves directly.

use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ArticlePersistenceError, ArticleRepository};
use crate::domain::{
    Article, ArticleChanges, ArticleContent, ArticleFilter, ArticleId, ArticleListQuery, Byline,
    ContentFormat, DisplayName, ImageName, NewArticle, SearchTerm, Slug, Title, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{ArticleRow, ArticleUpdate, NewArticleRow};
use super::pool::{DbPool, PoolError};
use super::schema::{articles, users};

const SLUG_UNIQUE_CONSTRAINT: &str = "articles_author_slug_key";
const TITLE_UNIQUE_CONSTRAINT: &str = "articles_author_title_key";

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// Diesel-backed implementation of the article repository port.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticlePersistenceError {
    map_basic_pool_error(error, ArticlePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ArticlePersistenceError {
    map_basic_diesel_error(
        error,
        ArticlePersistenceError::query,
        ArticlePersistenceError::connection,
    )
}

/// Translate unique violations on writes into domain conflicts.
fn map_write_error(error: diesel::result::Error, slug: &Slug) -> ArticlePersistenceError {
    match violated_unique_constraint(&error) {
        Some(SLUG_UNIQUE_CONSTRAINT) => ArticlePersistenceError::duplicate_slug(slug.to_string()),
        Some(TITLE_UNIQUE_CONSTRAINT) => ArticlePersistenceError::duplicate_title(),
        _ => map_diesel_error(error),
    }
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> ArticlePersistenceError {
    ArticlePersistenceError::query(format!("invalid {column} in database: {err}"))
}

/// Escape `LIKE` metacharacters and wrap the term for a substring match.
fn like_pattern(term: &SearchTerm) -> String {
    let mut pattern = String::with_capacity(term.as_ref().len() + 2);
    pattern.push('%');
    for ch in term.as_ref().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

type JoinedRow = (ArticleRow, String);

fn row_to_article((row, display_name): JoinedRow) -> Result<Article, ArticlePersistenceError> {
    let ArticleRow {
        id,
        author_id,
        title,
        slug,
        content_format,
        content_source,
        content_html,
        image,
        created_at,
        updated_at,
    } = row;

    let format = ContentFormat::from_str(&content_format)
        .map_err(|err| corrupt("content_format", err))?;
    Ok(Article {
        id: ArticleId::from_uuid(id),
        byline: Byline {
            id: UserId::from_uuid(author_id),
            display_name: DisplayName::new(display_name)
                .map_err(|err| corrupt("display_name", err))?,
        },
        title: Title::new(title).map_err(|err| corrupt("title", err))?,
        slug: Slug::new(slug).map_err(|err| corrupt("slug", err))?,
        content: ArticleContent::from_parts(format, content_source, content_html),
        image: image
            .map(ImageName::new)
            .transpose()
            .map_err(|err| corrupt("image", err))?,
        created_at,
        updated_at,
    })
}

impl DieselArticleRepository {
    async fn fetch_one(&self, id: Uuid) -> Result<Option<Article>, ArticlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = articles::table
            .inner_join(users::table)
            .filter(articles::id.eq(id))
            .select((ArticleRow::as_select(), users::display_name))
            .first::<JoinedRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_article).transpose()
    }
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn insert(&self, article: &NewArticle) -> Result<Article, ArticlePersistenceError> {
        {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = NewArticleRow {
                id: *article.id.as_uuid(),
                author_id: *article.author.as_uuid(),
                title: article.title.as_ref(),
                slug: article.slug.as_ref(),
                content_format: article.content.format().as_str(),
                content_source: article.content.source(),
                content_html: article.content.html(),
                image: article.image.as_ref().map(AsRef::as_ref),
                created_at: article.created_at,
                updated_at: article.created_at,
            };

            diesel::insert_into(articles::table)
                .values(&row)
                .execute(&mut conn)
                .await
                .map_err(|err| map_write_error(err, &article.slug))?;
        }

        self.fetch_one(*article.id.as_uuid())
            .await?
            .ok_or_else(|| ArticlePersistenceError::query("inserted article not readable"))
    }

    async fn update(
        &self,
        changes: &ArticleChanges,
    ) -> Result<Option<Article>, ArticlePersistenceError> {
        let updated = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let changeset = ArticleUpdate {
                title: changes.title.as_ref(),
                slug: changes.slug.as_ref(),
                content_format: changes.content.format().as_str(),
                content_source: changes.content.source(),
                content_html: changes.content.html(),
                image: changes.image.as_ref().map(AsRef::as_ref),
                updated_at: changes.updated_at,
            };

            diesel::update(articles::table.find(changes.id.as_uuid()))
                .set(&changeset)
                .execute(&mut conn)
                .await
                .map_err(|err| map_write_error(err, &changes.slug))?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.fetch_one(*changes.id.as_uuid()).await
    }

    async fn delete(&self, id: &ArticleId) -> Result<bool, ArticlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(articles::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, ArticlePersistenceError> {
        self.fetch_one(*id.as_uuid()).await
    }

    async fn find_by_slug(
        &self,
        author: &UserId,
        slug: &Slug,
    ) -> Result<Option<Article>, ArticlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let slug: &str = slug.as_ref();

        let row = articles::table
            .inner_join(users::table)
            .filter(articles::author_id.eq(author.as_uuid()))
            .filter(articles::slug.eq(slug))
            .select((ArticleRow::as_select(), users::display_name))
            .first::<JoinedRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_article).transpose()
    }

    async fn slugs_with_prefix(
        &self,
        author: &UserId,
        base: &Slug,
    ) -> Result<HashSet<String>, ArticlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let base = base.to_string();
        // Slugs only contain [a-z0-9-], so the prefix needs no escaping.
        let prefix = format!("{base}-%");

        let slugs: Vec<String> = articles::table
            .filter(articles::author_id.eq(author.as_uuid()))
            .filter(articles::slug.eq(&base).or(articles::slug.like(prefix)))
            .select(articles::slug)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(slugs.into_iter().collect())
    }

    async fn title_taken(
        &self,
        author: &UserId,
        title: &Title,
        excluding: Option<ArticleId>,
    ) -> Result<bool, ArticlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let title = title.to_string();

        let mut query = articles::table
            .filter(articles::author_id.eq(author.as_uuid()))
            .filter(lower(articles::title).eq(lower(title)))
            .into_boxed();
        if let Some(excluded) = excluding {
            query = query.filter(articles::id.ne(*excluded.as_uuid()));
        }

        let count: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count > 0)
    }

    async fn list(&self, query: &ArticleListQuery) -> Result<Vec<Article>, ArticlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(query.limit)
            .map_err(|_| ArticlePersistenceError::query("page size out of range"))?;

        let mut statement = articles::table
            .inner_join(users::table)
            .select((ArticleRow::as_select(), users::display_name))
            .into_boxed();

        statement = match &query.filter {
            ArticleFilter::All => statement,
            ArticleFilter::ByAuthor(author) => {
                statement.filter(articles::author_id.eq(*author.as_uuid()))
            }
            ArticleFilter::Search(term) => {
                let pattern = like_pattern(term);
                statement.filter(
                    articles::title
                        .ilike(pattern.clone())
                        .or(articles::content_source.ilike(pattern)),
                )
            }
        };

        if let Some(after) = query.after {
            statement = statement.filter(
                articles::created_at.lt(after.created_at).or(articles::created_at
                    .eq(after.created_at)
                    .and(articles::id.lt(after.id))),
            );
        }

        let rows: Vec<JoinedRow> = statement
            .order((articles::created_at.desc(), articles::id.desc()))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_article).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Mapping coverage; queries run against PostgreSQL elsewhere.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(format: &str, image: Option<&str>) -> JoinedRow {
        (
            ArticleRow {
                id: Uuid::new_v4(),
                author_id: Uuid::new_v4(),
                title: "Launch day".to_owned(),
                slug: "launch-day".to_owned(),
                content_format: format.to_owned(),
                content_source: "**hi**".to_owned(),
                content_html: "<p><strong>hi</strong></p>".to_owned(),
                image: image.map(str::to_owned),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            "Ada".to_owned(),
        )
    }

    #[rstest]
    #[case("rust", "%rust%")]
    #[case("100%", "%100\\%%")]
    #[case("snake_case", "%snake\\_case%")]
    #[case("C:\\temp", "%C:\\\\temp%")]
    fn like_patterns_escape_wildcards(#[case] raw: &str, #[case] expected: &str) {
        let term = SearchTerm::new(raw).expect("term");
        assert_eq!(like_pattern(&term), expected);
    }

    #[rstest]
    fn rows_convert_with_byline_and_banner() {
        let banner = "3fa85f64-5717-4562-b3fc-2c963f66afa6_cover.jpg";
        let article = row_to_article(row("markdown", Some(banner))).expect("valid row");

        assert_eq!(article.byline.display_name.to_string(), "Ada");
        assert_eq!(article.content.format(), ContentFormat::Markdown);
        assert_eq!(article.image.map(String::from).as_deref(), Some(banner));
    }

    #[rstest]
    #[case("rtf", None)]
    #[case("html", Some("../escape.png"))]
    fn corrupt_rows_surface_query_errors(#[case] format: &str, #[case] image: Option<&str>) {
        let err = row_to_article(row(format, image)).expect_err("corrupt");
        assert!(matches!(err, ArticlePersistenceError::Query { .. }));
    }

    #[rstest]
    fn other_write_errors_fall_back_to_query() {
        let slug = Slug::new("launch-day").expect("slug");
        let err = map_write_error(diesel::result::Error::NotFound, &slug);
        assert!(matches!(err, ArticlePersistenceError::Query { .. }));
    }
}
