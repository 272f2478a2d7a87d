//! Article handlers.
//!
//! ```text
//! GET    /api/v1/articles?limit=20&cursor=...
//! GET    /api/v1/articles/search?q=rust
//! GET    /api/v1/articles/{id}
//! POST   /api/v1/articles            (multipart: title, content, format, image)
//! PUT    /api/v1/articles/{id}       (multipart)
//! DELETE /api/v1/articles/{id}
//! GET    /api/v1/authors/{id}/articles
//! GET    /api/v1/authors/{id}/articles/{slug}
//! GET    /api/v1/dashboard/articles
//! ```

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{Cursor, PageParams, Paginated, PaginationLinks};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ApiResult, Article, ArticlePage, DisplayTimezone, Error, PageRequest, require_publisher,
};
use crate::inbound::http::article_form::read_article_form;
use crate::inbound::http::schemas::{ContentFormatSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::require_user;
use crate::inbound::http::validation::{
    FieldName, parse_article_id, parse_cursor, parse_search_term, parse_slug, parse_user_id,
};

/// Author reference embedded in article responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,
}

/// Article as returned by every article endpoint.
///
/// Timestamps are given in UTC and again in the configured display zone.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    #[schema(example = "6f1c1f5e-52f4-4d1f-8a4e-0f3a2c9c1b7d")]
    pub id: String,
    pub author: AuthorResponse,
    #[schema(example = "Launch day")]
    pub title: String,
    #[schema(example = "launch-day")]
    pub slug: String,
    #[schema(value_type = ContentFormatSchema)]
    pub format: String,
    /// Source as submitted.
    pub content: String,
    /// Sanitised HTML rendering of `content`.
    pub html: String,
    /// Path of the banner image, when one was uploaded.
    #[schema(example = "/uploads/3fa85f64-5717-4562-b3fc-2c963f66afa6_cover.png")]
    pub image_url: Option<String>,
    #[schema(value_type = String, example = "2026-03-14T09:00:00Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2026-03-14T09:00:00Z")]
    pub updated_at: DateTime<Utc>,
    #[schema(example = "2026-03-14T18:00:00+09:00")]
    pub created_at_local: String,
    #[schema(example = "2026-03-14T18:00:00+09:00")]
    pub updated_at_local: String,
    #[schema(example = "Asia/Tokyo")]
    pub timezone: String,
}

impl ArticleResponse {
    fn new(article: Article, timezone: DisplayTimezone) -> Self {
        let Article {
            id,
            byline,
            title,
            slug,
            content,
            image,
            created_at,
            updated_at,
        } = article;
        Self {
            id: id.to_string(),
            author: AuthorResponse {
                id: byline.id.to_string(),
                display_name: byline.display_name.into(),
            },
            title: title.into(),
            slug: slug.to_string(),
            format: content.format().as_str().to_owned(),
            content: content.source().to_owned(),
            html: content.html().to_owned(),
            image_url: image.map(|name| format!("/uploads/{name}")),
            created_at,
            updated_at,
            created_at_local: timezone.localize(created_at),
            updated_at_local: timezone.localize(updated_at),
            timezone: timezone.name().to_owned(),
        }
    }
}

/// Page navigation links.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageLinksSchema {
    #[schema(rename = "self")]
    current: String,
    next: Option<String>,
}

/// A page of articles, newest first.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ArticlePageSchema {
    data: Vec<ArticleResponse>,
    limit: usize,
    links: PageLinksSchema,
}

/// Query parameters accepted by paginated listings.
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI parameter generation via utoipa"
)]
pub struct PageQuery {
    /// Opaque token from a previous page's `next` link.
    cursor: Option<String>,
    /// Page size, clamped to 1..=100 (default 20).
    limit: Option<usize>,
}

/// Search query parameter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against titles and content.
    q: Option<String>,
}

fn page_request(params: &PageParams) -> ApiResult<PageRequest> {
    let after = parse_cursor(params.cursor())?;
    Ok(PageRequest::new(after, params.limit()))
}

fn page_response(
    req: &HttpRequest,
    state: &HttpState,
    page: ArticlePage,
    limit: usize,
) -> ApiResult<HttpResponse> {
    let next = page
        .next
        .map(|key| Cursor::new(key).encode())
        .transpose()
        .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))?;
    let links = PaginationLinks::from_request(&req.full_url(), limit, next.as_deref());
    let data = page
        .articles
        .into_iter()
        .map(|article| ArticleResponse::new(article, state.timezone))
        .collect();
    Ok(HttpResponse::Ok().json(Paginated::new(data, limit, links)))
}

fn article_json(state: &HttpState, article: Article) -> web::Json<ArticleResponse> {
    web::Json(ArticleResponse::new(article, state.timezone))
}

/// Every article, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/articles",
    params(PageQuery),
    responses(
        (status = 200, description = "Article page", body = ArticlePageSchema),
        (status = 400, description = "Invalid cursor", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "listArticles",
    security([])
)]
#[get("/articles")]
pub async fn list_articles(
    req: HttpRequest,
    state: web::Data<HttpState>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let page = page_request(&params)?;
    let articles = state.articles_query.list(page).await?;
    page_response(&req, &state, articles, page.limit)
}

/// Articles whose title or content contains `q`.
#[utoipa::path(
    get,
    path = "/api/v1/articles/search",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching articles", body = ArticlePageSchema),
        (status = 400, description = "Missing or invalid query", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "searchArticles",
    security([])
)]
#[get("/articles/search")]
pub async fn search_articles(
    req: HttpRequest,
    state: web::Data<HttpState>,
    search: web::Query<SearchQuery>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let term = parse_search_term(search.q.as_deref())?;
    let page = page_request(&params)?;
    let articles = state.articles_query.search(&term, page).await?;
    page_response(&req, &state, articles, page.limit)
}

/// One article by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    params(("id" = String, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Unknown article", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "getArticle",
    security([])
)]
#[get("/articles/{id}")]
pub async fn get_article(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let id = parse_article_id(&path.into_inner())?;
    let article = state.articles_query.get(&id).await?;
    Ok(article_json(&state, article))
}

/// Publish an article. Writers and admins only.
#[utoipa::path(
    post,
    path = "/api/v1/articles",
    request_body(content_type = "multipart/form-data", description = "title, content, optional format and image"),
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Invalid form", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Writers and admins only", body = ErrorSchema),
        (status = 409, description = "Duplicate title", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "createArticle"
)]
#[post("/articles")]
pub async fn create_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let actor = require_user(&session, &state).await?;
    require_publisher(&actor)?;
    let submission = read_article_form(payload, state.max_upload_bytes).await?;
    let article = state.articles.create(&actor, submission).await?;
    let location = format!("/api/v1/articles/{}", article.id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(ArticleResponse::new(article, state.timezone)))
}

/// Replace an article's title, body and optionally its banner.
#[utoipa::path(
    put,
    path = "/api/v1/articles/{id}",
    params(("id" = String, Path, description = "Article identifier")),
    request_body(content_type = "multipart/form-data", description = "title, content, optional format and image"),
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 400, description = "Invalid form", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Unknown article", body = ErrorSchema),
        (status = 409, description = "Duplicate title", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "updateArticle"
)]
#[put("/articles/{id}")]
pub async fn update_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<ArticleResponse>> {
    let actor = require_user(&session, &state).await?;
    let id = parse_article_id(&path.into_inner())?;
    let submission = read_article_form(payload, state.max_upload_bytes).await?;
    let article = state.articles.update(&actor, &id, submission).await?;
    Ok(article_json(&state, article))
}

/// Delete an article and its banner.
#[utoipa::path(
    delete,
    path = "/api/v1/articles/{id}",
    params(("id" = String, Path, description = "Article identifier")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Unknown article", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "deleteArticle"
)]
#[delete("/articles/{id}")]
pub async fn delete_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_user(&session, &state).await?;
    let id = parse_article_id(&path.into_inner())?;
    state.articles.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// One author's articles, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/authors/{id}/articles",
    params(("id" = String, Path, description = "Author identifier"), PageQuery),
    responses(
        (status = 200, description = "Article page", body = ArticlePageSchema),
        (status = 400, description = "Invalid identifier or cursor", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "listAuthorArticles",
    security([])
)]
#[get("/authors/{id}/articles")]
pub async fn list_author_articles(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let author = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let page = page_request(&params)?;
    let articles = state.articles_query.list_by_author(&author, page).await?;
    page_response(&req, &state, articles, page.limit)
}

/// One article addressed by author and slug.
#[utoipa::path(
    get,
    path = "/api/v1/authors/{id}/articles/{slug}",
    params(
        ("id" = String, Path, description = "Author identifier"),
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 400, description = "Invalid identifier or slug", body = ErrorSchema),
        (status = 404, description = "Unknown article", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "getAuthorArticle",
    security([])
)]
#[get("/authors/{id}/articles/{slug}")]
pub async fn get_author_article(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ArticleResponse>> {
    let (author, slug) = path.into_inner();
    let author = parse_user_id(&author, FieldName::new("id"))?;
    let slug = parse_slug(&slug)?;
    let article = state.articles_query.get_by_slug(&author, &slug).await?;
    Ok(article_json(&state, article))
}

/// Articles the signed-in account may manage: everything for admins, own
/// articles for writers.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/articles",
    params(PageQuery),
    responses(
        (status = 200, description = "Article page", body = ArticlePageSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Writers and admins only", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "dashboardArticles"
)]
#[get("/dashboard/articles")]
pub async fn dashboard_articles(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let actor = require_user(&session, &state).await?;
    let page = page_request(&params)?;
    let articles = state.articles_query.dashboard(&actor, page).await?;
    page_response(&req, &state, articles, page.limit)
}

#[cfg(test)]
#[path = "articles/tests.rs"]
mod tests;
