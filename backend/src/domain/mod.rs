//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities used by the API and persistence
//! layers, plus the services implementing the publishing use-cases. Keep
//! types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifier.
//! - User, Role, Email: accounts and access tiers.
//! - Article, ArticleDraft, Slug, ArticleContent: published content.
//! - AccountService, ArticleService: driving port implementations.
//! - ports: traits at the hexagon edges.

pub mod access;
pub mod account_service;
pub mod article;
pub mod article_service;
pub mod auth;
pub mod content;
pub mod error;
pub mod image;
pub mod listing;
pub mod localization;
pub mod ports;
pub mod search;
pub mod slug;
pub mod trace_id;
pub mod user;

pub use self::access::{
    can_modify, dashboard_filter, require_admin, require_modify, require_publisher,
};
pub use self::account_service::AccountService;
pub use self::article::{
    Article, ArticleChanges, ArticleDraft, ArticleId, ArticleValidationError, Byline, NewArticle,
    TITLE_MAX, Title,
};
pub use self::article_service::ArticleService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MAX, PASSWORD_MIN, Password,
    PasswordValidationError, Registration, RegistrationValidationError,
};
pub use self::content::{
    ALLOWED_TAGS, ArticleContent, ContentFormat, ContentValidationError, render, sanitize,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image::{
    ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES, ImageName, ImageUpload, ImageValidationError,
    secure_filename,
};
pub use self::listing::{ArticleCursorKey, ArticleFilter, ArticleListQuery, ArticlePage, PageRequest};
pub use self::localization::{DisplayTimezone, TimezoneValidationError};
pub use self::search::{SEARCH_TERM_MAX, SearchTerm, SearchTermValidationError};
pub use self::slug::{FALLBACK_SLUG, SLUG_MAX, Slug, SlugValidationError, allocate_slug, slugify};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, EMAIL_MIN, Email, PasswordDigest, Role, User,
    UserAccount, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use newsroom::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
