//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, articles,
//!   uploads, health)
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`UserSchema`] and
//!   friends) that describe domain types without coupling them to utoipa,
//!   plus the article response bodies
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::articles::{
    ArticlePageSchema, ArticleResponse, AuthorResponse, PageLinksSchema,
};
use crate::inbound::http::schemas::{
    ContentFormatSchema, ErrorCodeSchema, ErrorSchema, RoleSchema, UserSchema,
};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::users::{LoginRequest, RegisterRequest, RoleChangeRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Newsroom API",
        description = "Accounts, roles and article publishing with banner images.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::change_role,
        crate::inbound::http::articles::list_articles,
        crate::inbound::http::articles::search_articles,
        crate::inbound::http::articles::get_article,
        crate::inbound::http::articles::create_article,
        crate::inbound::http::articles::update_article,
        crate::inbound::http::articles::delete_article,
        crate::inbound::http::articles::list_author_articles,
        crate::inbound::http::articles::get_author_article,
        crate::inbound::http::articles::dashboard_articles,
        crate::inbound::http::uploads::serve_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        RoleSchema,
        ErrorSchema,
        ErrorCodeSchema,
        ContentFormatSchema,
        AuthorResponse,
        ArticleResponse,
        ArticlePageSchema,
        PageLinksSchema,
        RegisterRequest,
        LoginRequest,
        RoleChangeRequest,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and roles"),
        (name = "articles", description = "Publishing and reading articles"),
        (name = "media", description = "Uploaded banner images"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
