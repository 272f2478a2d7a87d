//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`; the
//! wrappers here mirror their serialised shape for the generated document.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with stored state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "you already have an article with this title")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level detail such as `{"field": "title", "code": "empty_title"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    /// Reader; may only manage their own account.
    #[schema(rename = "user")]
    User,
    /// May publish and manage their own articles.
    #[schema(rename = "writer")]
    Writer,
    /// May manage every article and account role.
    #[schema(rename = "admin")]
    Admin,
}

/// OpenAPI schema for [`crate::domain::ContentFormat`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ContentFormat)]
pub enum ContentFormatSchema {
    /// CommonMark source rendered to HTML.
    #[schema(rename = "markdown")]
    Markdown,
    /// HTML source, sanitised before storage.
    #[schema(rename = "html")]
    Html,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Login email, unique across accounts.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Name shown on bylines.
    #[schema(example = "Ada Lovelace")]
    display_name: String,
    /// Access tier.
    role: RoleSchema,
    /// Registration instant (RFC 3339, UTC).
    #[schema(example = "2026-03-14T09:00:00Z")]
    created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    #[case("invalid_request")]
    #[case("unauthorized")]
    #[case("forbidden")]
    #[case("not_found")]
    #[case("conflict")]
    #[case("service_unavailable")]
    #[case("internal_error")]
    fn error_codes_match_the_wire_format(#[case] code: &str) {
        assert!(schema_json::<ErrorCodeSchema>().contains(code), "missing {code}");
    }

    #[rstest]
    fn error_schema_uses_camel_case_fields() {
        let json = schema_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(json.contains("traceId"));
        assert!(!json.contains("trace_id"));
    }

    #[rstest]
    fn user_schema_lists_public_fields() {
        let json = schema_json::<UserSchema>();
        for field in ["id", "email", "displayName", "role", "createdAt"] {
            assert!(json.contains(field), "missing {field}");
        }
        assert!(!json.contains("password"));
    }

    #[rstest]
    #[case("user")]
    #[case("writer")]
    #[case("admin")]
    fn roles_are_lowercase(#[case] role: &str) {
        assert!(schema_json::<RoleSchema>().contains(role));
    }
}
