//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is a `400 invalid_request` whose details name the
//! offending field and a stable machine-readable code.

use std::fmt::Display;

use pagination::{Cursor, CursorError};
use serde_json::json;

use crate::domain::{
    ArticleCursorKey, ArticleId, ArticleValidationError, ContentValidationError, Error,
    ImageValidationError, LoginValidationError, PasswordValidationError,
    RegistrationValidationError, Role, SearchTerm, SearchTermValidationError, Slug,
    UserId, UserValidationError,
};

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

pub(crate) fn field_error(field: FieldName, code: &'static str, message: impl Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field.0,
        "code": code,
    }))
}

fn value_error(field: FieldName, code: &'static str, message: impl Display, value: &str) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field.0,
        "value": value,
        "code": code,
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        "missing_field",
        format!("missing required field: {}", field.0),
    )
}

fn user_error(err: &UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => ("id", "invalid_uuid"),
        UserValidationError::EmptyEmail => ("email", "empty_email"),
        UserValidationError::EmailLength { .. } => ("email", "email_length"),
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::EmptyDisplayName => ("displayName", "empty_display_name"),
        UserValidationError::DisplayNameTooLong { .. } => ("displayName", "display_name_too_long"),
        UserValidationError::DisplayNameInvalidCharacters => {
            ("displayName", "display_name_invalid_characters")
        }
        UserValidationError::UnknownRole => ("role", "unknown_role"),
    };
    field_error(FieldName::new(field), code, err)
}

fn password_error(err: &PasswordValidationError) -> Error {
    let code = match err {
        PasswordValidationError::TooShort { .. } => "password_too_short",
        PasswordValidationError::TooLong { .. } => "password_too_long",
    };
    field_error(FieldName::new("password"), code, err)
}

pub(crate) fn registration_error(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => user_error(&inner),
        RegistrationValidationError::Password(inner) => password_error(&inner),
    }
}

pub(crate) fn login_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    field_error(FieldName::new(field), code, err)
}

fn content_error(err: &ContentValidationError) -> Error {
    match err {
        ContentValidationError::Empty => {
            field_error(FieldName::new("content"), "empty_content", err)
        }
        ContentValidationError::UnknownFormat => {
            field_error(FieldName::new("format"), "unknown_format", err)
        }
    }
}

pub(crate) fn article_error(err: ArticleValidationError) -> Error {
    match err {
        ArticleValidationError::InvalidId => {
            field_error(FieldName::new("id"), "invalid_uuid", err)
        }
        ArticleValidationError::EmptyTitle => {
            field_error(FieldName::new("title"), "empty_title", err)
        }
        ArticleValidationError::TitleTooLong { .. } => {
            field_error(FieldName::new("title"), "title_too_long", err)
        }
        ArticleValidationError::Content(inner) => content_error(&inner),
    }
}

pub(crate) fn image_error(err: ImageValidationError) -> Error {
    let code = match err {
        ImageValidationError::EmptyFilename => "empty_filename",
        ImageValidationError::UnsupportedExtension => "unsupported_extension",
        ImageValidationError::EmptyFile => "empty_file",
        ImageValidationError::TooLarge { .. } => "file_too_large",
        ImageValidationError::InvalidName => "invalid_image_name",
    };
    field_error(FieldName::new("image"), code, err)
}

pub(crate) fn parse_user_id(raw: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| value_error(field, "invalid_uuid", "must be a valid UUID", raw))
}

pub(crate) fn parse_article_id(raw: &str) -> Result<ArticleId, Error> {
    ArticleId::new(raw).map_err(|_| {
        value_error(
            FieldName::new("id"),
            "invalid_uuid",
            "article id must be a valid UUID",
            raw,
        )
    })
}

pub(crate) fn parse_slug(raw: &str) -> Result<Slug, Error> {
    Slug::new(raw).map_err(|err| value_error(FieldName::new("slug"), "invalid_slug", err, raw))
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse::<Role>()
        .map_err(|err| value_error(FieldName::new("role"), "unknown_role", err, raw))
}

pub(crate) fn parse_search_term(raw: Option<&str>) -> Result<SearchTerm, Error> {
    let field = FieldName::new("q");
    let raw = raw.ok_or_else(|| missing_field_error(field))?;
    SearchTerm::new(raw).map_err(|err| {
        let code = match err {
            SearchTermValidationError::Empty => "empty_query",
            SearchTermValidationError::TooLong { .. } => "query_too_long",
        };
        field_error(field, code, err)
    })
}

pub(crate) fn parse_cursor(raw: Option<&str>) -> Result<Option<ArticleCursorKey>, Error> {
    raw.map(|token| {
        Cursor::<ArticleCursorKey>::decode(token)
            .map(Cursor::into_key)
            .map_err(|err: CursorError| {
                value_error(FieldName::new("cursor"), "invalid_cursor", err, token)
            })
    })
    .transpose()
}
