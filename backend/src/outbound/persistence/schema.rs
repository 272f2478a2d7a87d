//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate them with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Lowercased login email, unique (`users_email_key`).
        email -> Varchar,
        /// Byline name.
        display_name -> Varchar,
        /// Access tier: `user`, `writer` or `admin`.
        role -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published articles.
    ///
    /// `(author_id, slug)` is unique (`articles_author_slug_key`) and so is
    /// `(author_id, lower(title))` (`articles_author_title_key`).
    articles (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Author; rows are removed with the account.
        author_id -> Uuid,
        /// Headline.
        title -> Varchar,
        /// Per-author URL identifier.
        slug -> Varchar,
        /// `markdown` or `html`.
        content_format -> Varchar,
        /// Body exactly as submitted.
        content_source -> Text,
        /// Sanitised HTML rendering of the body.
        content_html -> Text,
        /// Stored banner image file name.
        image -> Nullable<Varchar>,
        /// Publication timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(articles -> users (author_id));
diesel::allow_tables_to_appear_in_same_query!(articles, users);
