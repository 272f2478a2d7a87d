//! HTTP inbound adapter exposing the JSON API.

pub mod article_form;
pub mod articles;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

use actix_web::web;

/// Register every `/api/v1` handler plus the JSON envelope for extractor
/// failures.
///
/// `/articles/search` is registered ahead of `/articles/{id}` so the literal
/// segment wins.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use newsroom::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::list_users)
        .service(users::change_role)
        .service(articles::list_articles)
        .service(articles::search_articles)
        .service(articles::get_article)
        .service(articles::create_article)
        .service(articles::update_article)
        .service(articles::delete_article)
        .service(articles::list_author_articles)
        .service(articles::get_author_article)
        .service(articles::dashboard_articles);
}
