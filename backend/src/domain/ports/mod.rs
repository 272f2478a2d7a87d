//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod article_command;
mod article_query;
mod article_repository;
mod image_store;
mod login_service;
mod media_query;
mod password_hasher;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AdminBootstrap, AdminBootstrapOutcome};
#[cfg(test)]
pub use article_command::MockArticleCommand;
pub use article_command::{ArticleCommand, ArticleSubmission};
pub use article_query::ArticleQuery;
#[cfg(test)]
pub use article_query::MockArticleQuery;
pub use article_repository::{ArticlePersistenceError, ArticleRepository};
#[cfg(test)]
pub use article_repository::MockArticleRepository;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use media_query::MockMediaQuery;
pub use media_query::{MediaQuery, StoredImage};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
pub use users_query::UsersQuery;
#[cfg(test)]
pub use users_query::MockUsersQuery;
