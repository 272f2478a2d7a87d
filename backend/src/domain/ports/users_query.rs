//! Driving port for user-facing queries.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Resolve the account behind a session.
    ///
    /// A session naming a deleted account fails with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn current_user(&self, id: &UserId) -> Result<User, Error>;

    /// List every account. Admin only.
    async fn list_users(&self, actor: &User) -> Result<Vec<User>, Error>;
}
