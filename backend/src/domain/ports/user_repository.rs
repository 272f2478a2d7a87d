//! Port abstraction for account persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Email, Role, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// The demotion would leave no administrator.
        LastAdmin => "cannot demote the last admin",
    }
}

/// Port for storing and reading user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] when the email is
    /// already registered.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account, including its password digest, by email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// List every user, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Set the role of an account, returning the updated user when it exists.
    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Move an administrator to a non-admin `role`.
    ///
    /// The admin headcount check and the update happen atomically, so
    /// concurrent demotions can never remove every administrator. Fails with
    /// [`UserPersistenceError::LastAdmin`] when `id` is the only admin left.
    async fn demote_admin(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Count accounts holding `role`.
    async fn count_by_role(&self, role: Role) -> Result<u64, UserPersistenceError>;
}
