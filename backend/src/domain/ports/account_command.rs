//! Driving port for account mutations.

use async_trait::async_trait;

use crate::domain::{DisplayName, Email, Error, Password, Registration, Role, User, UserId};

/// Credentials used to guarantee an administrator exists at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    /// Email of the bootstrap account.
    pub email: Email,
    /// Display name used if the account has to be created.
    pub display_name: DisplayName,
    /// Password used if the account has to be created.
    pub password: Password,
}

/// What [`AccountCommand::ensure_admin`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrapOutcome {
    /// An administrator already existed; nothing changed.
    AlreadyPresent,
    /// The existing bootstrap account was promoted.
    Promoted(User),
    /// The bootstrap account was created as an administrator.
    Created(User),
}

/// Domain use-case port for registering accounts and managing roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create a reader account.
    ///
    /// Fails with [`crate::domain::ErrorCode::Conflict`] when the email is
    /// already registered.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Assign `role` to `target`. Admin only.
    ///
    /// Demoting the last administrator is refused with a conflict.
    async fn change_role(&self, actor: &User, target: &UserId, role: Role) -> Result<User, Error>;

    /// Report whether any administrator account exists.
    async fn admin_exists(&self) -> Result<bool, Error>;

    /// Make sure at least one administrator exists.
    ///
    /// Idempotent: once an administrator exists later calls change nothing.
    async fn ensure_admin(
        &self,
        bootstrap: AdminBootstrap,
    ) -> Result<AdminBootstrapOutcome, Error>;
}
