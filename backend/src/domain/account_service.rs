//! Account domain service.
//!
//! Implements registration, login, role management and the startup admin
//! bootstrap on top of the user repository and password hasher ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, AdminBootstrap, AdminBootstrapOutcome, LoginService, PasswordHashError,
    PasswordHasher, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    DisplayName, Email, Error, LoginCredentials, Password, PasswordDigest, Registration, Role,
    User, UserAccount, UserId, require_admin,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Argon2id digest with the default cost that matches no password.
///
/// Logins for unknown emails verify against it so their latency matches
/// logins that reach a stored digest.
pub const UNKNOWN_ACCOUNT_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$7/C7HuexrrFGPLiUJhpp/g$fsQFTzWCl3o7Gh3EdzunUafRtPeKsWtMawiOtP48CGg";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("email address is already registered")
        }
        UserPersistenceError::LastAdmin => Error::conflict("cannot demote the last admin"),
    }
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> AccountService<U, H> {
    /// Create a new service with the given repository, hasher and clock.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<U, H> AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn create_account(
        &self,
        email: Email,
        display_name: DisplayName,
        password: &Password,
        role: Role,
    ) -> Result<User, Error> {
        let digest = self
            .hasher
            .hash(password.expose())
            .await
            .map_err(map_hash_error)?;
        let user = User::new(UserId::random(), email, display_name, role, self.clock.utc());
        let account = UserAccount {
            user: user.clone(),
            password: digest,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        Ok(user)
    }

    async fn admin_count(&self) -> Result<u64, Error> {
        self.users
            .count_by_role(Role::Admin)
            .await
            .map_err(map_user_error)
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        self.users
            .update_role(id, role)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn demote(&self, id: &UserId, role: Role) -> Result<User, Error> {
        self.users
            .demote_admin(id, role)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(account) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
        else {
            let digest = PasswordDigest::new(UNKNOWN_ACCOUNT_DIGEST);
            if let Err(err) = self.hasher.verify(credentials.password(), &digest).await {
                warn!(error = %err, "unknown-account verification failed");
            }
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &account.password)
            .await
            .map_err(map_hash_error)?;
        if verified {
            Ok(account.user)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<U, H> UsersQuery for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn current_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn list_users(&self, actor: &User) -> Result<Vec<User>, Error> {
        require_admin(actor)?;
        self.users.list().await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U, H> AccountCommand for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            display_name,
            password,
        } = registration;
        let user = self
            .create_account(email, display_name, &password, Role::User)
            .await?;
        info!(user_id = %user.id(), "account registered");
        Ok(user)
    }

    async fn change_role(&self, actor: &User, target: &UserId, role: Role) -> Result<User, Error> {
        require_admin(actor)?;
        let current = self
            .users
            .find_by_id(target)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(target))?;
        if current.role() == role {
            return Ok(current);
        }

        let updated = if current.role().is_admin() && !role.is_admin() {
            self.demote(target, role).await?
        } else {
            self.set_role(target, role).await?
        };
        info!(
            actor = %actor.id(),
            user_id = %target,
            role = role.as_str(),
            "role changed"
        );
        Ok(updated)
    }

    async fn admin_exists(&self) -> Result<bool, Error> {
        Ok(self.admin_count().await? > 0)
    }

    async fn ensure_admin(
        &self,
        bootstrap: AdminBootstrap,
    ) -> Result<AdminBootstrapOutcome, Error> {
        if self.admin_count().await? > 0 {
            return Ok(AdminBootstrapOutcome::AlreadyPresent);
        }

        let existing = self
            .users
            .find_by_email(&bootstrap.email)
            .await
            .map_err(map_user_error)?;
        if let Some(account) = existing {
            let user = self.set_role(account.user.id(), Role::Admin).await?;
            warn!(user_id = %user.id(), "no admin found; promoted bootstrap account");
            return Ok(AdminBootstrapOutcome::Promoted(user));
        }

        let user = self
            .create_account(
                bootstrap.email,
                bootstrap.display_name,
                &bootstrap.password,
                Role::Admin,
            )
            .await?;
        warn!(user_id = %user.id(), "no admin found; created bootstrap account");
        Ok(AdminBootstrapOutcome::Created(user))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
