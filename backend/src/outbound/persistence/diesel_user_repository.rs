//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, Email, PasswordDigest, Role, User, UserAccount, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, email: &Email) -> UserPersistenceError {
    if violated_unique_constraint(&error) == Some(EMAIL_UNIQUE_CONSTRAINT) {
        return UserPersistenceError::duplicate_email(email.to_string());
    }
    map_diesel_error(error)
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("invalid {column} in database: {err}"))
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let UserRow {
        id,
        email,
        display_name,
        role,
        password_hash,
        created_at,
    } = row;

    let user = User::new(
        UserId::from_uuid(id),
        Email::new(email).map_err(|err| corrupt("email", err))?,
        DisplayName::new(display_name).map_err(|err| corrupt("display_name", err))?,
        Role::from_str(&role).map_err(|err| corrupt("role", err))?,
        created_at,
    );
    Ok(UserAccount {
        user,
        password: PasswordDigest::new(password_hash),
    })
}

/// Outcome of the locked admin demotion transaction.
enum Demotion {
    Refused,
    Applied(Option<UserRow>),
}

fn demotion_to_user(outcome: Demotion) -> Result<Option<User>, UserPersistenceError> {
    match outcome {
        Demotion::Refused => Err(UserPersistenceError::last_admin()),
        Demotion::Applied(row) => row.map(row_to_user).transpose(),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_account(row).map(|account| account.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            password_hash: account.password.as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, user.email()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email: &str = email.as_ref();

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(users::table.find(id.as_uuid()))
            .set(users::role.eq(role.as_str()))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn demote_admin(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = *id.as_uuid();

        let outcome = conn
            .transaction(|conn| {
                async move {
                    // Row locks serialise competing demotions; a waiter re-reads
                    // the admin set after the winner commits.
                    let admins: Vec<Uuid> = users::table
                        .filter(users::role.eq(Role::Admin.as_str()))
                        .select(users::id)
                        .for_update()
                        .load(conn)
                        .await?;

                    if admins.contains(&target) && admins.len() <= 1 {
                        return Ok(Demotion::Refused);
                    }

                    let row = diesel::update(users::table.find(target))
                        .set(users::role.eq(role.as_str()))
                        .returning(UserRow::as_returning())
                        .get_result::<UserRow>(conn)
                        .await
                        .optional()?;
                    Ok(Demotion::Applied(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        demotion_to_user(outcome)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = users::table
            .filter(users::role.eq(role.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(count).map_err(|err| corrupt("role count", err))
    }
}
