//! Tests for the account service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockUserRepository, UserPersistenceError};
use crate::domain::{ErrorCode, PasswordDigest};
use crate::test_support::clock::MutableClock;
use crate::test_support::memory::{InMemoryUserRepository, PlainTextHasher};
use crate::test_support::fixtures::{fixture_timestamp, user};

type Service = AccountService<MockUserRepository, MockPasswordHasher>;

fn make_service(repo: MockUserRepository, hasher: MockPasswordHasher) -> Service {
    AccountService::new(
        Arc::new(repo),
        Arc::new(hasher),
        Arc::new(MutableClock::new(fixture_timestamp())),
    )
}

fn account(user: User) -> UserAccount {
    UserAccount {
        user,
        password: PasswordDigest::new("$argon2id$stub"),
    }
}

fn hashing_stub() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Ok(PasswordDigest::new("$argon2id$stub")));
    hasher
}

fn registration() -> Registration {
    Registration::try_from_parts("new@example.com", "New Writer", "correct horse").expect("valid")
}

#[tokio::test]
async fn register_creates_reader_account_stamped_by_clock() {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .withf(|account| {
            account.user.role() == Role::User
                && account.user.email().to_string() == "new@example.com"
                && account.password.as_str() == "$argon2id$stub"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo, hashing_stub());
    let user = service.register(registration()).await.expect("registered");

    assert_eq!(user.role(), Role::User);
    assert_eq!(user.created_at(), fixture_timestamp());
}

#[tokio::test]
async fn register_maps_duplicate_email_to_conflict() {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_email("new@example.com")));

    let service = make_service(repo, hashing_stub());
    let err = service
        .register(registration())
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_failures_map_to_error_codes(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Err(failure));

    let service = make_service(repo, MockPasswordHasher::new());
    let err = service
        .current_user(&UserId::random())
        .await
        .expect_err("failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::Unauthorized))]
#[tokio::test]
async fn authenticate_checks_password(
    #[case] password_matches: bool,
    #[case] expected_error: Option<ErrorCode>,
) {
    let stored = user("Ada", Role::Writer);
    let expected_id = *stored.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(account(stored))));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .times(1)
        .return_once(move |_, _| Ok(password_matches));

    let service = make_service(repo, hasher);
    let creds = LoginCredentials::try_from_parts("ada@example.com", "secret-pass").expect("creds");
    let result = service.authenticate(&creds).await;

    match (result, expected_error) {
        (Ok(user), None) => assert_eq!(user.id(), &expected_id),
        (Err(err), Some(code)) => assert_eq!(err.code(), code),
        (other, expected) => panic!("unexpected outcome {other:?}, expected {expected:?}"),
    }
}

#[tokio::test]
async fn authenticate_rejects_unknown_email_after_decoy_verification() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().times(1).return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, digest| {
            password == "whatever" && digest.as_str() == UNKNOWN_ACCOUNT_DIGEST
        })
        .times(1)
        .return_once(|_, _| Ok(false));

    let service = make_service(repo, hasher);
    let creds = LoginCredentials::try_from_parts("ghost@example.com", "whatever").expect("creds");
    let err = service.authenticate(&creds).await.expect_err("unknown");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid credentials");
}

#[tokio::test]
async fn current_user_missing_account_requires_login() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = make_service(repo, MockPasswordHasher::new());
    let err = service
        .current_user(&UserId::random())
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[case(Role::User)]
#[case(Role::Writer)]
#[tokio::test]
async fn list_users_is_admin_only(#[case] role: Role) {
    let mut repo = MockUserRepository::new();
    repo.expect_list().times(0);

    let service = make_service(repo, MockPasswordHasher::new());
    let err = service
        .list_users(&user("Bob", role))
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn change_role_promotes_target() {
    let admin = user("Root", Role::Admin);
    let target = user("Reader", Role::User);
    let target_id = *target.id();
    let promoted = target.clone().with_role(Role::Writer);

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(target)));
    repo.expect_update_role()
        .withf(move |id, role| *id == target_id && *role == Role::Writer)
        .times(1)
        .return_once(move |_, _| Ok(Some(promoted)));

    let service = make_service(repo, MockPasswordHasher::new());
    let updated = service
        .change_role(&admin, &target_id, Role::Writer)
        .await
        .expect("promoted");

    assert_eq!(updated.role(), Role::Writer);
}

#[tokio::test]
async fn change_role_refuses_to_demote_last_admin() {
    let admin = user("Root", Role::Admin);
    let admin_id = *admin.id();
    let stored = admin.clone();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_demote_admin()
        .withf(move |id, role| *id == admin_id && *role == Role::User)
        .times(1)
        .return_once(|_, _| Err(UserPersistenceError::last_admin()));
    repo.expect_update_role().times(0);

    let service = make_service(repo, MockPasswordHasher::new());
    let err = service
        .change_role(&admin, &admin_id, Role::User)
        .await
        .expect_err("last admin");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "cannot demote the last admin");
}

#[tokio::test]
async fn change_role_same_role_skips_storage() {
    let admin = user("Root", Role::Admin);
    let target = user("Writer", Role::Writer);
    let target_id = *target.id();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(target)));
    repo.expect_update_role().times(0);
    repo.expect_demote_admin().times(0);

    let service = make_service(repo, MockPasswordHasher::new());
    let unchanged = service
        .change_role(&admin, &target_id, Role::Writer)
        .await
        .expect("unchanged");

    assert_eq!(unchanged.role(), Role::Writer);
}

/// User store that yields after each lookup, so two role changes read their
/// targets before either writes.
struct InterleavingUsers(InMemoryUserRepository);

#[async_trait::async_trait]
impl UserRepository for InterleavingUsers {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        self.0.insert(account).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let found = self.0.find_by_id(id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        self.0.find_by_email(email).await
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        self.0.list().await
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.0.update_role(id, role).await
    }

    async fn demote_admin(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.0.demote_admin(id, role).await
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, UserPersistenceError> {
        self.0.count_by_role(role).await
    }
}

#[tokio::test]
async fn concurrent_mutual_demotions_keep_one_admin() {
    let first = user("Ada", Role::Admin);
    let second = user("Grace", Role::Admin);
    let users = InMemoryUserRepository::new();
    for admin in [&first, &second] {
        users.insert(&account(admin.clone())).await.expect("seed admin");
    }
    let users = Arc::new(InterleavingUsers(users));
    let service = AccountService::new(
        Arc::clone(&users),
        Arc::new(PlainTextHasher),
        Arc::new(MutableClock::new(fixture_timestamp())),
    );

    let (demote_second, demote_first) = tokio::join!(
        service.change_role(&first, second.id(), Role::User),
        service.change_role(&second, first.id(), Role::User),
    );

    let outcomes = [demote_second, demote_first];
    let refused: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().err()).collect();
    assert_eq!(refused.len(), 1, "exactly one demotion must be refused: {outcomes:?}");
    assert_eq!(refused[0].code(), ErrorCode::Conflict);
    assert_eq!(users.count_by_role(Role::Admin).await.expect("count"), 1);
}

#[tokio::test]
async fn change_role_unknown_target_is_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = make_service(repo, MockPasswordHasher::new());
    let err = service
        .change_role(&user("Root", Role::Admin), &UserId::random(), Role::Writer)
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

fn bootstrap() -> AdminBootstrap {
    AdminBootstrap {
        email: Email::new("admin@example.com").expect("email"),
        display_name: DisplayName::new("Admin").expect("name"),
        password: Password::new("admin-password").expect("password"),
    }
}

#[tokio::test]
async fn ensure_admin_is_noop_when_admin_exists() {
    let mut repo = MockUserRepository::new();
    repo.expect_count_by_role().times(1).return_once(|_| Ok(2));
    repo.expect_find_by_email().times(0);
    repo.expect_insert().times(0);

    let service = make_service(repo, MockPasswordHasher::new());
    let outcome = service.ensure_admin(bootstrap()).await.expect("bootstrap");

    assert_eq!(outcome, AdminBootstrapOutcome::AlreadyPresent);
}

#[tokio::test]
async fn ensure_admin_promotes_existing_account() {
    let existing = user("Admin", Role::User);
    let promoted = existing.clone().with_role(Role::Admin);
    let mut repo = MockUserRepository::new();
    repo.expect_count_by_role().times(1).return_once(|_| Ok(0));
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(account(existing))));
    repo.expect_update_role()
        .times(1)
        .return_once(move |_, _| Ok(Some(promoted)));
    repo.expect_insert().times(0);

    let service = make_service(repo, MockPasswordHasher::new());
    let outcome = service.ensure_admin(bootstrap()).await.expect("bootstrap");

    assert!(matches!(outcome, AdminBootstrapOutcome::Promoted(user) if user.role() == Role::Admin));
}

#[tokio::test]
async fn ensure_admin_creates_missing_account() {
    let mut repo = MockUserRepository::new();
    repo.expect_count_by_role().times(1).return_once(|_| Ok(0));
    repo.expect_find_by_email().times(1).return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|account| account.user.role() == Role::Admin)
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo, hashing_stub());
    let outcome = service.ensure_admin(bootstrap()).await.expect("bootstrap");

    assert!(matches!(outcome, AdminBootstrapOutcome::Created(user) if user.role() == Role::Admin));
}
