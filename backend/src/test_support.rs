//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and when the
//! `test-support` feature is enabled.

pub mod memory;

pub mod clock {
    //! Deterministic clocks for services that stamp records.

    use std::sync::{Mutex, PoisonError};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock returning a fixed instant that tests can move forward.
    #[derive(Debug)]
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        /// Start the clock at `now`.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Move the clock forward by whole seconds.
        pub fn advance_seconds(&self, seconds: i64) {
            let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            *now += TimeDelta::seconds(seconds);
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

pub mod fixtures {
    //! Small builders for domain values used across suites.

    use chrono::{DateTime, TimeZone, Utc};

    use crate::domain::{DisplayName, Email, Role, User, UserId};

    /// Fixed instant used as "now" by fixture clocks.
    pub fn fixture_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Build a user with the given role and a unique email derived from `name`.
    ///
    /// # Panics
    /// Panics when `name` cannot form a valid display name or email.
    pub fn user(name: &str, role: Role) -> User {
        let email = Email::new(format!("{}@example.com", name.to_lowercase()))
            .unwrap_or_else(|err| panic!("fixture email for {name}: {err}"));
        let display_name = DisplayName::new(name)
            .unwrap_or_else(|err| panic!("fixture display name {name}: {err}"));
        User::new(
            UserId::random(),
            email,
            display_name,
            role,
            fixture_timestamp(),
        )
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => panic!(
                "schema '{name}' is a $ref to '{}'; resolve the reference first",
                reference.ref_location
            ),
            _ => panic!("schema '{name}' is not an Object"),
        }
    }
}

pub mod http {
    //! In-memory application wiring and request builders for handler tests.

    use std::sync::Arc;

    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::{App, web};
    use uuid::Uuid;

    use super::clock::MutableClock;
    use super::fixtures::fixture_timestamp;
    use super::memory::{
        InMemoryArticleRepository, InMemoryImageStore, InMemoryUserRepository, PlainTextHasher,
    };
    use crate::Trace;
    use crate::domain::ports::{AccountCommand, UserRepository};
    use crate::domain::{
        AccountService, ArticleService, DisplayTimezone, Registration, Role, User,
    };
    use crate::inbound::http::state::{HttpSettings, HttpState, HttpStatePorts};
    use crate::inbound::http::{configure_api, health, uploads};

    /// Password given to every seeded account.
    pub const SEED_PASSWORD: &str = "correct horse battery";

    /// Services over in-memory adapters plus handles for assertions.
    pub struct TestApp {
        /// Account storage.
        pub users: Arc<InMemoryUserRepository>,
        /// Banner image storage.
        pub images: Arc<InMemoryImageStore>,
        /// Clock stamping accounts and articles.
        pub clock: Arc<MutableClock>,
        /// Handler state wired to the services.
        pub state: web::Data<HttpState>,
        accounts: Arc<AccountService<InMemoryUserRepository, PlainTextHasher>>,
        session_key: Key,
    }

    impl TestApp {
        /// Wire services with a UTC display zone and a 64 KiB upload limit.
        pub fn new() -> Self {
            Self::with_settings(HttpSettings {
                timezone: DisplayTimezone::default(),
                max_upload_bytes: 64 * 1024,
            })
        }

        /// Wire services with explicit handler settings.
        pub fn with_settings(settings: HttpSettings) -> Self {
            let clock = Arc::new(MutableClock::new(fixture_timestamp()));
            let users = Arc::new(InMemoryUserRepository::new());
            let images = Arc::new(InMemoryImageStore::new());
            let accounts = Arc::new(AccountService::new(
                users.clone(),
                Arc::new(PlainTextHasher),
                clock.clone(),
            ));
            let articles = Arc::new(ArticleService::new(
                Arc::new(InMemoryArticleRepository::new(users.clone())),
                images.clone(),
                clock.clone(),
            ));
            let state = HttpState::new(
                HttpStatePorts {
                    login: accounts.clone(),
                    users: accounts.clone(),
                    accounts: accounts.clone(),
                    articles: articles.clone(),
                    articles_query: articles.clone(),
                    media: articles,
                },
                settings,
            );
            Self {
                users,
                images,
                clock,
                state: web::Data::new(state),
                accounts,
                session_key: Key::generate(),
            }
        }

        /// Register an account and give it `role`.
        ///
        /// # Panics
        /// Panics when `name` cannot form a valid account.
        pub async fn seed_user(&self, name: &str, role: Role) -> User {
            let email = format!("{}@example.com", name.to_lowercase());
            let registration = Registration::try_from_parts(&email, name, SEED_PASSWORD)
                .unwrap_or_else(|err| panic!("seed registration for {name}: {err}"));
            let user = self
                .accounts
                .register(registration)
                .await
                .unwrap_or_else(|err| panic!("seed {name}: {err}"));
            if role == Role::User {
                return user;
            }
            self.users
                .update_role(user.id(), role)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| panic!("seed role for {name}"))
        }

        /// Build the application with a test session middleware.
        ///
        /// Every app built from one harness shares its session key, so cookies
        /// issued by one instance are accepted by the next.
        pub fn app(
            &self,
        ) -> App<
            impl ServiceFactory<
                ServiceRequest,
                Config = (),
                Response = ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            > + use<>,
        > {
            let session =
                SessionMiddleware::builder(CookieSessionStore::default(), self.session_key.clone())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build();
            App::new()
                .app_data(self.state.clone())
                .app_data(web::Data::new(health::HealthState::ready()))
                .wrap(Trace)
                .service(web::scope("/api/v1").wrap(session).configure(configure_api))
                .service(uploads::serve_upload)
                .service(health::ready)
                .service(health::live)
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }

    /// One part of a `multipart/form-data` body.
    #[derive(Debug, Clone)]
    pub enum FormPart<'a> {
        /// Plain text field.
        Text {
            /// Field name.
            name: &'a str,
            /// Field value.
            value: &'a str,
        },
        /// File field.
        File {
            /// Field name.
            name: &'a str,
            /// Client-side filename.
            filename: &'a str,
            /// File content.
            bytes: &'a [u8],
        },
    }

    /// Encode `parts` as a multipart body, returning the content type header
    /// value and the payload.
    pub fn multipart(parts: &[FormPart<'_>]) -> (String, Vec<u8>) {
        let boundary = format!("newsroom-{}", Uuid::new_v4().simple());
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match part {
                FormPart::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                FormPart::File {
                    name,
                    filename,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; \
                             filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }
}
