//! Builders wiring adapters into services and handler state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use newsroom::domain::ports::{ImageStore, PasswordHasher, UserRepository, ArticleRepository};
use newsroom::domain::{AccountService, ArticleService};
use newsroom::inbound::http::state::{HttpSettings, HttpState, HttpStatePorts};
use newsroom::outbound::persistence::{DbPool, DieselArticleRepository, DieselUserRepository};
use newsroom::outbound::security::Argon2PasswordHasher;
use newsroom::outbound::storage::CapStdImageStore;

/// Account and article services sharing one clock.
pub(crate) struct Services<U, H, A, I> {
    pub(crate) accounts: Arc<AccountService<U, H>>,
    pub(crate) articles: Arc<ArticleService<A, I>>,
}

impl<U, H, A, I> Services<U, H, A, I>
where
    U: UserRepository + 'static,
    H: PasswordHasher + 'static,
    A: ArticleRepository + 'static,
    I: ImageStore + 'static,
{
    /// Build both services over the given adapters.
    pub(crate) fn new(
        users: Arc<U>,
        hasher: Arc<H>,
        articles: Arc<A>,
        images: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(users, hasher, clock.clone())),
            articles: Arc::new(ArticleService::new(articles, images, clock)),
        }
    }

    /// Handler state exposing the services through their driving ports.
    pub(crate) fn http_state(&self, settings: HttpSettings) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                login: self.accounts.clone(),
                users: self.accounts.clone(),
                accounts: self.accounts.clone(),
                articles: self.articles.clone(),
                articles_query: self.articles.clone(),
                media: self.articles.clone(),
            },
            settings,
        )
    }
}

/// Services backed by PostgreSQL, Argon2 and the upload directory.
pub(crate) type ProductionServices =
    Services<DieselUserRepository, Argon2PasswordHasher, DieselArticleRepository, CapStdImageStore>;

pub(crate) fn build_services(pool: &DbPool, images: CapStdImageStore) -> ProductionServices {
    Services::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(DieselArticleRepository::new(pool.clone())),
        Arc::new(images),
        Arc::new(DefaultClock),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use newsroom::domain::{DisplayTimezone, LoginCredentials, Registration};
    use newsroom::test_support::clock::MutableClock;
    use newsroom::test_support::fixtures::fixture_timestamp;
    use newsroom::test_support::memory::{
        InMemoryArticleRepository, InMemoryImageStore, InMemoryUserRepository, PlainTextHasher,
    };
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn state_routes_every_port_to_the_shared_services() {
        let users = Arc::new(InMemoryUserRepository::new());
        let services = Services::new(
            users.clone(),
            Arc::new(PlainTextHasher),
            Arc::new(InMemoryArticleRepository::new(users)),
            Arc::new(InMemoryImageStore::new()),
            Arc::new(MutableClock::new(fixture_timestamp())),
        );
        let state = services.http_state(HttpSettings {
            timezone: DisplayTimezone::default(),
            max_upload_bytes: 1024,
        });

        let registration = Registration::try_from_parts("ada@example.com", "Ada", "long secret")
            .expect("registration");
        let created = state.accounts.register(registration).await.expect("register");
        let credentials =
            LoginCredentials::try_from_parts("ada@example.com", "long secret").expect("creds");
        let authenticated = state.login.authenticate(&credentials).await.expect("login");

        assert_eq!(authenticated.id(), created.id());
        assert_eq!(state.max_upload_bytes, 1024);
    }
}
