//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::DisplayTimezone;
use crate::domain::ports::{
    AccountCommand, ArticleCommand, ArticleQuery, LoginService, MediaQuery, UsersQuery,
};

/// Parameter object bundling the driving ports used by HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn AccountCommand>,
    pub articles: Arc<dyn ArticleCommand>,
    pub articles_query: Arc<dyn ArticleQuery>,
    pub media: Arc<dyn MediaQuery>,
}

/// Request-shaping settings that are not ports.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    /// Zone used for the localised timestamps in article responses.
    pub timezone: DisplayTimezone,
    /// Largest accepted banner image in bytes.
    pub max_upload_bytes: usize,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn AccountCommand>,
    pub articles: Arc<dyn ArticleCommand>,
    pub articles_query: Arc<dyn ArticleQuery>,
    pub media: Arc<dyn MediaQuery>,
    pub timezone: DisplayTimezone,
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state from the ports bundle and settings.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use newsroom::domain::{AccountService, ArticleService, DisplayTimezone};
    /// use newsroom::inbound::http::state::{HttpSettings, HttpState, HttpStatePorts};
    /// use newsroom::test_support::memory::{
    ///     InMemoryArticleRepository, InMemoryImageStore, InMemoryUserRepository,
    ///     PlainTextHasher,
    /// };
    ///
    /// let users = Arc::new(InMemoryUserRepository::default());
    /// let accounts = Arc::new(AccountService::new(
    ///     users.clone(),
    ///     Arc::new(PlainTextHasher),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let articles = Arc::new(ArticleService::new(
    ///     Arc::new(InMemoryArticleRepository::new(users)),
    ///     Arc::new(InMemoryImageStore::default()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         login: accounts.clone(),
    ///         users: accounts.clone(),
    ///         accounts,
    ///         articles: articles.clone(),
    ///         articles_query: articles.clone(),
    ///         media: articles,
    ///     },
    ///     HttpSettings {
    ///         timezone: DisplayTimezone::default(),
    ///         max_upload_bytes: 1024,
    ///     },
    /// );
    /// assert_eq!(state.max_upload_bytes, 1024);
    /// ```
    pub fn new(ports: HttpStatePorts, settings: HttpSettings) -> Self {
        let HttpStatePorts {
            login,
            users,
            accounts,
            articles,
            articles_query,
            media,
        } = ports;
        let HttpSettings {
            timezone,
            max_upload_bytes,
        } = settings;
        Self {
            login,
            users,
            accounts,
            articles,
            articles_query,
            media,
            timezone,
            max_upload_bytes,
        }
    }
}
