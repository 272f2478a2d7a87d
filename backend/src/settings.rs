//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through a `NEWSROOM_`-prefixed environment variable
//! (for example `NEWSROOM_DATABASE_URL`) or the matching command-line flag.
//! Unset values fall back to the defaults exposed by the accessors.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::ports::{AccountCommand, AdminBootstrap, AdminBootstrapOutcome};
use crate::domain::{
    DEFAULT_MAX_UPLOAD_BYTES, DisplayName, DisplayTimezone, Email, Error, Password,
};
use crate::inbound::http::session_config::BuildMode;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_DISPLAY_NAME: &str = "Administrator";
/// Development-only bootstrap password.
const DEBUG_ADMIN_PASSWORD: &str = "admin123";

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required value is unset.
    #[error("missing required setting {name}")]
    Missing { name: &'static str },
    /// A value could not be interpreted.
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors raised while bootstrapping the first administrator at startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Admin settings are missing or invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The account service could not complete the bootstrap.
    #[error("admin bootstrap failed: {0}")]
    Accounts(#[from] Error),
}

fn invalid(name: &'static str, reason: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

/// Runtime configuration for the newsroom server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NEWSROOM")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding uploaded banner images.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted banner image in bytes.
    pub max_upload_bytes: Option<usize>,
    /// IANA timezone used to localise response timestamps.
    pub timezone: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Email of the account promoted or created as the first admin.
    pub admin_email: Option<String>,
    /// Display name used when the bootstrap admin has to be created.
    pub admin_display_name: Option<String>,
    /// Password used when the bootstrap admin has to be created.
    pub admin_password: Option<String>,
}

impl AppSettings {
    /// The database URL; required.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::Missing {
                name: "NEWSROOM_DATABASE_URL",
            })
    }

    /// Listen address, `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| invalid("NEWSROOM_BIND_ADDR", err))
    }

    /// Upload directory, `uploads` by default.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Upload limit, 2 MiB by default.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Display timezone, UTC by default.
    pub fn timezone(&self) -> Result<DisplayTimezone, SettingsError> {
        self.timezone
            .as_deref()
            .map_or(Ok(DisplayTimezone::default()), |raw| raw.parse::<DisplayTimezone>())
            .map_err(|err| invalid("NEWSROOM_TIMEZONE", err))
    }

    /// Pool size, 10 by default.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Credentials for the first admin account.
    ///
    /// Without a configured password, debug builds fall back to a fixed
    /// development password and release builds return `None`.
    pub fn admin_bootstrap(&self, mode: BuildMode) -> Result<Option<AdminBootstrap>, SettingsError> {
        let password = match (self.admin_password.as_deref(), mode) {
            (Some(password), _) => password,
            (None, BuildMode::Debug) => {
                warn!("NEWSROOM_ADMIN_PASSWORD not set; using the development password");
                DEBUG_ADMIN_PASSWORD
            }
            (None, BuildMode::Release) => return Ok(None),
        };
        let email = Email::new(self.admin_email.as_deref().unwrap_or(DEFAULT_ADMIN_EMAIL))
            .map_err(|err| invalid("NEWSROOM_ADMIN_EMAIL", err))?;
        let display_name = DisplayName::new(
            self.admin_display_name
                .as_deref()
                .unwrap_or(DEFAULT_ADMIN_DISPLAY_NAME),
        )
        .map_err(|err| invalid("NEWSROOM_ADMIN_DISPLAY_NAME", err))?;
        let password =
            Password::new(password).map_err(|err| invalid("NEWSROOM_ADMIN_PASSWORD", err))?;
        Ok(Some(AdminBootstrap {
            email,
            display_name,
            password,
        }))
    }

    /// Make sure the server starts with an administrator.
    ///
    /// Release builds without `NEWSROOM_ADMIN_PASSWORD` start only when an
    /// administrator already exists; otherwise the password is reported as
    /// missing. Returns `None` when no bootstrap ran.
    pub async fn bootstrap_admin<A>(
        &self,
        accounts: &A,
        mode: BuildMode,
    ) -> Result<Option<AdminBootstrapOutcome>, BootstrapError>
    where
        A: AccountCommand + ?Sized,
    {
        if let Some(bootstrap) = self.admin_bootstrap(mode)? {
            return Ok(Some(accounts.ensure_admin(bootstrap).await?));
        }
        if accounts.admin_exists().await? {
            info!("NEWSROOM_ADMIN_PASSWORD not set; keeping existing admin accounts");
            return Ok(None);
        }
        Err(SettingsError::Missing {
            name: "NEWSROOM_ADMIN_PASSWORD",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    //! Settings loading and default coverage.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::ports::MockAccountCommand;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "NEWSROOM_DATABASE_URL",
        "NEWSROOM_BIND_ADDR",
        "NEWSROOM_UPLOAD_DIR",
        "NEWSROOM_MAX_UPLOAD_BYTES",
        "NEWSROOM_TIMEZONE",
        "NEWSROOM_DB_POOL_SIZE",
        "NEWSROOM_ADMIN_EMAIL",
        "NEWSROOM_ADMIN_DISPLAY_NAME",
        "NEWSROOM_ADMIN_PASSWORD",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("newsroom")]).expect("settings load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::Missing { .. })
        ));
        assert_eq!(
            settings.bind_addr().expect("default address").to_string(),
            DEFAULT_BIND_ADDR
        );
        assert_eq!(settings.upload_dir(), PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(settings.max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.timezone().expect("utc"), DisplayTimezone::default());
        assert_eq!(settings.db_pool_size(), DEFAULT_POOL_SIZE);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("NEWSROOM_DATABASE_URL", "postgres://news@localhost/news"),
            ("NEWSROOM_BIND_ADDR", "127.0.0.1:9000"),
            ("NEWSROOM_UPLOAD_DIR", "/srv/uploads"),
            ("NEWSROOM_MAX_UPLOAD_BYTES", "1024"),
            ("NEWSROOM_TIMEZONE", "Europe/Paris"),
            ("NEWSROOM_DB_POOL_SIZE", "4"),
        ]);
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://news@localhost/news"
        );
        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert_eq!(settings.upload_dir(), PathBuf::from("/srv/uploads"));
        assert_eq!(settings.max_upload_bytes(), 1024);
        assert_eq!(settings.timezone().expect("zone").name(), "Europe/Paris");
        assert_eq!(settings.db_pool_size(), 4);
    }

    #[rstest]
    #[case("NEWSROOM_BIND_ADDR", "not an address")]
    #[case("NEWSROOM_TIMEZONE", "Mars/Olympus")]
    fn invalid_values_name_the_setting(#[case] name: &'static str, #[case] value: &str) {
        let settings = load_with(&[(name, value)]);
        let err = match name {
            "NEWSROOM_BIND_ADDR" => settings.bind_addr().map(|_| ()),
            _ => settings.timezone().map(|_| ()),
        }
        .expect_err("invalid value");
        assert!(matches!(err, SettingsError::Invalid { name: rejected, .. } if rejected == name));
    }

    #[rstest]
    fn debug_bootstrap_uses_development_password() {
        let bootstrap = AppSettings::default()
            .admin_bootstrap(BuildMode::Debug)
            .expect("valid")
            .expect("bootstrap");
        assert_eq!(bootstrap.email.to_string(), DEFAULT_ADMIN_EMAIL);
        assert_eq!(bootstrap.password.expose(), DEBUG_ADMIN_PASSWORD);
    }

    #[rstest]
    fn release_bootstrap_without_password_yields_nothing() {
        let settings = AppSettings::default();
        assert!(settings
            .admin_bootstrap(BuildMode::Release)
            .expect("valid")
            .is_none());

        let configured = AppSettings {
            admin_email: Some("Chief@Example.com".to_owned()),
            admin_password: Some("a long admin secret".to_owned()),
            ..AppSettings::default()
        };
        let bootstrap = configured
            .admin_bootstrap(BuildMode::Release)
            .expect("valid")
            .expect("bootstrap");
        assert_eq!(bootstrap.email.to_string(), "chief@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn release_startup_without_password_keeps_existing_admin() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_admin_exists()
            .times(1)
            .return_once(|| Ok(true));
        accounts.expect_ensure_admin().times(0);

        let outcome = AppSettings::default()
            .bootstrap_admin(&accounts, BuildMode::Release)
            .await
            .expect("existing admin");

        assert!(outcome.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn release_startup_without_password_or_admin_fails() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_admin_exists()
            .times(1)
            .return_once(|| Ok(false));
        accounts.expect_ensure_admin().times(0);

        let err = AppSettings::default()
            .bootstrap_admin(&accounts, BuildMode::Release)
            .await
            .expect_err("no admin");

        assert!(matches!(
            err,
            BootstrapError::Settings(SettingsError::Missing {
                name: "NEWSROOM_ADMIN_PASSWORD"
            })
        ));
    }

    #[rstest]
    #[case(BuildMode::Debug, None)]
    #[case(BuildMode::Release, Some("a long admin secret"))]
    #[tokio::test]
    async fn startup_with_credentials_ensures_admin(
        #[case] mode: BuildMode,
        #[case] password: Option<&str>,
    ) {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_admin_exists().times(0);
        accounts
            .expect_ensure_admin()
            .withf(|bootstrap| bootstrap.email.to_string() == DEFAULT_ADMIN_EMAIL)
            .times(1)
            .return_once(|_| Ok(AdminBootstrapOutcome::AlreadyPresent));
        let settings = AppSettings {
            admin_password: password.map(str::to_owned),
            ..AppSettings::default()
        };

        let outcome = settings
            .bootstrap_admin(&accounts, mode)
            .await
            .expect("bootstrap");

        assert_eq!(outcome, Some(AdminBootstrapOutcome::AlreadyPresent));
    }

    #[rstest]
    #[tokio::test]
    async fn account_failures_surface_as_bootstrap_errors() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_admin_exists()
            .times(1)
            .return_once(|| Err(Error::internal("database unavailable")));

        let err = AppSettings::default()
            .bootstrap_admin(&accounts, BuildMode::Release)
            .await
            .expect_err("unavailable");

        assert!(matches!(err, BootstrapError::Accounts(_)));
    }

    #[rstest]
    fn short_admin_password_is_rejected() {
        let settings = AppSettings {
            admin_password: Some("short".to_owned()),
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.admin_bootstrap(BuildMode::Release),
            Err(SettingsError::Invalid { name: "NEWSROOM_ADMIN_PASSWORD", .. })
        ));
    }
}
