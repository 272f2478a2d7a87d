//! Newsroom entry-point: loads settings, wires adapters and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Report, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use newsroom::domain::ports::AdminBootstrapOutcome;
use newsroom::inbound::http::health::HealthState;
use newsroom::inbound::http::session_config::{BuildMode, session_settings_from_env};
use newsroom::inbound::http::state::HttpSettings;
use newsroom::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use newsroom::outbound::storage::CapStdImageStore;
use newsroom::settings::AppSettings;

use server::{ProductionServices, ServerConfig, build_services, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let mode = BuildMode::from_debug_assertions();
    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), mode)
        .map_err(|err| Report::new(err).wrap_err("invalid session configuration"))?;

    let database_url = settings.database_url()?;
    run_migrations(database_url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_pool_size()))
        .await
        .wrap_err("failed to create database pool")?;

    let upload_dir = settings.upload_dir();
    let images = CapStdImageStore::open(&upload_dir)
        .with_context(|| format!("failed to open upload directory {}", upload_dir.display()))?;
    let services = build_services(&pool, images);
    bootstrap_admin(&services, &settings, mode).await?;

    let http_state = web::Data::new(services.http_state(HttpSettings {
        timezone: settings.timezone()?,
        max_upload_bytes: settings.max_upload_bytes(),
    }));
    let bind_addr = settings.bind_addr()?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, ServerConfig::new(session, bind_addr))
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "newsroom listening");
    server.await.wrap_err("server terminated with an error")
}

async fn bootstrap_admin(
    services: &ProductionServices,
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<()> {
    let outcome = settings
        .bootstrap_admin(services.accounts.as_ref(), mode)
        .await
        .wrap_err("admin bootstrap did not complete")?;
    match outcome {
        None | Some(AdminBootstrapOutcome::AlreadyPresent) => {}
        Some(AdminBootstrapOutcome::Promoted(user)) => {
            info!(user_id = %user.id(), "promoted bootstrap account to admin");
        }
        Some(AdminBootstrapOutcome::Created(user)) => {
            info!(user_id = %user.id(), "created bootstrap admin account");
        }
    }
    Ok(())
}
