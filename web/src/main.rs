//! Server binary: configuration, wiring, and graceful shutdown.

use anyhow::Context as _;
use bookings_core::mail::{ConsoleMailer, SmtpMailer, mail_channel, spawn_mail_worker};
use bookings_core::session::MemorySessionStore;
use bookings_postgres::PgReservationRepository;
use bookings_render::{HelperSet, Renderer};
use bookings_web::{AppConfig, AppState, router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pending notifications held while the worker catches up.
const MAIL_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    info!("connecting to database");
    let repo = PgReservationRepository::connect(&config.database_url)
        .await
        .context("database connection failed")?;
    repo.migrate().await.context("database migration failed")?;
    info!("connected to database");

    // Template compilation failures are deployment errors; fail fast here
    // rather than serve broken pages.
    let helpers = HelperSet::standard();
    let renderer = if config.use_template_cache {
        Renderer::cached(&config.template_dir, &helpers)
            .context("template cache construction failed")?
    } else {
        Renderer::reloading(&config.template_dir, &helpers)
    };

    let (mail, mail_rx) = mail_channel(MAIL_QUEUE_CAPACITY);
    let _mail_worker = match &config.smtp {
        Some(smtp) => {
            info!(server = %smtp.server, "starting SMTP mail worker");
            let mailer = SmtpMailer::new(
                &smtp.server,
                smtp.port,
                smtp.username.clone(),
                smtp.password.clone(),
            )
            .context("SMTP transport configuration failed")?;
            spawn_mail_worker(mail_rx, mailer)
        }
        None => {
            info!("starting console mail worker");
            spawn_mail_worker(mail_rx, ConsoleMailer::new())
        }
    };

    let port = config.port;
    let state = AppState::new(
        config,
        Arc::new(repo),
        Arc::new(MemorySessionStore::new()),
        renderer,
        mail,
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("could not bind port {port}"))?;
    info!(port, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
        return;
    }
    info!("shutdown requested");
}
