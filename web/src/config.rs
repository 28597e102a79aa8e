//! Application configuration.
//!
//! One [`AppConfig`] is constructed at startup (from the environment in the
//! binary, or by hand in tests) and passed by reference into every
//! component constructor.

use chrono::Duration;
use std::path::PathBuf;

/// SMTP relay settings. Absent in development; mail then goes to the log.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay address, e.g. "smtp.example.com".
    pub server: String,
    /// Relay port, usually 587.
    pub port: u16,
    /// Authentication username.
    pub username: String,
    /// Authentication password.
    pub password: String,
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// Hardens cookies (Secure flag) and enables the template cache.
    pub in_production: bool,
    /// Compile templates once at startup instead of per render.
    pub use_template_cache: bool,
    /// Directory holding `*.page.html` and `*.layout.html` files.
    pub template_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Sender address for outbound notifications.
    pub mail_from: String,
    /// SMTP relay; `None` logs mail to the console instead.
    pub smtp: Option<SmtpConfig>,
    /// Sliding session lifetime.
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required. `PORT` defaults to "8001". Optional:
    /// `IN_PRODUCTION`, `USE_TEMPLATE_CACHE`, `TEMPLATE_DIR`, `STATIC_DIR`,
    /// `MAIL_FROM`, and the `SMTP_SERVER`/`SMTP_PORT`/`SMTP_USERNAME`/
    /// `SMTP_PASSWORD` group.
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` is missing or a numeric value
    /// does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => 8001,
        };
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let in_production = env_flag("IN_PRODUCTION");
        // Production always caches; development may opt in.
        let use_template_cache = in_production || env_flag("USE_TEMPLATE_CACHE");

        let smtp = match std::env::var("SMTP_SERVER") {
            Ok(server) => Some(SmtpConfig {
                server,
                port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .context("SMTP_PORT is not a valid port number")?,
                username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
                password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            }),
            Err(_) => None,
        };

        Ok(Self {
            port,
            database_url,
            in_production,
            use_template_cache,
            template_dir: std::env::var("TEMPLATE_DIR")
                .map_or_else(|_| PathBuf::from("./templates"), PathBuf::from),
            static_dir: std::env::var("STATIC_DIR")
                .map_or_else(|_| PathBuf::from("./static"), PathBuf::from),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@bookings.local".to_string()),
            smtp,
            session_ttl: Duration::hours(24),
        })
    }

    /// A development configuration rooted at the given template directory.
    /// Used by tests; never reads the environment.
    #[must_use]
    pub fn for_testing(template_dir: PathBuf) -> Self {
        Self {
            port: 0,
            database_url: String::new(),
            in_production: false,
            use_template_cache: true,
            template_dir,
            static_dir: PathBuf::from("./static"),
            mail_from: "no-reply@bookings.local".to_string(),
            smtp: None,
            session_ttl: Duration::hours(24),
        }
    }

    /// Set the listen port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Toggle production hardening.
    #[must_use]
    pub const fn with_production(mut self, in_production: bool) -> Self {
        self.in_production = in_production;
        self
    }

    /// Set the sliding session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| matches!(v.as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AppConfig::for_testing(PathBuf::from("/tmp/templates"))
            .with_port(9000)
            .with_production(true)
            .with_session_ttl(Duration::hours(1));

        assert_eq!(config.port, 9000);
        assert!(config.in_production);
        assert_eq!(config.session_ttl, Duration::hours(1));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::for_testing(PathBuf::from("t"));
        assert!(!config.in_production);
        assert!(config.use_template_cache);
        assert_eq!(config.session_ttl, Duration::hours(24));
    }
}
