use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// Credentials of the administrator created at startup when none exists.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: Zeroizing<String>,
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server holding revoked sessions, if any.
    pub redis_url: Option<String>,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// The key used to seal session tokens.
    pub session_secret: Zeroizing<Vec<u8>>,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The directory holding the portal's static pages.
    pub public_dir: String,
    /// The first administrator account, if configured.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut secret_hex = env::var("SESSION_SECRET")
            .context("SESSION_SECRET must be set (generate with: openssl rand -hex 32)")?;

        let secret_bytes = hex::decode(&secret_hex)
            .context("SESSION_SECRET must be valid hexadecimal")?;

        secret_hex.zeroize();

        if secret_bytes.len() != 32 {
            anyhow::bail!("SESSION_SECRET must be exactly 32 bytes (64 hex characters)");
        }

        let is_production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string()) == "production";

        let secure_cookies = match env::var("COOKIE_SECURE") {
            Ok(v) => v.parse().context("Invalid COOKIE_SECURE (expected true or false)")?,
            Err(_) => is_production,
        };

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password: Zeroizing::new(password),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL").ok(),
            session_duration_days: env::var("SESSION_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_DAYS")?,
            session_secret: Zeroizing::new(secret_bytes),
            secure_cookies,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            bootstrap_admin,
        })
    }
}
