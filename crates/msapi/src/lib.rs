//! Access layer for msapi services.
//!
//! Bundles the two independent components behind one configuration:
//!
//! - [`db`]: lazily connected, implicitly transactional database access.
//! - [`auth`]: HMAC-signed bearer tokens over caller-defined claims.
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = msapi::load_config(Some("msapi.toml"))?;
//! msapi::init_tracing(&config.logging);
//!
//! let mut db = msapi::executor(&config.database);
//! db.exec("INSERT INTO audit (action) VALUES ('login')")?;
//! db.save_change()?;
//!
//! let tokens = msapi::token_service(&config.auth);
//! let token = tokens.issue(&claims)?;
//! ```

mod config;
mod logging;

pub use config::{load_config, AuthConfig, Config, ConfigError, DatabaseConfig, LoggingConfig};
pub use logging::init_tracing;

pub use msapi_auth as auth;
pub use msapi_db as db;

/// Builds a lazy executor from the database settings. Never connects.
pub fn executor(config: &DatabaseConfig) -> db::Executor {
    db::Executor::with_driver(
        db::SqliteDriver::new(config.sqlite_settings()),
        config.descriptor(),
        config.pool_limits(),
    )
}

/// Builds a token service from the auth settings.
pub fn token_service(config: &AuthConfig) -> auth::TokenService {
    auth::TokenService::new(&config.secret)
}
