//! Subcommand implementations.

pub mod health;
pub mod migrate;
pub mod seed;

use freshwater_backend::BackendError;
use thiserror::Error;

/// Errors a CLI command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or migration failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The session store rejected its schema or table name.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// Seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for a catalog.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Seed data failed validation before anything was sent.
    #[error("{0} seed validation error(s)")]
    Validation(usize),

    /// The seeding account is not an administrator.
    #[error("{0} is not an admin account")]
    NotAdmin(String),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
