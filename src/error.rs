//! Top-level error type for the binary.
//!
//! The store and API layers keep their own typed errors; this is what they
//! (and terminal/filesystem failures) turn into once they reach `main`.

use thiserror::Error;

use crate::api::ApiError;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: DynError,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Attach a lazily built context string to an error.
pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| AppError::Context { context: f(), source: Box::new(e) })
    }
}
