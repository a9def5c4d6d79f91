//! Error taxonomy for the ADSIL simulation core.
//!
//! One variant per row of the error-handling table: `Configuration` and
//! `State` are always surfaced to the caller, `Numeric` is caught and
//! skipped at the solver's row loop, `Io`/`Parse` surface from the config
//! and frame-player adapters.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdsilError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("state error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, AdsilError>;
