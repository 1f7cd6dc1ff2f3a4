//! Shared error type for `iso-core` parsing and configuration helpers.
//!
//! Sub-crates define their own error enums; `CoreError` only covers what the
//! core types themselves can reject.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `iso-core`.
pub type CoreResult<T> = Result<T, CoreError>;
