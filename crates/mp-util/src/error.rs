//! Core error types for the mp-util crate.
//!
//! This module defines error types shared across the pipeline crates.

use thiserror::Error;

/// Error type for symbol interning operations.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// Symbol not found in the interner.
    #[error("symbol not found: index {index}")]
    NotFound { index: u32 },
}

/// Result type alias for symbol operations.
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;
