//! Error types for the citemark library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
///
/// Rendering itself never fails: malformed math, unmatched citations, and
/// invalid URLs all degrade to plainer output. Errors only arise at the
/// genuinely fallible seams: loading options and talking to the clipboard.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Options error: {0}")]
    Options(#[from] OptionsError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while loading render options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors reported by a clipboard implementation.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard is not available")]
    Unavailable,

    #[error("Clipboard write failed: {0}")]
    Write(String),
}
