//! Error types for e-mail generation.
//!
//! Every failure is fatal to the operation that raised it. Construction
//! errors mean no generator exists; render errors affect only that call.

use std::io;
use std::path::PathBuf;

/// Boxed error returned by pluggable template engines and style inliners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T, E = MailgenError> = std::result::Result<T, E>;

/// Errors raised while building a generator or rendering an e-mail.
#[derive(Debug, thiserror::Error)]
pub enum MailgenError {
    /// No structured `product` was configured.
    #[error("Please provide the `product` object.")]
    MissingProduct,

    /// The `product` has no (or an empty) `name` or `link`.
    #[error("Please provide the product name and link.")]
    MissingProductFields,

    /// The resolved HTML template does not exist.
    #[error("You have specified an invalid theme: {} does not exist.", path.display())]
    InvalidTheme { path: PathBuf },

    /// The resolved plaintext template does not exist.
    #[error("You have specified an invalid plaintext theme: {} does not exist.", path.display())]
    InvalidPlaintextTheme { path: PathBuf },

    /// A theme file exists but could not be read as UTF-8 text.
    #[error("Failed to read theme file {}: {source}", path.display())]
    ThemeRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configuration file could not be loaded or parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A render was requested without a structured parameter object.
    #[error("Please provide parameters for generating transactional e-mails.")]
    MissingParams,

    /// The render parameters have no structured `body`.
    #[error("Please provide the `body` parameter as an object.")]
    MissingBody,

    /// The template engine failed. The engine's error is passed through.
    #[error(transparent)]
    Template(BoxError),

    /// The style inliner failed. The inliner's error is passed through.
    #[error(transparent)]
    Inline(BoxError),
}

impl MailgenError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_yaml::Error> for MailgenError {
    fn from(err: serde_yaml::Error) -> Self {
        MailgenError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MailgenError {
    fn from(err: serde_json::Error) -> Self {
        MailgenError::Config(err.to_string())
    }
}
