use thiserror::Error;
use viewer_highlight::RegistryError;

#[derive(Debug, Error)]
/// Errors produced while constructing a viewer.
///
/// Once a [`CodeViewer`](crate::CodeViewer) exists, its operations are total.
pub enum ViewerError {
    #[error("pattern registry error: {0}")]
    /// The built-in pattern tables failed to compile.
    Registry(#[from] RegistryError),

    #[error("invalid config field '{field}': {message}")]
    /// A configuration value is out of range.
    InvalidConfig {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },
}
