use thiserror::Error;
use viewer_lang::Category;

#[derive(Debug, Error)]
/// Errors produced while building language profiles.
///
/// These are construction-time defects: a registry that fails to build must not be used.
pub enum RegistryError {
    #[error("invalid {category} pattern for '{language}': {source}")]
    /// A pattern failed to compile.
    InvalidPattern {
        /// Profile name the pattern belongs to.
        language: String,
        /// Category the pattern was bound to.
        category: Category,
        /// The regex compiler error.
        source: regex::Error,
    },

    #[error("{category} pattern for '{language}' has no capture group {group}")]
    /// A rule selected a capture group the pattern does not define.
    MissingCaptureGroup {
        /// Profile name the pattern belongs to.
        language: String,
        /// Category the pattern was bound to.
        category: Category,
        /// The requested group index.
        group: usize,
    },
}
