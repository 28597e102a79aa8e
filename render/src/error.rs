//! Error types for template compilation and rendering.

use thiserror::Error;

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Failures in the template pipeline.
///
/// All of these are configuration or deployment errors, not user errors:
/// compilation failures should stop the process at startup, and a missing
/// template at render time surfaces as a 500-class response.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested page is not in the cache.
    #[error("Template {0:?} not found in the cache")]
    TemplateNotFound(String),

    /// A page or layout contains unparsable syntax.
    #[error("Template compilation failed: {0}")]
    Compilation(String),

    /// The template directory could not be read.
    #[error("Template directory error: {0}")]
    Io(#[from] std::io::Error),
}
