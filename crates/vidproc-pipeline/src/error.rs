//! Error types for pipeline operations
//!
//! Renderer construction failures are recovered locally by the fallback
//! chain and never escape the coordinator. Only invariant violations
//! terminate the pipeline.

use std::fmt;

use thiserror::Error;
use vidproc_format::ConversionError;

use crate::colorimetry::ColorimetryError;

/// Errors that can stop the pipeline
///
/// # Examples
///
/// ```rust,ignore
/// match runner.run().await {
///     Ok(()) => println!("pipeline drained and terminated"),
///     Err(PipelineError::InvariantViolation(msg)) => eprintln!("fatal: {msg}"),
///     Err(e) => eprintln!("pipeline error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Coordinator state became inconsistent
    ///
    /// The coordinator reports this to the observer and refuses to process
    /// further events.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every event sender was dropped before termination completed
    #[error("Event queue closed before termination")]
    QueueClosed,

    /// Frame conversion failed
    #[error("Frame conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Video state cannot be expressed in renderer colorimetry
    #[error("Colorimetry translation failed: {0}")]
    Colorimetry(#[from] ColorimetryError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create an invariant violation error
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create an invalid config error
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the pipeline cannot continue after this error
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_) | Self::QueueClosed)
    }
}

/// Category of renderer failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererErrorKind {
    /// Backend not available on this system
    Unsupported,
    /// Backend refused the negotiated media type
    MediaType,
    /// Pipeline graph could not be connected
    Connect,
    /// Surface, device or memory allocation failed
    Resource,
    /// Colorimetry could not be expressed for this backend
    Colorimetry,
    /// Failure while running (start, stop, reset, metadata push)
    Runtime,
}

impl fmt::Display for RendererErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unsupported => "unsupported",
            Self::MediaType => "media type rejected",
            Self::Connect => "connect failed",
            Self::Resource => "resource unavailable",
            Self::Colorimetry => "colorimetry",
            Self::Runtime => "runtime",
        };
        f.write_str(s)
    }
}

/// Failure reported by a renderer backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Renderer error ({kind}): {message}")]
pub struct RendererError {
    /// Failure category
    pub kind: RendererErrorKind,

    /// Backend-provided detail
    pub message: String,
}

impl RendererError {
    /// Create a renderer error
    pub fn new(kind: RendererErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(RendererErrorKind::Runtime, message)
    }
}

impl From<PipelineError> for RendererError {
    fn from(err: PipelineError) -> Self {
        let kind = match err {
            PipelineError::Colorimetry(_) => RendererErrorKind::Colorimetry,
            PipelineError::Conversion(_) => RendererErrorKind::MediaType,
            _ => RendererErrorKind::Runtime,
        };
        Self::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::invariant("lost unknown device 7");
        assert_eq!(err.to_string(), "Invariant violation: lost unknown device 7");

        let err = RendererError::new(RendererErrorKind::MediaType, "P210 not accepted");
        assert_eq!(
            err.to_string(),
            "Renderer error (media type rejected): P210 not accepted"
        );
    }

    #[test]
    fn test_error_helpers() {
        assert!(PipelineError::invariant("x").is_fatal());
        assert!(PipelineError::QueueClosed.is_fatal());
        assert!(!PipelineError::invalid_config("x").is_fatal());

        let err: PipelineError = ConversionError::NotConfigured.into();
        assert!(matches!(err, PipelineError::Conversion(_)));

        let renderer_err = RendererError::from(err);
        assert_eq!(renderer_err.kind, RendererErrorKind::MediaType);
    }
}
