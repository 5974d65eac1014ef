//! Boundary failure taxonomy.
//!
//! Both classes are absorbed where they occur: the caller substitutes a fixed
//! value and keeps running. They exist so the diagnostic log can name what
//! went dark; nothing downstream ever sees them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AetherError {
    /// Location or weather acquisition failed.
    #[error("environment signal unavailable: {0}")]
    SignalUnavailable(String),

    /// The cognition oracle failed or timed out on evolve/chat.
    #[error("cognition unavailable: {0}")]
    CognitionUnavailable(String),
}
