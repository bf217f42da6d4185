//! # Animation Error Types
//!
//! Error taxonomy for animation initialization.
//!
//! Both variants are terminal for the animation instance: the core never
//! retries internally, and the caller constructs a fresh [`Animation`] to
//! retry with different input. Precondition violations (querying frames
//! before the animation is ready, double-starting the shared state) are
//! programming bugs and assert instead of surfacing here.
//!
//! [`Animation`]: crate::Animation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while turning raw bytes into a playable animation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationError {
    /// The bytes did not yield a decoded animation: the content exceeded the
    /// accepted size ceiling, or the decoder rejected it.
    #[error("Animation parse failed")]
    ParseFailed,

    /// The content decoded, but its metadata is semantically invalid: zero
    /// frame rate, no frames, or an empty natural size.
    #[error("Animation not supported")]
    NotSupported,
}

/// Result type for initialization operations.
pub type Result<T> = std::result::Result<T, AnimationError>;
