//! # Animation Update Stream
//!
//! Per-animation event stream built on `tokio::sync::broadcast`.
//!
//! Each [`Animation`](crate::Animation) exposes a lazy, push-based,
//! multi-subscriber sequence of lifecycle updates. The stream is not
//! restartable: one façade instance, one stream. After a [`Failed`] event no
//! further events are produced.
//!
//! Ordering guarantee: the one-time [`Update::Information`] always precedes
//! every [`Update::DisplayFrameRequest`] for the same animation.
//!
//! Subscribers that fall behind receive `RecvError::Lagged` and can keep
//! consuming newer events; past events are never replayed.
//!
//! [`Failed`]: AnimationEvent::Failed

use crate::error::AnimationError;
use crate::state::Information;
use bridge_traits::time::TimeMs;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for an animation's update channel.
///
/// Display updates arrive at frame rate; a slow subscriber lags rather than
/// blocking the scheduler.
pub const DEFAULT_UPDATE_BUFFER_SIZE: usize = 64;

// ============================================================================
// Update Types
// ============================================================================

/// A lifecycle update from a ready animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "update")]
pub enum Update {
    /// Decoded metadata. Emitted exactly once, at successful initialization.
    Information(Information),
    /// A new frame became current and should be painted.
    DisplayFrameRequest {
        /// Animation-time position of the now-current frame, in milliseconds.
        position: TimeMs,
    },
}

/// Wire type of the update stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AnimationEvent {
    /// A regular lifecycle update.
    Update(Update),
    /// Initialization failed; terminal, nothing follows.
    Failed(AnimationError),
}

// ============================================================================
// Updates Channel
// ============================================================================

/// Broadcast channel carrying [`AnimationEvent`]s to subscribers.
pub struct Updates {
    sender: broadcast::Sender<AnimationEvent>,
}

impl Updates {
    /// Create a channel buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers reached, or an error when nobody is
    /// listening (callers may discard it; an unobserved animation still
    /// advances).
    pub fn emit(&self, event: AnimationEvent) -> Result<usize, SendError<AnimationEvent>> {
        self.sender.send(event)
    }

    /// Create a new independent subscriber receiving all future events.
    pub fn subscribe(&self) -> Receiver<AnimationEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Updates {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_BUFFER_SIZE)
    }
}

impl fmt::Debug for Updates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updates")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
