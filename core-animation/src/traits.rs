//! # Core Render Pool Trait
//!
//! The render pool is the external worker service that rasterizes upcoming
//! frames ahead of their display time. This core only calls it; it never
//! implements one. The trait lives in the core layer (rather than in
//! `bridge-traits`) because its surface is expressed in terms of
//! [`SharedState`], the core's own type.
//!
//! Pools are process-scoped service objects passed in explicitly, never
//! ambient singletons, so tests can substitute a deterministic fake.

use crate::state::SharedState;
use bridge_traits::decoder::FrameRequest;
use std::sync::Arc;

/// External render-worker pool.
///
/// `append` transfers an owning handle to the pool; the pool keeps the state
/// alive and produces frames into it (via
/// [`SharedState::enqueue_next_frame`]) until `remove` is called. The
/// producing side must go through the state's cursor so the façade's reads
/// never observe a torn frame.
pub trait RenderPool: Send + Sync {
    /// Register a freshly initialized animation for ahead-of-time rendering.
    fn append(&self, state: Arc<SharedState>);

    /// Deregister an animation; the pool drops its owning handle.
    fn remove(&self, state: &Arc<SharedState>);

    /// The desired request changed; frames not yet produced should use it.
    fn update_frame_request(&self, state: &Arc<SharedState>, request: &FrameRequest);

    /// The committed frame was actually presented; the pool may advance its
    /// look-ahead window.
    fn frame_shown(&self, state: &Arc<SharedState>);
}
