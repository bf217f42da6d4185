//! # Host Bridge Traits
//!
//! Collaborator contracts that must be supplied by the embedding host.
//!
//! ## Overview
//!
//! This crate defines the seams between the animation playback core and the
//! services it consumes as black boxes:
//!
//! - [`VectorDecoder`](decoder::VectorDecoder) - Parses raw animation bytes
//!   into a playable [`VectorAnimation`](decoder::VectorAnimation) handle
//! - [`FrameCacheStore`](cache::FrameCacheStore) - Opens a per-animation
//!   [`FrameCache`](cache::FrameCache) over previously rendered frame bytes
//! - [`Clock`](time::Clock) - Monotonic time source, injectable for
//!   deterministic testing
//!
//! The core never reaches for an ambient singleton; every collaborator is
//! passed in explicitly so tests can substitute fakes.
//!
//! ## Thread Safety
//!
//! Factory-style traits (`VectorDecoder`, `FrameCacheStore`, `Clock`) require
//! `Send + Sync` so they can be shared across async tasks. Per-animation
//! handles (`VectorAnimation`, `FrameCache`) only require `Send`: each one is
//! driven by a single owner at a time.

pub mod cache;
pub mod decoder;
pub mod time;

pub use cache::{CachePut, FrameCache, FrameCacheStore};
pub use decoder::{FrameRequest, PixelSize, RenderedFrame, VectorAnimation, VectorDecoder};
pub use time::{Clock, SystemClock, TimeMs};
