//! Frame Cache Abstractions
//!
//! A cache store persists already rendered frame bytes so that a subsequent
//! load of the same animation can skip the (typically more expensive) vector
//! decode entirely. The on-disk serialization format and retrieval policy are
//! owned by the host; the core only asks how full the cache is and reads or
//! appends individual frames.

use crate::decoder::{FrameRequest, PixelSize};
use bytes::Bytes;

/// Callback the store invokes to persist newly serialized cache data.
///
/// Called from an unspecified thread whenever the store decides to flush; the
/// core supplies it at construction and never calls it directly.
pub type CachePut = Box<dyn FnMut(Bytes) + Send>;

/// Factory opening a per-animation cache over previously persisted bytes.
pub trait FrameCacheStore: Send + Sync {
    /// Open a cache handle.
    ///
    /// `cached` may be empty, meaning "no prior cache"; the resulting handle
    /// then reports a frames count of zero.
    fn open(&self, cached: Bytes, request: &FrameRequest, put: CachePut) -> Box<dyn FrameCache>;
}

/// Per-animation cache handle.
pub trait FrameCache: Send {
    /// Total frame count recorded by the cache, or 0 when no prior cache
    /// exists.
    fn frames_count(&self) -> usize;

    /// Number of frames whose rendered bytes are already stored.
    ///
    /// Always `<= frames_count()`. When equal (and non-zero) the cache can
    /// serve the whole animation without a live decoder.
    fn frames_ready(&self) -> usize;

    /// Frame rate recorded by the cache. Meaningful only when
    /// `frames_count() > 0`.
    fn frame_rate(&self) -> f64;

    /// Frame dimensions recorded by the cache. Meaningful only when
    /// `frames_count() > 0`.
    fn size(&self) -> PixelSize;

    /// Read the rendered bytes of frame `index`, if present at a compatible
    /// request.
    fn read_frame(&mut self, index: usize, request: &FrameRequest) -> Option<Bytes>;

    /// Store the rendered bytes of frame `index`. The store decides when to
    /// invoke the put callback with reserialized data.
    fn append_frame(&mut self, index: usize, pixels: Bytes);
}
