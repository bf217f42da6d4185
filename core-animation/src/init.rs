//! # Animation Initializer
//!
//! Turns decompressed content (and optionally a cache handle) into a
//! [`SharedState`] or a typed error. Both entry points are pure apart from
//! the deferred cache-write callback; all failures come back through the
//! returned `Result`, never as synchronous faults.

use crate::content::{unpack_gzip, MAX_FILE_SIZE};
use crate::error::{AnimationError, Result};
use crate::state::SharedState;
use bridge_traits::cache::{CachePut, FrameCacheStore};
use bridge_traits::decoder::{FrameRequest, RenderedFrame, VectorAnimation, VectorDecoder};
use bytes::Bytes;
use tracing::warn;

fn content_error(content: &Bytes) -> Option<AnimationError> {
    if content.len() > MAX_FILE_SIZE {
        warn!(size = content.len(), "animation content too large");
        return Some(AnimationError::ParseFailed);
    }
    None
}

fn create_from_content(
    decoder: &dyn VectorDecoder,
    content: &Bytes,
) -> Option<Box<dyn VectorAnimation>> {
    let unpacked = unpack_gzip(content);
    debug_assert!(unpacked.len() <= MAX_FILE_SIZE);

    let animation = decoder.load_from_data(&unpacked);
    if animation.is_none() {
        warn!("animation parse failed");
    }
    animation
}

fn check_shared_state(state: SharedState) -> Result<SharedState> {
    if !state.information().is_supported() {
        return Err(AnimationError::NotSupported);
    }
    Ok(state)
}

/// Initialize from content alone.
///
/// Rejects oversized content before any decode attempt; a decoder refusal is
/// `ParseFailed`; decoded-but-invalid metadata is `NotSupported`.
pub fn init(
    decoder: &dyn VectorDecoder,
    content: &Bytes,
    request: FrameRequest,
) -> Result<SharedState> {
    if let Some(error) = content_error(content) {
        return Err(error);
    }
    let animation = create_from_content(decoder, content).ok_or(AnimationError::ParseFailed)?;
    check_shared_state(SharedState::new(
        content.clone(),
        Some(animation),
        None,
        request,
    ))
}

/// Initialize from content plus a rendered-frame cache.
///
/// The vector decode is skipped entirely when the cache is already fully
/// populated; otherwise a live decoder is required to fill the gaps, and its
/// failure is `ParseFailed`. `cached` may be empty, meaning "no prior
/// cache". The `put` callback is handed to the cache store for later,
/// asynchronous persistence; this module never invokes it.
pub fn init_cached(
    decoder: &dyn VectorDecoder,
    cache_store: &dyn FrameCacheStore,
    content: &Bytes,
    put: CachePut,
    cached: Bytes,
    request: FrameRequest,
) -> Result<SharedState> {
    if let Some(error) = content_error(content) {
        return Err(error);
    }
    let cache = cache_store.open(cached, &request, put);
    let prepare = cache.frames_count() == 0 || cache.frames_ready() < cache.frames_count();
    let animation = if prepare {
        create_from_content(decoder, content)
    } else {
        None
    };
    if prepare && animation.is_none() {
        return Err(AnimationError::ParseFailed);
    }
    check_shared_state(SharedState::new(
        content.clone(),
        animation,
        Some(cache),
        request,
    ))
}

/// Synchronously decode just the first frame, for thumbnails and previews.
///
/// Any initialization error yields `None`.
pub fn read_thumbnail(
    decoder: &dyn VectorDecoder,
    content: &Bytes,
    request: FrameRequest,
) -> Option<RenderedFrame> {
    init(decoder, content, request)
        .ok()
        .map(|state| state.frame_for_paint())
}
