//! # Shared Animation State
//!
//! The single owned object per animation, holding the decode/cache handles,
//! the committed frame cursor and the timing bookkeeping. Created once by the
//! initializer, then shared as `Arc<SharedState>` between the external render
//! pool (producer of upcoming frames) and the lifecycle façade (consumer).
//!
//! Locking is split in two so the pool rasterizing a frame never contends
//! with the façade reading the committed one:
//!
//! - the **frame cursor** (committed frame, pending next frame, timestamps)
//!   is held only for cheap pointer swaps;
//! - the **render source** (content bytes, decode handle, cache handle) is
//!   locked exclusively by whoever rasterizes, which is the pool after
//!   registration.
//!
//! The committed frame's pixels are immutable `Bytes`, so a reader holding a
//! frame clone can never observe a torn frame while the pool produces the
//! next one.

use bridge_traits::cache::FrameCache;
use bridge_traits::decoder::{FrameRequest, PixelSize, RenderedFrame, VectorAnimation};
use bridge_traits::time::TimeMs;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Information
// ============================================================================

/// Immutable animation metadata, derived at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Information {
    /// Frames per second. Strictly positive for a supported animation.
    pub frame_rate: f64,
    /// Total frame count.
    pub frames_count: usize,
    /// Natural (authored) size.
    pub size: PixelSize,
}

impl Information {
    /// Whether the metadata satisfies the playability invariants.
    pub fn is_supported(&self) -> bool {
        self.frame_rate > 0.0 && self.frames_count > 0 && !self.size.is_empty()
    }
}

// ============================================================================
// Render Source
// ============================================================================

/// Decode and cache handles used to rasterize frames.
///
/// Locked exclusively by the rasterizing side (the render pool once the
/// state is registered). `animation` is `None` when the cache is fully
/// populated and the vector decode was skipped entirely.
pub struct RenderSource {
    pub content: Bytes,
    pub animation: Option<Box<dyn VectorAnimation>>,
    pub cache: Option<Box<dyn FrameCache>>,
}

impl RenderSource {
    /// Rasterize frame `index`, preferring cached bytes and filling the
    /// cache when rendering fresh.
    pub fn rasterize(&mut self, index: usize, request: &FrameRequest) -> Option<Bytes> {
        if let Some(cache) = self.cache.as_mut() {
            if let Some(pixels) = cache.read_frame(index, request) {
                return Some(pixels);
            }
        }
        let pixels = self
            .animation
            .as_mut()
            .map(|animation| animation.render_frame(index, request))?;
        if let Some(cache) = self.cache.as_mut() {
            cache.append_frame(index, pixels.clone());
        }
        Some(pixels)
    }
}

// ============================================================================
// Frame Cursor
// ============================================================================

struct PendingFrame {
    frame: RenderedFrame,
    due: TimeMs,
}

struct FrameCursor {
    current: RenderedFrame,
    request: FrameRequest,
    started_at: Option<TimeMs>,
    next: Option<PendingFrame>,
    last_displayed: Option<TimeMs>,
    last_shown: Option<TimeMs>,
}

// ============================================================================
// SharedState
// ============================================================================

/// The mutable, cross-thread-visible record of one animation's decode/cache
/// handles and current frame/timing cursor.
pub struct SharedState {
    info: Information,
    cursor: Mutex<FrameCursor>,
    source: Mutex<RenderSource>,
}

impl SharedState {
    /// Build the state from resolved content plus the optional decode and
    /// cache handles. At least one handle must be present.
    ///
    /// When the metadata is playable, frame 0 is rasterized synchronously so
    /// the committed frame is readable immediately after construction (this
    /// is what makes thumbnail reads possible without the render pool).
    pub(crate) fn new(
        content: Bytes,
        animation: Option<Box<dyn VectorAnimation>>,
        cache: Option<Box<dyn FrameCache>>,
        request: FrameRequest,
    ) -> Self {
        assert!(
            animation.is_some() || cache.is_some(),
            "SharedState requires a decode handle or a cache handle"
        );

        let info = match animation.as_ref() {
            Some(animation) => Information {
                frame_rate: animation.frame_rate(),
                frames_count: animation.frames_count(),
                size: animation.size(),
            },
            None => {
                let cache = cache.as_ref().unwrap();
                Information {
                    frame_rate: cache.frame_rate(),
                    frames_count: cache.frames_count(),
                    size: cache.size(),
                }
            }
        };

        let mut source = RenderSource {
            content,
            animation,
            cache,
        };

        let size = request.resolve(info.size);
        let pixels = if info.is_supported() {
            source.rasterize(0, &request).unwrap_or_default()
        } else {
            Bytes::new()
        };
        let current = RenderedFrame {
            index: 0,
            pixels,
            size,
            request,
        };

        Self {
            info,
            cursor: Mutex::new(FrameCursor {
                current,
                request,
                started_at: None,
                next: None,
                last_displayed: None,
                last_shown: None,
            }),
            source: Mutex::new(source),
        }
    }

    /// Immutable metadata; stable for the object's lifetime.
    pub fn information(&self) -> Information {
        self.info
    }

    /// Mark the playback epoch. Called exactly once, before registration
    /// with the render pool.
    pub fn start(&self, now: TimeMs) {
        let mut cursor = self.cursor.lock();
        debug_assert!(cursor.started_at.is_none(), "start() called twice");
        cursor.started_at = Some(now);
        debug!(epoch = now, "animation playback started");
    }

    /// The currently committed frame plus its associated request.
    ///
    /// Safe to call while the pool produces the next frame; the clone is
    /// cheap (`Bytes` is reference-counted).
    pub fn frame_for_paint(&self) -> RenderedFrame {
        self.cursor.lock().current.clone()
    }

    /// Advance the committed frame to the pending one if it has become due
    /// by `now`. Returns the new animation-time position, or `None` when
    /// nothing later is due yet (no-op).
    pub fn mark_frame_displayed(&self, now: TimeMs) -> Option<TimeMs> {
        let mut cursor = self.cursor.lock();
        match cursor.next.take() {
            Some(pending) if pending.due <= now => {
                let position = self.frame_position(pending.frame.index);
                cursor.current = pending.frame;
                cursor.last_displayed = Some(position);
                Some(position)
            }
            other => {
                cursor.next = other;
                None
            }
        }
    }

    /// Record that the committed frame was actually presented to the user.
    /// Returns its animation-time position.
    pub fn mark_frame_shown(&self) -> TimeMs {
        let mut cursor = self.cursor.lock();
        let position = self.frame_position(cursor.current.index);
        cursor.last_shown = Some(position);
        position
    }

    /// Position of the last frame actually presented, if any. Drives the
    /// render pool's look-ahead policy.
    pub fn last_shown_position(&self) -> Option<TimeMs> {
        self.cursor.lock().last_shown
    }

    /// When the next frame should become current, or `None` while the pool
    /// has not produced one yet.
    pub fn next_frame_display_time(&self) -> Option<TimeMs> {
        self.cursor.lock().next.as_ref().map(|pending| pending.due)
    }

    /// Index of the committed frame.
    pub fn current_frame_index(&self) -> usize {
        self.cursor.lock().current.index
    }

    /// The request future frames should be rendered at.
    pub fn current_request(&self) -> FrameRequest {
        self.cursor.lock().request
    }

    /// Change the desired request for frames not yet produced. The committed
    /// frame is left as rendered.
    pub fn update_frame_request(&self, request: FrameRequest) {
        let mut cursor = self.cursor.lock();
        cursor.request = request;
        cursor.current.request = request;
    }

    /// Producer entry point: hand over the next rasterized frame. Its due
    /// time is derived from the playback epoch and the frame-rate schedule.
    /// A still-pending older frame is replaced.
    pub fn enqueue_next_frame(&self, frame: RenderedFrame) {
        let mut cursor = self.cursor.lock();
        let epoch = cursor
            .started_at
            .expect("frames enqueued before start()");
        let due = epoch + self.frame_position(frame.index);
        cursor.next = Some(PendingFrame { frame, due });
    }

    /// Run `f` with exclusive access to the decode/cache handles.
    pub fn with_render_source<R>(&self, f: impl FnOnce(&mut RenderSource) -> R) -> R {
        f(&mut self.source.lock())
    }

    /// Animation-time position of frame `index` in milliseconds.
    pub fn frame_position(&self, index: usize) -> TimeMs {
        debug_assert!(self.info.frame_rate > 0.0);
        (index as f64 * 1000.0 / self.info.frame_rate).round() as TimeMs
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAnimation {
        frame_rate: f64,
        frames_count: usize,
        size: PixelSize,
    }

    impl VectorAnimation for StubAnimation {
        fn frame_rate(&self) -> f64 {
            self.frame_rate
        }
        fn frames_count(&self) -> usize {
            self.frames_count
        }
        fn size(&self) -> PixelSize {
            self.size
        }
        fn render_frame(&mut self, index: usize, _request: &FrameRequest) -> Bytes {
            Bytes::from(vec![index as u8; 4])
        }
    }

    fn ten_fps_state() -> SharedState {
        SharedState::new(
            Bytes::from_static(b"{}"),
            Some(Box::new(StubAnimation {
                frame_rate: 10.0,
                frames_count: 40,
                size: PixelSize::new(100, 100),
            })),
            None,
            FrameRequest::default(),
        )
    }

    fn rendered(state: &SharedState, index: usize) -> RenderedFrame {
        let request = state.current_request();
        let pixels = state
            .with_render_source(|source| source.rasterize(index, &request))
            .unwrap();
        RenderedFrame {
            index,
            pixels,
            size: request.resolve(state.information().size),
            request,
        }
    }

    #[test]
    fn first_frame_is_rendered_at_construction() {
        let state = ten_fps_state();
        let frame = state.frame_for_paint();
        assert_eq!(frame.index, 0);
        assert!(!frame.pixels.is_empty());
    }

    #[test]
    fn frame_positions_follow_the_rate() {
        let state = ten_fps_state();
        assert_eq!(state.frame_position(0), 0);
        assert_eq!(state.frame_position(1), 100);
        assert_eq!(state.frame_position(13), 1300);
    }

    #[test]
    fn mark_frame_displayed_before_due_is_a_noop() {
        let state = ten_fps_state();
        state.start(1_000);
        state.enqueue_next_frame(rendered(&state, 1));

        // Frame 1 is due at epoch + 100.
        assert_eq!(state.mark_frame_displayed(1_050), None);
        assert_eq!(state.current_frame_index(), 0);
        assert_eq!(state.next_frame_display_time(), Some(1_100));
    }

    #[test]
    fn mark_frame_displayed_commits_the_due_frame() {
        let state = ten_fps_state();
        state.start(1_000);
        state.enqueue_next_frame(rendered(&state, 1));

        assert_eq!(state.mark_frame_displayed(1_100), Some(100));
        assert_eq!(state.current_frame_index(), 1);
        assert_eq!(state.next_frame_display_time(), None);
    }

    #[test]
    fn shown_position_tracks_the_committed_frame() {
        let state = ten_fps_state();
        state.start(0);
        assert_eq!(state.mark_frame_shown(), 0);
        state.enqueue_next_frame(rendered(&state, 1));
        state.mark_frame_displayed(100);
        assert_eq!(state.mark_frame_shown(), 100);
        assert_eq!(state.last_shown_position(), Some(100));
    }

    #[test]
    fn request_change_keeps_committed_pixels() {
        let state = ten_fps_state();
        let before = state.frame_for_paint();
        state.update_frame_request(FrameRequest::sized(32, 32));
        let after = state.frame_for_paint();
        assert_eq!(after.pixels, before.pixels);
        assert_eq!(after.request, FrameRequest::sized(32, 32));
        assert_eq!(state.current_request(), FrameRequest::sized(32, 32));
    }
}
