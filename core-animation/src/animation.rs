//! # Animation Lifecycle Façade
//!
//! Owns one animation's journey from raw bytes to a stream of display-ready
//! frames: `Loading → {Ready, Failed}`, both terminal.
//!
//! Construction dispatches the decompress/decode pass onto the blocking
//! thread pool and returns immediately; the result is marshaled back over a
//! oneshot channel that the UI-affine owner drains from its heartbeat
//! ([`Animation::tick`]). Dropping the façade before the result arrives
//! drops the receiver, so an in-flight result is silently discarded and the
//! background task never touches a dead façade.
//!
//! Once ready, the shared state is handed to the external render pool and
//! every heartbeat runs one step of the frame-timing state machine
//! ([`crate::scheduler`]).

use crate::content::read_content;
use crate::error::{AnimationError, Result};
use crate::events::{AnimationEvent, Update, Updates, DEFAULT_UPDATE_BUFFER_SIZE};
use crate::init;
use crate::scheduler::{step, Action, FrameTimer, Schedule};
use crate::state::SharedState;
use crate::traits::RenderPool;
use bridge_traits::cache::{CachePut, FrameCacheStore};
use bridge_traits::decoder::{FrameRequest, RenderedFrame, VectorDecoder};
use bridge_traits::time::{Clock, TimeMs};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Continuation a cache store invokes with previously persisted bytes.
pub type CacheRead = Box<dyn FnOnce(Bytes) + Send>;

/// Cache-read indirection. Runs on the constructing (UI-affine) thread,
/// since the cache store is not assumed safe for concurrent reads, and may
/// invoke its continuation immediately or later, from any thread.
pub type CacheGet = Box<dyn FnOnce(CacheRead)>;

// ============================================================================
// Runtime
// ============================================================================

/// The injected collaborator set shared by animations of one process.
#[derive(Clone)]
pub struct AnimationRuntime {
    decoder: Arc<dyn VectorDecoder>,
    pool: Arc<dyn RenderPool>,
    clock: Arc<dyn Clock>,
    cache_store: Option<Arc<dyn FrameCacheStore>>,
}

impl AnimationRuntime {
    pub fn new(
        decoder: Arc<dyn VectorDecoder>,
        pool: Arc<dyn RenderPool>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            decoder,
            pool,
            clock,
            cache_store: None,
        }
    }

    /// Enable cached construction ([`Animation::from_cached`]).
    pub fn with_cache_store(mut self, cache_store: Arc<dyn FrameCacheStore>) -> Self {
        self.cache_store = Some(cache_store);
        self
    }
}

// ============================================================================
// Pool Registration Token
// ============================================================================

/// Keeps the shared state registered with the pool; dropping the token
/// deregisters it. The state itself stays alive through the pool's own
/// `Arc`, so deallocation while registered is unrepresentable.
struct PoolRegistration {
    pool: Arc<dyn RenderPool>,
    state: Arc<SharedState>,
}

impl PoolRegistration {
    fn new(pool: Arc<dyn RenderPool>, state: Arc<SharedState>) -> Self {
        pool.append(state.clone());
        Self { pool, state }
    }
}

impl Drop for PoolRegistration {
    fn drop(&mut self) {
        self.pool.remove(&self.state);
    }
}

// ============================================================================
// Animation
// ============================================================================

enum Phase {
    Loading,
    Ready(Ready),
    Failed,
}

struct Ready {
    state: Arc<SharedState>,
    _registration: PoolRegistration,
}

/// Lifecycle façade for one vector animation.
///
/// UI-affine: owned and driven by a single thread. The embedder calls
/// [`tick`](Self::tick) on every UI heartbeat and may additionally wake
/// itself at [`next_wake`](Self::next_wake) when heartbeats pause.
///
/// Constructors must run inside a Tokio runtime (the decode pass uses the
/// blocking thread pool).
pub struct Animation {
    runtime: AnimationRuntime,
    updates: Updates,
    init_rx: Option<oneshot::Receiver<Result<SharedState>>>,
    phase: Phase,
    schedule: Schedule,
    timer: FrameTimer,
}

impl Animation {
    /// Construct from raw bytes or a filesystem path.
    pub fn from_content(
        runtime: AnimationRuntime,
        data: Bytes,
        path: Option<PathBuf>,
        request: FrameRequest,
    ) -> Self {
        let content = read_content(data, path.as_deref());
        let decoder = runtime.decoder.clone();
        let (tx, rx) = oneshot::channel();
        Handle::current().spawn_blocking(move || {
            let result = init::init(decoder.as_ref(), &content, request);
            // Send fails when the façade is already gone; discard silently.
            let _ = tx.send(result);
        });
        Self::loading(runtime, rx)
    }

    /// Construct from raw bytes or a path plus a rendered-frame cache.
    ///
    /// `get` is invoked here, on the constructing thread; its continuation
    /// carries the cached bytes into the background decode. `put` is handed
    /// to the cache store for later persistence of newly rendered frames.
    ///
    /// Panics if the runtime has no cache store.
    pub fn from_cached(
        runtime: AnimationRuntime,
        get: CacheGet,
        put: CachePut,
        data: Bytes,
        path: Option<PathBuf>,
        request: FrameRequest,
    ) -> Self {
        let cache_store = runtime
            .cache_store
            .clone()
            .expect("AnimationRuntime is missing a cache store");
        let content = read_content(data, path.as_deref());
        let decoder = runtime.decoder.clone();
        let handle = Handle::current();
        let (tx, rx) = oneshot::channel();
        get(Box::new(move |cached: Bytes| {
            handle.spawn_blocking(move || {
                let result = init::init_cached(
                    decoder.as_ref(),
                    cache_store.as_ref(),
                    &content,
                    put,
                    cached,
                    request,
                );
                let _ = tx.send(result);
            });
        }));
        Self::loading(runtime, rx)
    }

    fn loading(runtime: AnimationRuntime, rx: oneshot::Receiver<Result<SharedState>>) -> Self {
        Self {
            runtime,
            updates: Updates::new(DEFAULT_UPDATE_BUFFER_SIZE),
            init_rx: Some(rx),
            phase: Phase::Loading,
            schedule: Schedule::Idle,
            timer: FrameTimer::default(),
        }
    }

    /// Subscribe to lifecycle updates. Events are only produced from
    /// [`tick`](Self::tick), so a subscriber attached right after
    /// construction observes the full stream.
    pub fn updates(&self) -> broadcast::Receiver<AnimationEvent> {
        self.updates.subscribe()
    }

    /// `true` once the shared state is registered with the render pool.
    pub fn ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    /// The armed one-shot deadline, if any. Embedders whose heartbeats pause
    /// can schedule their own wakeup for this instant.
    pub fn next_wake(&self) -> Option<TimeMs> {
        self.timer.deadline()
    }

    /// UI heartbeat. Delivers a pending initialization result (exactly
    /// once), then runs one scheduler step when ready.
    pub fn tick(&mut self) {
        self.poll_init();
        if self.ready() {
            self.check_step();
        }
    }

    fn poll_init(&mut self) {
        let Some(rx) = self.init_rx.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.init_rx = None;
                self.init_done(result);
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                warn!("initialization task ended without a result");
                self.init_rx = None;
                self.parse_failed(AnimationError::ParseFailed);
            }
        }
    }

    fn init_done(&mut self, result: Result<SharedState>) {
        match result {
            Ok(state) => self.parse_done(state),
            Err(error) => self.parse_failed(error),
        }
    }

    fn parse_done(&mut self, state: SharedState) {
        let state = Arc::new(state);
        let information = state.information();
        state.start(self.runtime.clock.now());
        let registration = PoolRegistration::new(self.runtime.pool.clone(), state.clone());
        self.phase = Phase::Ready(Ready {
            state,
            _registration: registration,
        });
        debug!(
            frame_rate = information.frame_rate,
            frames_count = information.frames_count,
            "animation ready"
        );
        self.updates
            .emit(AnimationEvent::Update(Update::Information(information)))
            .ok();
    }

    fn parse_failed(&mut self, error: AnimationError) {
        self.phase = Phase::Failed;
        self.updates.emit(AnimationEvent::Failed(error)).ok();
    }

    fn check_step(&mut self) {
        let Phase::Ready(ready) = &self.phase else {
            return;
        };
        let now = self.runtime.clock.now();
        let next_display = ready.state.next_frame_display_time();
        let (schedule, action) = step(self.schedule, self.timer.is_active(), now, next_display);
        self.schedule = schedule;
        match action {
            Action::Wait => {}
            Action::Arm { due } => self.timer.call_once(due),
            Action::Display => {
                self.timer.cancel();
                if let Some(position) = ready.state.mark_frame_displayed(now) {
                    self.updates
                        .emit(AnimationEvent::Update(Update::DisplayFrameRequest { position }))
                        .ok();
                }
            }
        }
    }

    /// On-demand read of the committed frame, independent of the timing
    /// loop. A changed request re-targets frames not yet produced; the
    /// returned frame itself is unchanged.
    ///
    /// Panics when the animation is not ready.
    pub fn frame(&self, request: FrameRequest) -> RenderedFrame {
        let Phase::Ready(ready) = &self.phase else {
            panic!("frame() requires a ready animation");
        };
        let current = ready.state.frame_for_paint();
        if current.request != request {
            ready.state.update_frame_request(request);
            self.runtime
                .pool
                .update_frame_request(&ready.state, &request);
        }
        current
    }

    /// Advance the committed frame if one is due by `now`.
    ///
    /// Panics when the animation is not ready.
    pub fn mark_frame_displayed(&self, now: TimeMs) -> Option<TimeMs> {
        let Phase::Ready(ready) = &self.phase else {
            panic!("mark_frame_displayed() requires a ready animation");
        };
        ready.state.mark_frame_displayed(now)
    }

    /// Record that the committed frame reached the screen and let the pool
    /// advance its look-ahead.
    ///
    /// Panics when the animation is not ready.
    pub fn mark_frame_shown(&self) -> TimeMs {
        let Phase::Ready(ready) = &self.phase else {
            panic!("mark_frame_shown() requires a ready animation");
        };
        let position = ready.state.mark_frame_shown();
        self.runtime.pool.frame_shown(&ready.state);
        position
    }
}
