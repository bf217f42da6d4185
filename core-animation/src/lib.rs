//! # Vector Animation Playback Core
//!
//! Manages the lifecycle of a decoded vector animation from raw (possibly
//! gzip-compressed, possibly cache-augmented) bytes to a stream of
//! display-ready frames.
//!
//! ## Overview
//!
//! This crate handles:
//! - Content resolution: bounded reads and transparent gzip inflate with a
//!   verbatim-bytes fallback
//! - Two-phase asynchronous initialization that never blocks the UI-affine
//!   thread and reconciles a compressed source payload with an optional
//!   rendered-frame cache
//! - The shared per-animation state driven by the external render pool and
//!   the frame-display scheduler
//! - A heartbeat-driven scheduler converting frame-rate metadata into timer
//!   decisions, with catch-up (skip) semantics
//! - A lazy, multi-subscriber stream of lifecycle updates
//!
//! The vector parsing/rasterization algorithm, the cache serialization
//! format and the render-worker pool itself are external collaborators; see
//! the `bridge-traits` crate and [`traits::RenderPool`].

pub mod animation;
pub mod content;
pub mod error;
pub mod events;
pub mod init;
pub mod scheduler;
pub mod state;
pub mod traits;

pub use animation::{Animation, AnimationRuntime, CacheGet, CacheRead};
pub use content::MAX_FILE_SIZE;
pub use error::{AnimationError, Result};
pub use events::{AnimationEvent, Update, Updates};
pub use init::{init, init_cached, read_thumbnail};
pub use state::{Information, RenderSource, SharedState};
pub use traits::RenderPool;
