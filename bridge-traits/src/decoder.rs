//! Vector Decoder Abstractions
//!
//! The decoder turns raw animation bytes (JSON vector paths, already
//! decompressed) into a playable handle that can report metadata and
//! rasterize individual frames. The parsing and rasterization algorithms are
//! entirely the host's concern; the core treats both as black boxes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Output dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// An empty size has no displayable area and fails metadata validation.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Desired rendering parameters for produced frames.
///
/// Compared by value; a changed request makes the render pool re-render
/// frames that have not been produced yet. `size: None` requests the
/// animation's natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameRequest {
    /// Target output size; `None` keeps the natural size.
    pub size: Option<PixelSize>,
}

impl FrameRequest {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            size: Some(PixelSize::new(width, height)),
        }
    }

    /// Resolve the effective output size against the animation's natural size.
    pub fn resolve(&self, natural: PixelSize) -> PixelSize {
        self.size.unwrap_or(natural)
    }
}

/// One rasterized frame, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Frame index within the animation (0-based).
    pub index: usize,
    /// RGBA pixel data, `size.width * size.height * 4` bytes.
    pub pixels: Bytes,
    /// Actual dimensions of `pixels`.
    pub size: PixelSize,
    /// The request this frame was rendered for.
    pub request: FrameRequest,
}

/// A decoded, playable animation handle.
///
/// Metadata accessors are stable for the handle's lifetime. Rasterization
/// takes `&mut self` because decoder backends keep per-handle scratch state.
pub trait VectorAnimation: Send {
    /// Frames per second declared by the source. May be fractional.
    fn frame_rate(&self) -> f64;

    /// Total number of frames in the animation.
    fn frames_count(&self) -> usize;

    /// Natural (authored) size of the animation.
    fn size(&self) -> PixelSize;

    /// Rasterize frame `index` at the requested size, returning RGBA bytes.
    fn render_frame(&mut self, index: usize, request: &FrameRequest) -> Bytes;
}

/// Decoder entry point.
///
/// Failures are not distinguished beyond `None`: unreadable content,
/// unsupported features and internal decoder errors all look the same to the
/// core, which maps them to a parse failure.
pub trait VectorDecoder: Send + Sync {
    fn load_from_data(&self, content: &[u8]) -> Option<Box<dyn VectorAnimation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_emptiness() {
        assert!(PixelSize::new(0, 100).is_empty());
        assert!(PixelSize::new(100, 0).is_empty());
        assert!(!PixelSize::new(1, 1).is_empty());
    }

    #[test]
    fn frame_request_resolution() {
        let natural = PixelSize::new(512, 512);
        assert_eq!(FrameRequest::default().resolve(natural), natural);
        assert_eq!(
            FrameRequest::sized(128, 64).resolve(natural),
            PixelSize::new(128, 64)
        );
    }

    #[test]
    fn frame_request_value_comparison() {
        assert_eq!(FrameRequest::sized(10, 10), FrameRequest::sized(10, 10));
        assert_ne!(FrameRequest::sized(10, 10), FrameRequest::default());
    }
}
