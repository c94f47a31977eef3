//! Framebuffer attachment model
//!
//! [`FboContents`] is the cached snapshot of the offscreen framebuffer's
//! composition: one optional color attachment per point plus a single depth
//! attachment. The orchestrator builds the desired snapshot every prepare
//! and issues attach/detach calls only for the points that differ.
//!
//! Attachment point *i* always corresponds to render-target slot *i*; sparse
//! slots are never compacted, so a gap produces an explicitly detached point
//! below an occupied one.

use smallvec::SmallVec;

use crate::device::MAX_RENDER_TARGETS;
use crate::types::GlHandle;

/// One color attachment: the image that draws land in and whether it is a
/// renderbuffer (multisample store) rather than a texture image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorAttachment {
    pub source: GlHandle,
    pub renderbuffer: bool,
}

/// The single depth attachment, cached as its own pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthAttachment {
    pub source: GlHandle,
    pub renderbuffer: bool,
}

/// Per-point color attachments for one frame.
pub type ColorAttachments = [Option<ColorAttachment>; MAX_RENDER_TARGETS];

/// Cached composition of the offscreen framebuffer object.
///
/// Persists across frames; it describes what the native FBO currently has
/// attached, independent of which framebuffer is bound right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FboContents {
    pub colors: ColorAttachments,
    pub depth: Option<DepthAttachment>,
}

impl FboContents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied color points.
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.colors.iter().filter(|c| c.is_some()).count()
    }

    /// Indices of occupied color points, in slot order: the draw-buffer
    /// enumeration for this composition.
    #[must_use]
    pub fn draw_buffer_points(colors: &ColorAttachments) -> SmallVec<[u32; MAX_RENDER_TARGETS]> {
        colors
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|_| i as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_equality_is_positional() {
        let a = ColorAttachment {
            source: GlHandle(7),
            renderbuffer: false,
        };
        let mut lhs: ColorAttachments = Default::default();
        let mut rhs: ColorAttachments = Default::default();
        lhs[0] = Some(a);
        rhs[1] = Some(a);
        // same attachment at a different point is a different composition
        assert_ne!(lhs, rhs);
        rhs[1] = None;
        rhs[0] = Some(a);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_draw_buffer_points_preserve_gaps() {
        let mut colors: ColorAttachments = Default::default();
        colors[1] = Some(ColorAttachment {
            source: GlHandle(3),
            renderbuffer: false,
        });
        colors[3] = Some(ColorAttachment {
            source: GlHandle(4),
            renderbuffer: true,
        });
        let points = FboContents::draw_buffer_points(&colors);
        assert_eq!(points.as_slice(), &[1, 3]);
    }

    #[test]
    fn test_color_count() {
        let mut contents = FboContents::new();
        assert_eq!(contents.color_count(), 0);
        contents.colors[2] = Some(ColorAttachment {
            source: GlHandle(1),
            renderbuffer: false,
        });
        assert_eq!(contents.color_count(), 1);
    }
}
