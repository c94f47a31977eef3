//! Shared value types
//!
//! Small `Copy` enums and newtypes used across the backend seam, the state
//! cache, and the resource subsystem: the opaque native handle, primitive
//! topology, buffer usage hint, the closed vertex-attribute enumeration,
//! texture/sampler parameters, and the clear/blit mask bitflags.

use bitflags::bitflags;

/// An opaque native object id.
///
/// Zero is the reserved unbound value, exposed as [`GlHandle::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlHandle(pub u32);

impl GlHandle {
    /// The reserved "nothing bound" handle.
    pub const NONE: GlHandle = GlHandle(0);

    /// True when this is the reserved unbound handle.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True when this refers to a real native object.
    #[must_use]
    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

/// Primitive topology for a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// A list of independent triangles (three vertices each).
    TriangleList,
}

impl Primitive {
    /// Number of vertices (or indices) spanned by `primitive_count`
    /// primitives of this topology.
    #[must_use]
    pub fn vertex_count(self, primitive_count: u32) -> u32 {
        match self {
            Primitive::TriangleList => primitive_count * 3,
        }
    }
}

/// Expected update frequency of a buffer's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Set once (or rarely) and drawn many times.
    Static,
    /// Updated frequently.
    Dynamic,
}

/// The closed set of vertex-attribute slots, each with a fixed component
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// 3-component position.
    Position,
    /// 3-component normal.
    Normal,
    /// 2-component texture coordinate.
    TexCoord,
    /// 4-component color.
    Color,
}

impl Attribute {
    /// Every attribute slot, in declaration order.
    pub const ALL: [Attribute; 4] = [
        Attribute::Position,
        Attribute::Normal,
        Attribute::TexCoord,
        Attribute::Color,
    ];

    /// The number of attribute slots.
    pub const COUNT: usize = Self::ALL.len();

    /// The slot position of this attribute within [`Attribute::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Attribute::Position => 0,
            Attribute::Normal => 1,
            Attribute::TexCoord => 2,
            Attribute::Color => 3,
        }
    }

    /// The number of f32 components this attribute occupies.
    #[must_use]
    pub fn components(self) -> u32 {
        match self {
            Attribute::Position | Attribute::Normal => 3,
            Attribute::TexCoord => 2,
            Attribute::Color => 4,
        }
    }
}

/// Pixel storage format of a texture or render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit-per-channel RGBA color.
    Rgba8,
    /// 24-bit depth.
    Depth24,
}

impl TextureFormat {
    /// True for depth (non-color) formats.
    #[must_use]
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth24)
    }
}

/// Texture minification/magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest-neighbor sampling.
    Nearest,
    /// Linear sampling.
    Linear,
}

/// Texture coordinate wrapping behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Clamp coordinates to the edge texel.
    ClampToEdge,
    /// Tile the texture.
    Repeat,
}

bitflags! {
    /// Which buffers a clear or blit touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        /// The color buffer.
        const COLOR = 0b0000_0001;
        /// The depth buffer.
        const DEPTH = 0b0000_0010;
    }
}
