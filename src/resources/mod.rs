//! Resource registry
//!
//! Resources live in slotmap arenas owned by the device; callers hold
//! copyable typed handles. A destroyed resource leaves a stale key whose
//! lookups return `None`, so the draw pipeline can always degrade instead of
//! dangling.

pub mod buffer;
pub mod render_texture;
pub mod shader;
pub mod texture;

pub use buffer::{IndexBuffer, VertexBuffer, VertexFormat};
pub use render_texture::RenderTexture2D;
pub use shader::Shader;
pub use texture::{Texture2D, TextureKind};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct VertexBufferHandle;
    pub struct IndexBufferHandle;
    pub struct TextureHandle;
    pub struct RenderTextureHandle;
    pub struct ShaderHandle;
}

/// A texture-unit occupant: the closed tagged variant over texture kinds.
///
/// Adding a kind extends this enum and every match over it, so new kinds are
/// compile-time-checked rather than dispatched by run-time type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    Texture2D(TextureHandle),
    RenderTexture(RenderTextureHandle),
    /// Reserved and unimplemented; binds nothing.
    Cube,
}

impl TextureSource {
    #[must_use]
    pub fn kind(self) -> TextureKind {
        match self {
            Self::Texture2D(_) => TextureKind::Texture2D,
            Self::RenderTexture(_) => TextureKind::RenderTexture2D,
            Self::Cube => TextureKind::Cube,
        }
    }

    /// Whether the device can sample this kind.
    #[must_use]
    pub fn is_samplable(self) -> bool {
        !matches!(self, Self::Cube)
    }
}

/// The arenas behind every typed handle.
#[derive(Debug, Default)]
pub(crate) struct Resources {
    pub vertex_buffers: SlotMap<VertexBufferHandle, VertexBuffer>,
    pub index_buffers: SlotMap<IndexBufferHandle, IndexBuffer>,
    pub textures: SlotMap<TextureHandle, Texture2D>,
    pub render_textures: SlotMap<RenderTextureHandle, RenderTexture2D>,
    pub shaders: SlotMap<ShaderHandle, Shader>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }
}
