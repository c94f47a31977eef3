#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

//! # prism
//!
//! A lean device-level rendering backend: it turns high-level draw requests
//! (vertex/index buffers, shader, textures, render targets) into a minimal,
//! correct sequence of native GPU state-binding and draw-submission calls.
//!
//! The interesting work happens between "I want to draw this" and "the GPU
//! now has the right bindings":
//! - a [`device::context::GlContext`] state cache suppresses every
//!   redundant native bind;
//! - render-target slots are reconciled against the cached framebuffer
//!   composition, issuing only the attachment calls a configuration change
//!   actually needs;
//! - multisampled targets are resolved on demand, and a target sampled
//!   while still attached for writing is served from its backup image so a
//!   draw never reads and writes the same texture.
//!
//! Native calls flow through the [`backend::GlBackend`] seam; see
//! [`backend::NullBackend`] and [`backend::RecordingBackend`] for the
//! bundled implementations.

pub mod backend;
pub mod device;
pub mod errors;
pub mod resources;
pub mod types;

pub use backend::{GlBackend, GlCall, NullBackend, RecordingBackend};
pub use device::{DrawPhase, GraphicsDevice, MAX_RENDER_TARGETS, MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBS};
pub use errors::{PrismError, Result};
pub use resources::{
    IndexBuffer, IndexBufferHandle, RenderTexture2D, RenderTextureHandle, Shader, ShaderHandle,
    Texture2D, TextureHandle, TextureKind, TextureSource, VertexBuffer, VertexBufferHandle,
    VertexFormat,
};
pub use types::{
    Attribute, BufferUsage, ClearMask, FilterMode, GlHandle, Primitive, TextureFormat, WrapMode,
};
