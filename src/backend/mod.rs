//! Native-call seam
//!
//! [`GlBackend`] is the typed command sink the device issues native calls
//! through. It mirrors the GL binding model (bind points, framebuffer
//! attachments, blits) without exposing raw enums or requiring a live
//! context, which keeps the state cache and orchestration logic testable.
//!
//! Two implementations ship with the crate:
//! - [`NullBackend`]: every call is a silent no-op; useful for headless
//!   runs and early bring-up.
//! - [`RecordingBackend`]: appends every call to an inspectable log; the
//!   harness behind every "issues exactly N native calls" test.
//!
//! A context-backed implementation lives with whatever owns the window and
//! GL context; creating either is out of scope here.

pub mod null;
pub mod recording;

pub use null::NullBackend;
pub use recording::{GlCall, RecordingBackend};

use crate::types::{BufferUsage, ClearMask, FilterMode, GlHandle, Primitive, TextureFormat, WrapMode};

/// Framebuffer bind points.
///
/// `Both` is the combined read+draw point; `Read`/`Draw` are the split
/// points used only by the blit paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    Both,
    Read,
    Draw,
}

/// One framebuffer attachment point: color slot `i` or the single depth
/// slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
}

/// The native command sink.
///
/// Callers are expected to have already de-duplicated state: every method
/// here translates to exactly one native call. Uploads apply to whatever
/// object is currently bound at the relevant bind point, matching the GL
/// model. `set_blend_enabled(true)` implies standard premultiplied-alpha
/// blending (`SRC_ALPHA, ONE_MINUS_SRC_ALPHA`).
pub trait GlBackend {
    // --- object lifecycle ---
    fn create_buffer(&mut self) -> GlHandle;
    fn delete_buffer(&mut self, buffer: GlHandle);
    fn create_texture(&mut self) -> GlHandle;
    fn delete_texture(&mut self, texture: GlHandle);
    fn create_renderbuffer(&mut self) -> GlHandle;
    fn delete_renderbuffer(&mut self, renderbuffer: GlHandle);
    fn create_framebuffer(&mut self) -> GlHandle;
    fn delete_framebuffer(&mut self, framebuffer: GlHandle);
    /// Compiles and links a program from the two stage sources. Compilation
    /// diagnostics are the backend's concern; the device only consumes the
    /// resulting handle.
    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> GlHandle;
    fn delete_program(&mut self, program: GlHandle);

    // --- uploads (apply to the currently bound object) ---
    fn array_buffer_data(&mut self, data: &[u8], usage: BufferUsage);
    fn element_buffer_data(&mut self, data: &[u8], usage: BufferUsage);
    fn tex_image_2d(&mut self, format: TextureFormat, width: u32, height: u32, data: Option<&[u8]>);
    fn tex_parameters(
        &mut self,
        min_filter: FilterMode,
        mag_filter: FilterMode,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
        mip_levels: u32,
    );
    fn renderbuffer_storage(&mut self, format: TextureFormat, width: u32, height: u32, samples: u32);

    // --- binds ---
    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: GlHandle);
    fn bind_array_buffer(&mut self, buffer: GlHandle);
    fn bind_element_buffer(&mut self, buffer: GlHandle);
    fn bind_renderbuffer(&mut self, renderbuffer: GlHandle);
    fn use_program(&mut self, program: GlHandle);
    fn active_texture(&mut self, unit: u32);
    fn bind_texture_2d(&mut self, texture: GlHandle);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    fn vertex_attrib_pointer(&mut self, index: u32, components: u32, stride: u32, offset: u64);

    // --- framebuffer composition ---
    fn framebuffer_texture_2d(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        texture: GlHandle,
    );
    fn framebuffer_renderbuffer(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        renderbuffer: GlHandle,
    );
    /// Sets the active color draw-buffer list; entries are color attachment
    /// indices in slot order.
    fn draw_buffers(&mut self, points: &[u32]);
    /// Blits `(0, 0, width, height)` from the read framebuffer to the same
    /// rectangle of the draw framebuffer.
    fn blit_framebuffer(&mut self, width: u32, height: u32, mask: ClearMask);

    // --- frame state ---
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&mut self, mask: ClearMask);
    fn set_blend_enabled(&mut self, enabled: bool);
    fn set_depth_test_enabled(&mut self, enabled: bool);

    // --- draws ---
    fn draw_elements(&mut self, primitive: Primitive, index_count: u32, offset: u64);
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, vertex_count: u32);
}
