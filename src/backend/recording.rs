//! Recording backend: logs every native call for inspection.
//!
//! The primary harness for state-cache correctness: tests assert on the
//! exact sequence of [`GlCall`]s a scenario produces (or that a second,
//! identical pass produces none at all). Also handy as a debugging aid when
//! diagnosing redundant-bind regressions.

use super::{AttachmentPoint, FramebufferTarget, GlBackend};
use crate::types::{BufferUsage, ClearMask, FilterMode, GlHandle, Primitive, TextureFormat, WrapMode};

/// One recorded native call.
///
/// Upload payloads are reduced to their byte length; the call *sequence* is
/// what the cache logic is judged on, not the bytes themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateBuffer { handle: GlHandle },
    DeleteBuffer { handle: GlHandle },
    CreateTexture { handle: GlHandle },
    DeleteTexture { handle: GlHandle },
    CreateRenderbuffer { handle: GlHandle },
    DeleteRenderbuffer { handle: GlHandle },
    CreateFramebuffer { handle: GlHandle },
    DeleteFramebuffer { handle: GlHandle },
    CreateProgram { handle: GlHandle },
    DeleteProgram { handle: GlHandle },

    ArrayBufferData { len: usize, usage: BufferUsage },
    ElementBufferData { len: usize, usage: BufferUsage },
    TexImage2d { format: TextureFormat, width: u32, height: u32, with_data: bool },
    TexParameters {
        min_filter: FilterMode,
        mag_filter: FilterMode,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
        mip_levels: u32,
    },
    RenderbufferStorage { format: TextureFormat, width: u32, height: u32, samples: u32 },

    BindFramebuffer { target: FramebufferTarget, framebuffer: GlHandle },
    BindArrayBuffer { buffer: GlHandle },
    BindElementBuffer { buffer: GlHandle },
    BindRenderbuffer { renderbuffer: GlHandle },
    UseProgram { program: GlHandle },
    ActiveTexture { unit: u32 },
    BindTexture2d { texture: GlHandle },
    EnableVertexAttribArray { index: u32 },
    DisableVertexAttribArray { index: u32 },
    VertexAttribPointer { index: u32, components: u32, stride: u32, offset: u64 },

    FramebufferTexture2d { target: FramebufferTarget, point: AttachmentPoint, texture: GlHandle },
    FramebufferRenderbuffer {
        target: FramebufferTarget,
        point: AttachmentPoint,
        renderbuffer: GlHandle,
    },
    DrawBuffers { points: Vec<u32> },
    BlitFramebuffer { width: u32, height: u32, mask: ClearMask },

    SetViewport { x: i32, y: i32, width: i32, height: i32 },
    SetClearColor { r: f32, g: f32, b: f32, a: f32 },
    Clear { mask: ClearMask },
    SetBlendEnabled { enabled: bool },
    SetDepthTestEnabled { enabled: bool },

    DrawElements { primitive: Primitive, index_count: u32, offset: u64 },
    DrawArrays { primitive: Primitive, first: u32, vertex_count: u32 },
}

/// A [`GlBackend`] that appends every call to a log.
#[derive(Debug)]
pub struct RecordingBackend {
    next_handle: u32,
    calls: Vec<GlCall>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            calls: Vec::new(),
        }
    }

    /// All calls recorded so far, in issue order.
    #[must_use]
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drains the log, returning the recorded calls.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forgets everything recorded so far.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    fn next(&mut self) -> GlHandle {
        let handle = GlHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn push(&mut self, call: GlCall) {
        self.calls.push(call);
    }
}

impl GlBackend for RecordingBackend {
    fn create_buffer(&mut self) -> GlHandle {
        let handle = self.next();
        self.push(GlCall::CreateBuffer { handle });
        handle
    }
    fn delete_buffer(&mut self, handle: GlHandle) {
        self.push(GlCall::DeleteBuffer { handle });
    }
    fn create_texture(&mut self) -> GlHandle {
        let handle = self.next();
        self.push(GlCall::CreateTexture { handle });
        handle
    }
    fn delete_texture(&mut self, handle: GlHandle) {
        self.push(GlCall::DeleteTexture { handle });
    }
    fn create_renderbuffer(&mut self) -> GlHandle {
        let handle = self.next();
        self.push(GlCall::CreateRenderbuffer { handle });
        handle
    }
    fn delete_renderbuffer(&mut self, handle: GlHandle) {
        self.push(GlCall::DeleteRenderbuffer { handle });
    }
    fn create_framebuffer(&mut self) -> GlHandle {
        let handle = self.next();
        self.push(GlCall::CreateFramebuffer { handle });
        handle
    }
    fn delete_framebuffer(&mut self, handle: GlHandle) {
        self.push(GlCall::DeleteFramebuffer { handle });
    }
    fn create_program(&mut self, _vertex_src: &str, _fragment_src: &str) -> GlHandle {
        let handle = self.next();
        self.push(GlCall::CreateProgram { handle });
        handle
    }
    fn delete_program(&mut self, handle: GlHandle) {
        self.push(GlCall::DeleteProgram { handle });
    }

    fn array_buffer_data(&mut self, data: &[u8], usage: BufferUsage) {
        self.push(GlCall::ArrayBufferData { len: data.len(), usage });
    }
    fn element_buffer_data(&mut self, data: &[u8], usage: BufferUsage) {
        self.push(GlCall::ElementBufferData { len: data.len(), usage });
    }
    fn tex_image_2d(&mut self, format: TextureFormat, width: u32, height: u32, data: Option<&[u8]>) {
        self.push(GlCall::TexImage2d {
            format,
            width,
            height,
            with_data: data.is_some(),
        });
    }
    fn tex_parameters(
        &mut self,
        min_filter: FilterMode,
        mag_filter: FilterMode,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
        mip_levels: u32,
    ) {
        self.push(GlCall::TexParameters {
            min_filter,
            mag_filter,
            wrap_u,
            wrap_v,
            mip_levels,
        });
    }
    fn renderbuffer_storage(&mut self, format: TextureFormat, width: u32, height: u32, samples: u32) {
        self.push(GlCall::RenderbufferStorage {
            format,
            width,
            height,
            samples,
        });
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: GlHandle) {
        self.push(GlCall::BindFramebuffer {
            target,
            framebuffer,
        });
    }
    fn bind_array_buffer(&mut self, buffer: GlHandle) {
        self.push(GlCall::BindArrayBuffer { buffer });
    }
    fn bind_element_buffer(&mut self, buffer: GlHandle) {
        self.push(GlCall::BindElementBuffer { buffer });
    }
    fn bind_renderbuffer(&mut self, renderbuffer: GlHandle) {
        self.push(GlCall::BindRenderbuffer { renderbuffer });
    }
    fn use_program(&mut self, program: GlHandle) {
        self.push(GlCall::UseProgram { program });
    }
    fn active_texture(&mut self, unit: u32) {
        self.push(GlCall::ActiveTexture { unit });
    }
    fn bind_texture_2d(&mut self, texture: GlHandle) {
        self.push(GlCall::BindTexture2d { texture });
    }
    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.push(GlCall::EnableVertexAttribArray { index });
    }
    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.push(GlCall::DisableVertexAttribArray { index });
    }
    fn vertex_attrib_pointer(&mut self, index: u32, components: u32, stride: u32, offset: u64) {
        self.push(GlCall::VertexAttribPointer {
            index,
            components,
            stride,
            offset,
        });
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        texture: GlHandle,
    ) {
        self.push(GlCall::FramebufferTexture2d {
            target,
            point,
            texture,
        });
    }
    fn framebuffer_renderbuffer(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        renderbuffer: GlHandle,
    ) {
        self.push(GlCall::FramebufferRenderbuffer {
            target,
            point,
            renderbuffer,
        });
    }
    fn draw_buffers(&mut self, points: &[u32]) {
        self.push(GlCall::DrawBuffers {
            points: points.to_vec(),
        });
    }
    fn blit_framebuffer(&mut self, width: u32, height: u32, mask: ClearMask) {
        self.push(GlCall::BlitFramebuffer {
            width,
            height,
            mask,
        });
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.push(GlCall::SetViewport {
            x,
            y,
            width,
            height,
        });
    }
    fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.push(GlCall::SetClearColor { r, g, b, a });
    }
    fn clear(&mut self, mask: ClearMask) {
        self.push(GlCall::Clear { mask });
    }
    fn set_blend_enabled(&mut self, enabled: bool) {
        self.push(GlCall::SetBlendEnabled { enabled });
    }
    fn set_depth_test_enabled(&mut self, enabled: bool) {
        self.push(GlCall::SetDepthTestEnabled { enabled });
    }

    fn draw_elements(&mut self, primitive: Primitive, index_count: u32, offset: u64) {
        self.push(GlCall::DrawElements {
            primitive,
            index_count,
            offset,
        });
    }
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, vertex_count: u32) {
        self.push(GlCall::DrawArrays {
            primitive,
            first,
            vertex_count,
        });
    }
}
