//! Null backend: every call is silently ignored.
//!
//! Object creation still hands out unique handles so the state cache and
//! resource bookkeeping behave exactly as they would against a live context.

use super::{AttachmentPoint, FramebufferTarget, GlBackend};
use crate::types::{BufferUsage, ClearMask, FilterMode, GlHandle, Primitive, TextureFormat, WrapMode};

/// A [`GlBackend`] that discards everything.
#[derive(Debug)]
pub struct NullBackend {
    next_handle: u32,
}

impl NullBackend {
    #[must_use]
    pub fn new() -> Self {
        Self { next_handle: 1 }
    }

    fn next(&mut self) -> GlHandle {
        let handle = GlHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlBackend for NullBackend {
    fn create_buffer(&mut self) -> GlHandle {
        self.next()
    }
    fn delete_buffer(&mut self, _buffer: GlHandle) {}
    fn create_texture(&mut self) -> GlHandle {
        self.next()
    }
    fn delete_texture(&mut self, _texture: GlHandle) {}
    fn create_renderbuffer(&mut self) -> GlHandle {
        self.next()
    }
    fn delete_renderbuffer(&mut self, _renderbuffer: GlHandle) {}
    fn create_framebuffer(&mut self) -> GlHandle {
        self.next()
    }
    fn delete_framebuffer(&mut self, _framebuffer: GlHandle) {}
    fn create_program(&mut self, _vertex_src: &str, _fragment_src: &str) -> GlHandle {
        self.next()
    }
    fn delete_program(&mut self, _program: GlHandle) {}

    fn array_buffer_data(&mut self, _data: &[u8], _usage: BufferUsage) {}
    fn element_buffer_data(&mut self, _data: &[u8], _usage: BufferUsage) {}
    fn tex_image_2d(
        &mut self,
        _format: TextureFormat,
        _width: u32,
        _height: u32,
        _data: Option<&[u8]>,
    ) {
    }
    fn tex_parameters(
        &mut self,
        _min_filter: FilterMode,
        _mag_filter: FilterMode,
        _wrap_u: WrapMode,
        _wrap_v: WrapMode,
        _mip_levels: u32,
    ) {
    }
    fn renderbuffer_storage(
        &mut self,
        _format: TextureFormat,
        _width: u32,
        _height: u32,
        _samples: u32,
    ) {
    }

    fn bind_framebuffer(&mut self, _target: FramebufferTarget, _framebuffer: GlHandle) {}
    fn bind_array_buffer(&mut self, _buffer: GlHandle) {}
    fn bind_element_buffer(&mut self, _buffer: GlHandle) {}
    fn bind_renderbuffer(&mut self, _renderbuffer: GlHandle) {}
    fn use_program(&mut self, _program: GlHandle) {}
    fn active_texture(&mut self, _unit: u32) {}
    fn bind_texture_2d(&mut self, _texture: GlHandle) {}
    fn enable_vertex_attrib_array(&mut self, _index: u32) {}
    fn disable_vertex_attrib_array(&mut self, _index: u32) {}
    fn vertex_attrib_pointer(&mut self, _index: u32, _components: u32, _stride: u32, _offset: u64) {}

    fn framebuffer_texture_2d(
        &mut self,
        _target: FramebufferTarget,
        _point: AttachmentPoint,
        _texture: GlHandle,
    ) {
    }
    fn framebuffer_renderbuffer(
        &mut self,
        _target: FramebufferTarget,
        _point: AttachmentPoint,
        _renderbuffer: GlHandle,
    ) {
    }
    fn draw_buffers(&mut self, _points: &[u32]) {}
    fn blit_framebuffer(&mut self, _width: u32, _height: u32, _mask: ClearMask) {}

    fn set_viewport(&mut self, _x: i32, _y: i32, _width: i32, _height: i32) {}
    fn set_clear_color(&mut self, _r: f32, _g: f32, _b: f32, _a: f32) {}
    fn clear(&mut self, _mask: ClearMask) {}
    fn set_blend_enabled(&mut self, _enabled: bool) {}
    fn set_depth_test_enabled(&mut self, _enabled: bool) {}

    fn draw_elements(&mut self, _primitive: Primitive, _index_count: u32, _offset: u64) {}
    fn draw_arrays(&mut self, _primitive: Primitive, _first: u32, _vertex_count: u32) {}
}
