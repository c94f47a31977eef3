//! GPU state cache and bind layer
//!
//! [`GlContext`] is the process-local snapshot of what the driver currently
//! has bound. Every `bind_*` operation diffs the requested handle against
//! the cached one: equal is a no-op returning `false`; different issues
//! exactly one native call, updates the cache, and returns `true`.
//!
//! One context per device, alive for the device's lifetime, mutated only
//! through these methods. Keeping it an explicit object (rather than a
//! hidden singleton) lets multiple devices coexist without cross-talk.

use crate::backend::{FramebufferTarget, GlBackend};
use crate::device::framebuffer::FboContents;
use crate::device::{MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBS};
use crate::types::GlHandle;

/// Cached vertex-attribute pointer parameters for one slot.
///
/// A change in *any* field forces rebinding the source buffer and reissuing
/// the pointer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttribPointer {
    pub buffer: GlHandle,
    pub components: u32,
    pub stride: u32,
    pub offset: u64,
}

/// The tracked record of currently-bound GPU object identifiers.
#[derive(Debug)]
pub struct GlContext {
    framebuffer: GlHandle,
    program: GlHandle,
    vertex_buffer: GlHandle,
    index_buffer: GlHandle,

    active_unit: u32,
    textures: [GlHandle; MAX_TEXTURE_UNITS],

    attrib_enabled: [bool; MAX_VERTEX_ATTRIBS],
    attrib_pointers: [AttribPointer; MAX_VERTEX_ATTRIBS],

    /// Cached composition of the offscreen framebuffer.
    pub fbo_contents: FboContents,
}

impl Default for GlContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GlContext {
    /// A fresh cache matching a fresh native context: nothing bound, unit 0
    /// active, all attribute arrays disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            framebuffer: GlHandle::NONE,
            program: GlHandle::NONE,
            vertex_buffer: GlHandle::NONE,
            index_buffer: GlHandle::NONE,
            active_unit: 0,
            textures: [GlHandle::NONE; MAX_TEXTURE_UNITS],
            attrib_enabled: [false; MAX_VERTEX_ATTRIBS],
            attrib_pointers: [AttribPointer::default(); MAX_VERTEX_ATTRIBS],
            fbo_contents: FboContents::new(),
        }
    }

    // --- queries ---

    #[must_use]
    pub fn framebuffer(&self) -> GlHandle {
        self.framebuffer
    }

    #[must_use]
    pub fn program(&self) -> GlHandle {
        self.program
    }

    #[must_use]
    pub fn vertex_buffer(&self) -> GlHandle {
        self.vertex_buffer
    }

    #[must_use]
    pub fn index_buffer(&self) -> GlHandle {
        self.index_buffer
    }

    #[must_use]
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// The handle bound to `unit`, or [`GlHandle::NONE`].
    #[must_use]
    pub fn bound_texture(&self, unit: u32) -> GlHandle {
        self.textures
            .get(unit as usize)
            .copied()
            .unwrap_or(GlHandle::NONE)
    }

    #[must_use]
    pub fn attrib_enabled(&self, index: u32) -> bool {
        self.attrib_enabled
            .get(index as usize)
            .copied()
            .unwrap_or(false)
    }

    #[must_use]
    pub fn attrib_pointer(&self, index: u32) -> AttribPointer {
        self.attrib_pointers
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }

    // --- bind layer ---

    /// Binds the combined read+draw framebuffer point.
    pub fn bind_framebuffer(&mut self, gl: &mut dyn GlBackend, framebuffer: GlHandle) -> bool {
        if self.framebuffer == framebuffer {
            return false;
        }
        self.framebuffer = framebuffer;
        gl.bind_framebuffer(FramebufferTarget::Both, framebuffer);
        true
    }

    pub fn bind_shader(&mut self, gl: &mut dyn GlBackend, program: GlHandle) -> bool {
        if self.program == program {
            return false;
        }
        self.program = program;
        gl.use_program(program);
        true
    }

    pub fn bind_vertex_buffer(&mut self, gl: &mut dyn GlBackend, buffer: GlHandle) -> bool {
        if self.vertex_buffer == buffer {
            return false;
        }
        self.vertex_buffer = buffer;
        gl.bind_array_buffer(buffer);
        true
    }

    pub fn bind_index_buffer(&mut self, gl: &mut dyn GlBackend, buffer: GlHandle) -> bool {
        if self.index_buffer == buffer {
            return false;
        }
        self.index_buffer = buffer;
        gl.bind_element_buffer(buffer);
        true
    }

    /// Binds `texture` to `unit`, switching the active unit first, but only
    /// when the per-unit cache misses, so a texture already bound on an
    /// inactive unit costs nothing.
    pub fn bind_texture_2d(&mut self, gl: &mut dyn GlBackend, unit: u32, texture: GlHandle) -> bool {
        let slot = unit as usize;
        debug_assert!(slot < MAX_TEXTURE_UNITS);
        if self.textures[slot] == texture {
            return false;
        }
        if self.active_unit != unit {
            self.active_unit = unit;
            gl.active_texture(unit);
        }
        self.textures[slot] = texture;
        gl.bind_texture_2d(texture);
        true
    }

    pub fn set_attrib_enabled(&mut self, gl: &mut dyn GlBackend, index: u32, enabled: bool) -> bool {
        let slot = index as usize;
        debug_assert!(slot < MAX_VERTEX_ATTRIBS);
        if self.attrib_enabled[slot] == enabled {
            return false;
        }
        if enabled {
            gl.enable_vertex_attrib_array(index);
        } else {
            gl.disable_vertex_attrib_array(index);
        }
        self.attrib_enabled[slot] = enabled;
        true
    }

    /// Enables the attribute array and points it at `buffer`. The pointer
    /// call (and the buffer bind it depends on) is reissued when the slot
    /// was just enabled or any cached field differs.
    pub fn set_attrib_pointer(
        &mut self,
        gl: &mut dyn GlBackend,
        index: u32,
        buffer: GlHandle,
        components: u32,
        stride: u32,
        offset: u64,
    ) -> bool {
        let just_enabled = self.set_attrib_enabled(gl, index, true);

        let desired = AttribPointer {
            buffer,
            components,
            stride,
            offset,
        };
        let slot = index as usize;
        if !just_enabled && self.attrib_pointers[slot] == desired {
            return false;
        }
        self.bind_vertex_buffer(gl, buffer);
        gl.vertex_attrib_pointer(index, components, stride, offset);
        self.attrib_pointers[slot] = desired;
        true
    }
}
