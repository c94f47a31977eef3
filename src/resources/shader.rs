//! Shader programs
//!
//! The device only sequences shader *handles*; source compilation and
//! uniform marshaling belong to the backend and higher layers. A [`Shader`]
//! holds the stage sources and links lazily on first update, relinking when
//! either source changes.

use crate::backend::GlBackend;
use crate::types::GlHandle;

#[derive(Debug)]
pub struct Shader {
    vertex_src: String,
    fragment_src: String,
    program: GlHandle,
    dirty: bool,
}

impl Shader {
    pub(crate) fn new(vertex_src: &str, fragment_src: &str) -> Self {
        Self {
            vertex_src: vertex_src.to_owned(),
            fragment_src: fragment_src.to_owned(),
            program: GlHandle::NONE,
            dirty: true,
        }
    }

    /// The native program handle; [`GlHandle::NONE`] until first linked.
    #[must_use]
    pub fn handle(&self) -> GlHandle {
        self.program
    }

    #[must_use]
    pub fn vertex_source(&self) -> &str {
        &self.vertex_src
    }

    #[must_use]
    pub fn fragment_source(&self) -> &str {
        &self.fragment_src
    }

    /// Replaces the stage sources and schedules a relink.
    pub fn set_sources(&mut self, vertex_src: &str, fragment_src: &str) {
        self.vertex_src.clear();
        self.vertex_src.push_str(vertex_src);
        self.fragment_src.clear();
        self.fragment_src.push_str(fragment_src);
        self.dirty = true;
    }

    /// Links the program if sources changed; no-op otherwise.
    pub(crate) fn update(&mut self, gl: &mut dyn GlBackend) {
        if !self.dirty {
            return;
        }
        if self.program.is_some() {
            gl.delete_program(self.program);
        }
        self.program = gl.create_program(&self.vertex_src, &self.fragment_src);
        self.dirty = false;
    }

    pub(crate) fn destroy(self, gl: &mut dyn GlBackend) {
        if self.program.is_some() {
            gl.delete_program(self.program);
        }
    }
}
