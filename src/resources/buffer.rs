//! Vertex and index buffers
//!
//! Buffers keep a CPU-side copy of their contents plus a dirty flag;
//! [`VertexBuffer::update`] / [`IndexBuffer::update`] upload pending changes
//! through the state cache and are no-ops when nothing changed. Native
//! storage is created lazily on first upload.

use smallvec::SmallVec;

use crate::backend::GlBackend;
use crate::device::context::GlContext;
use crate::errors::{PrismError, Result};
use crate::types::{Attribute, BufferUsage, GlHandle};

/// Ordered attribute layout of a vertex buffer.
///
/// Offsets and the total stride are measured in f32 elements; byte values
/// are derived at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFormat {
    attributes: SmallVec<[Attribute; Attribute::COUNT]>,
}

impl VertexFormat {
    /// Builds a format from the attribute list, in element order.
    pub fn new(attributes: &[Attribute]) -> Result<Self> {
        if attributes.is_empty() {
            return Err(PrismError::EmptyVertexFormat);
        }
        for (i, attr) in attributes.iter().enumerate() {
            if attributes[..i].contains(attr) {
                return Err(PrismError::DuplicateAttribute(*attr));
            }
        }
        Ok(Self {
            attributes: SmallVec::from_slice(attributes),
        })
    }

    /// The declared attributes in element order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn has(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    /// Element offset of `attribute` within one vertex, if declared.
    #[must_use]
    pub fn offset(&self, attribute: Attribute) -> Option<u32> {
        let mut offset = 0;
        for attr in &self.attributes {
            if *attr == attribute {
                return Some(offset);
            }
            offset += attr.components();
        }
        None
    }

    /// Total elements per vertex.
    #[must_use]
    pub fn stride(&self) -> u32 {
        self.attributes.iter().map(|a| a.components()).sum()
    }
}

/// A vertex buffer with an attribute layout and an f32 CPU-side copy.
#[derive(Debug)]
pub struct VertexBuffer {
    format: VertexFormat,
    usage: BufferUsage,
    data: Vec<f32>,
    handle: GlHandle,
    dirty: bool,
}

impl VertexBuffer {
    #[must_use]
    pub(crate) fn new(format: VertexFormat, usage: BufferUsage) -> Self {
        Self {
            format,
            usage,
            data: Vec::new(),
            handle: GlHandle::NONE,
            dirty: false,
        }
    }

    #[must_use]
    pub fn format(&self) -> &VertexFormat {
        &self.format
    }

    #[must_use]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The native buffer handle; [`GlHandle::NONE`] until first uploaded.
    #[must_use]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    /// Vertices currently stored, derived from the format stride.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        let stride = self.format.stride() as usize;
        if stride == 0 { 0 } else { self.data.len() / stride }
    }

    #[must_use]
    pub fn vertices(&self) -> &[f32] {
        &self.data
    }

    /// Replaces the CPU-side contents and schedules an upload.
    pub fn set_vertices(&mut self, vertices: &[f32]) {
        self.data.clear();
        self.data.extend_from_slice(vertices);
        self.dirty = true;
    }

    /// Uploads pending changes; no-op when clean.
    pub(crate) fn update(&mut self, ctx: &mut GlContext, gl: &mut dyn GlBackend) {
        if !self.dirty {
            return;
        }
        if self.handle.is_none() {
            self.handle = gl.create_buffer();
        }
        ctx.bind_vertex_buffer(gl, self.handle);
        gl.array_buffer_data(bytemuck::cast_slice(&self.data), self.usage);
        self.dirty = false;
    }

    pub(crate) fn destroy(self, gl: &mut dyn GlBackend) {
        if self.handle.is_some() {
            gl.delete_buffer(self.handle);
        }
    }
}

/// An index buffer holding u16 indices.
#[derive(Debug)]
pub struct IndexBuffer {
    usage: BufferUsage,
    data: Vec<u16>,
    handle: GlHandle,
    dirty: bool,
}

impl IndexBuffer {
    #[must_use]
    pub(crate) fn new(usage: BufferUsage) -> Self {
        Self {
            usage,
            data: Vec::new(),
            handle: GlHandle::NONE,
            dirty: false,
        }
    }

    #[must_use]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The native buffer handle; [`GlHandle::NONE`] until first uploaded.
    #[must_use]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn indices(&self) -> &[u16] {
        &self.data
    }

    /// Replaces the CPU-side contents and schedules an upload.
    pub fn set_indices(&mut self, indices: &[u16]) {
        self.data.clear();
        self.data.extend_from_slice(indices);
        self.dirty = true;
    }

    /// Overwrites a range of indices starting at `start`, growing the buffer
    /// if the range extends past the current end.
    pub fn write_indices(&mut self, start: usize, indices: &[u16]) {
        let end = start + indices.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(indices);
        self.dirty = true;
    }

    /// Uploads pending changes; no-op when clean.
    pub(crate) fn update(&mut self, ctx: &mut GlContext, gl: &mut dyn GlBackend) {
        if !self.dirty {
            return;
        }
        if self.handle.is_none() {
            self.handle = gl.create_buffer();
        }
        ctx.bind_index_buffer(gl, self.handle);
        gl.element_buffer_data(bytemuck::cast_slice(&self.data), self.usage);
        self.dirty = false;
    }

    pub(crate) fn destroy(self, gl: &mut dyn GlBackend) {
        if self.handle.is_some() {
            gl.delete_buffer(self.handle);
        }
    }
}
