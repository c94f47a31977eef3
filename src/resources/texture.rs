//! Sampled 2D textures
//!
//! A [`Texture2D`] keeps an RGBA8 CPU-side copy plus sampler parameters,
//! with separate dirty flags for data and parameters so that changing a
//! filter does not re-upload the pixels (and vice versa).

use crate::backend::GlBackend;
use crate::device::context::GlContext;
use crate::errors::{PrismError, Result};
use crate::types::{FilterMode, GlHandle, TextureFormat, WrapMode};

/// The closed set of texture kinds the device understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture2D,
    RenderTexture2D,
    /// Reserved; binding a cube texture degrades to an unbound unit.
    Cube,
}

/// A sampled 2D texture with CPU-side pixel storage.
#[derive(Debug)]
pub struct Texture2D {
    format: TextureFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
    handle: GlHandle,

    min_filter: FilterMode,
    mag_filter: FilterMode,
    wrap_u: WrapMode,
    wrap_v: WrapMode,
    mip_levels: u32,

    dirty: bool,
    params_dirty: bool,
}

impl Texture2D {
    pub(crate) fn new(format: TextureFormat, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PrismError::InvalidTextureSize { width, height });
        }
        Ok(Self {
            format,
            width,
            height,
            data: Vec::new(),
            handle: GlHandle::NONE,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            mip_levels: 1,
            // storage must be allocated even before pixels arrive
            dirty: true,
            params_dirty: true,
        })
    }

    #[must_use]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The native texture handle; [`GlHandle::NONE`] until first uploaded.
    #[must_use]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replaces the full pixel contents and schedules an upload.
    pub fn set_data(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.dirty = true;
    }

    /// Resizes the storage, discarding current pixels.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(PrismError::InvalidTextureSize { width, height });
        }
        self.width = width;
        self.height = height;
        self.data.clear();
        self.dirty = true;
        Ok(())
    }

    pub fn set_filters(&mut self, min_filter: FilterMode, mag_filter: FilterMode) {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        self.params_dirty = true;
    }

    pub fn set_wrap(&mut self, wrap_u: WrapMode, wrap_v: WrapMode) {
        self.wrap_u = wrap_u;
        self.wrap_v = wrap_v;
        self.params_dirty = true;
    }

    /// Sets the mipmap chain length; 1 disables mipmapping.
    pub fn set_mipmaps(&mut self, levels: u32) {
        self.mip_levels = levels.max(1);
        self.params_dirty = true;
    }

    /// Uploads pending pixel data and/or sampler parameters; no-op when
    /// clean. Binds through the state cache on the currently active unit.
    pub(crate) fn update(&mut self, ctx: &mut GlContext, gl: &mut dyn GlBackend) {
        if !self.dirty && !self.params_dirty {
            return;
        }
        if self.handle.is_none() {
            self.handle = gl.create_texture();
        }
        let unit = ctx.active_unit();
        ctx.bind_texture_2d(gl, unit, self.handle);
        if self.dirty {
            let pixels = if self.data.is_empty() { None } else { Some(self.data.as_slice()) };
            gl.tex_image_2d(self.format, self.width, self.height, pixels);
            self.dirty = false;
        }
        if self.params_dirty {
            gl.tex_parameters(
                self.min_filter,
                self.mag_filter,
                self.wrap_u,
                self.wrap_v,
                self.mip_levels,
            );
            self.params_dirty = false;
        }
    }

    pub(crate) fn destroy(self, gl: &mut dyn GlBackend) {
        if self.handle.is_some() {
            gl.delete_texture(self.handle);
        }
    }
}
