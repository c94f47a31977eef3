//! Render targets
//!
//! A [`RenderTexture2D`] is a texture usable as a draw destination. It owns
//! up to three native objects:
//! - the *main* image, which samplers read;
//! - an optional multisample renderbuffer backing store (`samples > 1`),
//!   which draws land in until resolved into the main image;
//! - a lazily-created *backup* image, sampled instead of the main image
//!   while the target is simultaneously attached for writing (the
//!   feedback-loop hazard).
//!
//! The flags on this type drive the orchestration in `device`:
//! `in_use` marks the target as a current draw destination; `rendered_to`
//! reports fresh contents this frame; `needs_resolve` / `backup_stale`
//! gate the resolve and backup-copy blits so they run at most once per
//! change.

use crate::backend::GlBackend;
use crate::device::context::GlContext;
use crate::errors::{PrismError, Result};
use crate::types::{FilterMode, GlHandle, TextureFormat, WrapMode};

#[derive(Debug)]
pub struct RenderTexture2D {
    format: TextureFormat,
    width: u32,
    height: u32,
    samples: u32,

    main: GlHandle,
    renderbuffer: GlHandle,
    backup: GlHandle,

    dirty: bool,
    in_use: bool,
    rendered_to: bool,
    needs_resolve: bool,
    backup_stale: bool,
}

impl RenderTexture2D {
    pub(crate) fn new(format: TextureFormat, width: u32, height: u32, samples: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PrismError::InvalidTextureSize { width, height });
        }
        if samples == 0 || samples > 16 || !samples.is_power_of_two() {
            return Err(PrismError::InvalidSampleCount(samples));
        }
        Ok(Self {
            format,
            width,
            height,
            samples,
            main: GlHandle::NONE,
            renderbuffer: GlHandle::NONE,
            backup: GlHandle::NONE,
            dirty: true,
            in_use: false,
            rendered_to: false,
            needs_resolve: false,
            backup_stale: false,
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

    #[must_use]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    #[must_use]
    pub fn is_multisampled(&self) -> bool {
        self.samples > 1
    }

    /// The resolvable main image; what samplers normally read.
    #[must_use]
    pub fn main_handle(&self) -> GlHandle {
        self.main
    }

    /// The multisample backing store; [`GlHandle::NONE`] for single-sample
    /// targets.
    #[must_use]
    pub fn renderbuffer_handle(&self) -> GlHandle {
        self.renderbuffer
    }

    /// The backup image; [`GlHandle::NONE`] until first needed.
    #[must_use]
    pub fn backup_handle(&self) -> GlHandle {
        self.backup
    }

    /// True while the target is attached as a draw destination.
    #[must_use]
    pub fn in_use(&self) -> bool {
        self.in_use
    }

    /// True when the target received draw output this frame.
    #[must_use]
    pub fn rendered_to(&self) -> bool {
        self.rendered_to
    }

    #[must_use]
    pub(crate) fn needs_resolve(&self) -> bool {
        self.needs_resolve
    }

    #[must_use]
    pub(crate) fn backup_stale(&self) -> bool {
        self.backup_stale
    }

    pub(crate) fn set_in_use(&mut self, in_use: bool) {
        self.in_use = in_use;
    }

    /// Marks the target as having received draw output: its contents are
    /// fresh, the multisample store (if any) is newer than the main image,
    /// and the backup copy is out of date.
    pub(crate) fn set_rendered_to(&mut self) {
        self.rendered_to = true;
        self.needs_resolve = true;
        self.backup_stale = true;
    }

    pub(crate) fn clear_rendered_to(&mut self) {
        self.rendered_to = false;
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.needs_resolve = false;
    }

    pub(crate) fn mark_backup_fresh(&mut self) {
        self.backup_stale = false;
    }

    /// Resizes the storage; existing native objects are reallocated on the
    /// next update.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(PrismError::InvalidTextureSize { width, height });
        }
        self.width = width;
        self.height = height;
        self.dirty = true;
        Ok(())
    }

    /// Allocates or reallocates native storage; no-op when clean.
    pub(crate) fn update(&mut self, ctx: &mut GlContext, gl: &mut dyn GlBackend) {
        if !self.dirty {
            return;
        }
        if self.main.is_none() {
            self.main = gl.create_texture();
        }
        let unit = ctx.active_unit();
        ctx.bind_texture_2d(gl, unit, self.main);
        gl.tex_image_2d(self.format, self.width, self.height, None);
        gl.tex_parameters(
            FilterMode::Linear,
            FilterMode::Linear,
            WrapMode::ClampToEdge,
            WrapMode::ClampToEdge,
            1,
        );
        if self.is_multisampled() {
            if self.renderbuffer.is_none() {
                self.renderbuffer = gl.create_renderbuffer();
            }
            gl.bind_renderbuffer(self.renderbuffer);
            gl.renderbuffer_storage(self.format, self.width, self.height, self.samples);
        }
        // a stale backup from before the resize is reallocated lazily
        if self.backup.is_some() {
            self.backup_stale = true;
        }
        self.dirty = false;
    }

    /// Ensures the backup image exists, allocating its storage on demand.
    pub(crate) fn ensure_backup(&mut self, ctx: &mut GlContext, gl: &mut dyn GlBackend) {
        if self.backup.is_some() {
            return;
        }
        self.backup = gl.create_texture();
        let unit = ctx.active_unit();
        ctx.bind_texture_2d(gl, unit, self.backup);
        gl.tex_image_2d(self.format, self.width, self.height, None);
        gl.tex_parameters(
            FilterMode::Linear,
            FilterMode::Linear,
            WrapMode::ClampToEdge,
            WrapMode::ClampToEdge,
            1,
        );
        self.backup_stale = true;
    }

    pub(crate) fn destroy(self, gl: &mut dyn GlBackend) {
        if self.main.is_some() {
            gl.delete_texture(self.main);
        }
        if self.backup.is_some() {
            gl.delete_texture(self.backup);
        }
        if self.renderbuffer.is_some() {
            gl.delete_renderbuffer(self.renderbuffer);
        }
    }
}
