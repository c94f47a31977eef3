//! Graphics device
//!
//! [`GraphicsDevice`] is the single entry point between "I want to draw
//! this" and "the GPU now has the right bindings". High-level `set_*` calls
//! mutate *desired* state only; [`GraphicsDevice::prepare_to_draw`]
//! reconciles desired state against the [`context::GlContext`] state cache,
//! orchestrates the offscreen framebuffer, and the `draw_*` entry points
//! submit at most one native draw per call.
//!
//! All failures on the draw path are soft: a missing shader or index buffer
//! skips the draw instead of erroring, since an incomplete configuration is
//! a caller concern surfaced at a higher level.

pub mod context;
pub mod framebuffer;

pub(crate) mod blit;

use glam::{IVec4, Vec3};
use log::{debug, warn};
use smallvec::SmallVec;

use crate::backend::{AttachmentPoint, FramebufferTarget, GlBackend};
use crate::errors::Result;
use crate::resources::{
    IndexBuffer, IndexBufferHandle, RenderTexture2D, RenderTextureHandle, Resources, Shader,
    ShaderHandle, Texture2D, TextureHandle, TextureSource, VertexBuffer, VertexBufferHandle,
    VertexFormat,
};
use crate::types::{Attribute, BufferUsage, ClearMask, GlHandle, Primitive, TextureFormat};

use context::GlContext;
use framebuffer::{ColorAttachment, ColorAttachments, DepthAttachment, FboContents};

/// Number of simultaneous color render-target slots.
pub const MAX_RENDER_TARGETS: usize = 4;
/// Number of texture units.
pub const MAX_TEXTURE_UNITS: usize = 16;
/// Number of vertex attribute slots.
pub const MAX_VERTEX_ATTRIBS: usize = Attribute::COUNT;

/// Bytes per vertex/index element (all vertex data is f32, indices are u16).
const F32_SIZE: u32 = std::mem::size_of::<f32>() as u32;
const INDEX_SIZE: u64 = std::mem::size_of::<u16>() as u64;

/// Where the draw pipeline currently stands.
///
/// The transient "preparing" stage is not observable from outside since
/// every operation completes synchronously; the device is `Ready` only
/// between a successful prepare and the draw submission it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    Ready,
    Drawn,
}

/// The graphics device: state cache, render-target tracking, framebuffer
/// orchestration and draw sequencing over a [`GlBackend`].
pub struct GraphicsDevice<B: GlBackend> {
    backend: B,
    ctx: GlContext,
    resources: Resources,

    // desired state, reconciled at prepare time
    shader: Option<ShaderHandle>,
    index_buffer: Option<IndexBufferHandle>,
    vertex_buffers: SmallVec<[VertexBufferHandle; 4]>,
    texture_units: [Option<TextureSource>; MAX_TEXTURE_UNITS],
    render_targets: [Option<RenderTextureHandle>; MAX_RENDER_TARGETS],
    depth_target: Option<RenderTextureHandle>,

    viewport: IVec4,
    clear_color: Vec3,
    phase: DrawPhase,

    // offscreen framebuffer plus the read/draw pair used by blits,
    // created lazily
    fbo: GlHandle,
    read_fbo: GlHandle,
    draw_fbo: GlHandle,
}

impl<B: GlBackend> GraphicsDevice<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ctx: GlContext::new(),
            resources: Resources::new(),
            shader: None,
            index_buffer: None,
            vertex_buffers: SmallVec::new(),
            texture_units: [None; MAX_TEXTURE_UNITS],
            render_targets: [None; MAX_RENDER_TARGETS],
            depth_target: None,
            viewport: IVec4::ZERO,
            clear_color: Vec3::new(0.7, 0.8, 0.9),
            phase: DrawPhase::Idle,
            fbo: GlHandle::NONE,
            read_fbo: GlHandle::NONE,
            draw_fbo: GlHandle::NONE,
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The state cache, for inspection.
    #[must_use]
    pub fn context(&self) -> &GlContext {
        &self.ctx
    }

    #[must_use]
    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    #[must_use]
    pub fn viewport(&self) -> IVec4 {
        self.viewport
    }

    #[must_use]
    pub fn clear_color(&self) -> Vec3 {
        self.clear_color
    }

    #[must_use]
    pub fn bound_shader(&self) -> Option<ShaderHandle> {
        self.shader
    }

    #[must_use]
    pub fn bound_index_buffer(&self) -> Option<IndexBufferHandle> {
        self.index_buffer
    }

    #[must_use]
    pub fn bound_vertex_buffers(&self) -> &[VertexBufferHandle] {
        &self.vertex_buffers
    }

    #[must_use]
    pub fn texture_unit(&self, unit: usize) -> Option<TextureSource> {
        self.texture_units.get(unit).copied().flatten()
    }

    #[must_use]
    pub fn render_target(&self, slot: usize) -> Option<RenderTextureHandle> {
        self.render_targets.get(slot).copied().flatten()
    }

    #[must_use]
    pub fn depth_target(&self) -> Option<RenderTextureHandle> {
        self.depth_target
    }

    // ========================================================================
    // Resource factory surface
    // ========================================================================

    pub fn create_vertex_buffer(
        &mut self,
        format: VertexFormat,
        usage: BufferUsage,
    ) -> VertexBufferHandle {
        self.resources
            .vertex_buffers
            .insert(VertexBuffer::new(format, usage))
    }

    pub fn create_index_buffer(&mut self, usage: BufferUsage) -> IndexBufferHandle {
        self.resources.index_buffers.insert(IndexBuffer::new(usage))
    }

    pub fn create_texture_2d(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        let texture = Texture2D::new(format, width, height)?;
        Ok(self.resources.textures.insert(texture))
    }

    pub fn create_render_texture(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<RenderTextureHandle> {
        let target = RenderTexture2D::new(format, width, height, samples)?;
        Ok(self.resources.render_textures.insert(target))
    }

    pub fn create_shader(&mut self, vertex_src: &str, fragment_src: &str) -> ShaderHandle {
        self.resources
            .shaders
            .insert(Shader::new(vertex_src, fragment_src))
    }

    pub fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        if let Some(buffer) = self.resources.vertex_buffers.remove(handle) {
            buffer.destroy(&mut self.backend);
        }
    }

    pub fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        if let Some(buffer) = self.resources.index_buffers.remove(handle) {
            buffer.destroy(&mut self.backend);
        }
    }

    pub fn destroy_texture_2d(&mut self, handle: TextureHandle) {
        if let Some(texture) = self.resources.textures.remove(handle) {
            texture.destroy(&mut self.backend);
        }
    }

    pub fn destroy_render_texture(&mut self, handle: RenderTextureHandle) {
        if let Some(target) = self.resources.render_textures.remove(handle) {
            target.destroy(&mut self.backend);
        }
    }

    pub fn destroy_shader(&mut self, handle: ShaderHandle) {
        if let Some(shader) = self.resources.shaders.remove(handle) {
            shader.destroy(&mut self.backend);
        }
    }

    #[must_use]
    pub fn get_vertex_buffer(&self, handle: VertexBufferHandle) -> Option<&VertexBuffer> {
        self.resources.vertex_buffers.get(handle)
    }

    pub fn get_vertex_buffer_mut(&mut self, handle: VertexBufferHandle) -> Option<&mut VertexBuffer> {
        self.resources.vertex_buffers.get_mut(handle)
    }

    #[must_use]
    pub fn get_index_buffer(&self, handle: IndexBufferHandle) -> Option<&IndexBuffer> {
        self.resources.index_buffers.get(handle)
    }

    pub fn get_index_buffer_mut(&mut self, handle: IndexBufferHandle) -> Option<&mut IndexBuffer> {
        self.resources.index_buffers.get_mut(handle)
    }

    #[must_use]
    pub fn get_texture_2d(&self, handle: TextureHandle) -> Option<&Texture2D> {
        self.resources.textures.get(handle)
    }

    pub fn get_texture_2d_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture2D> {
        self.resources.textures.get_mut(handle)
    }

    #[must_use]
    pub fn get_render_texture(&self, handle: RenderTextureHandle) -> Option<&RenderTexture2D> {
        self.resources.render_textures.get(handle)
    }

    pub fn get_render_texture_mut(
        &mut self,
        handle: RenderTextureHandle,
    ) -> Option<&mut RenderTexture2D> {
        self.resources.render_textures.get_mut(handle)
    }

    #[must_use]
    pub fn get_shader(&self, handle: ShaderHandle) -> Option<&Shader> {
        self.resources.shaders.get(handle)
    }

    pub fn get_shader_mut(&mut self, handle: ShaderHandle) -> Option<&mut Shader> {
        self.resources.shaders.get_mut(handle)
    }

    // ========================================================================
    // Desired state
    // ========================================================================

    pub fn set_shader(&mut self, shader: Option<ShaderHandle>) {
        self.shader = shader;
    }

    pub fn set_index_buffer(&mut self, buffer: Option<IndexBufferHandle>) {
        self.index_buffer = buffer;
    }

    pub fn set_vertex_buffers(&mut self, buffers: &[VertexBufferHandle]) {
        self.vertex_buffers.clear();
        self.vertex_buffers.extend_from_slice(buffers);
    }

    pub fn set_texture_unit(&mut self, unit: usize, texture: Option<TextureSource>) {
        if unit >= MAX_TEXTURE_UNITS {
            warn!("texture unit {unit} is out of range; ignoring");
            return;
        }
        if let Some(source) = texture {
            if !source.is_samplable() {
                warn!(
                    "{:?} textures are not implemented; unit {unit} will bind nothing",
                    source.kind()
                );
            }
        }
        self.texture_units[unit] = texture;
    }

    /// Sets or clears one color render-target slot. Desired state only; no
    /// native calls are issued until the next prepare or clear.
    pub fn set_render_target(&mut self, slot: usize, target: Option<RenderTextureHandle>) {
        if slot >= MAX_RENDER_TARGETS {
            warn!("render target slot {slot} is out of range; ignoring");
            return;
        }
        self.render_targets[slot] = target;
    }

    /// Sets or clears the depth render target. Desired state only.
    pub fn set_depth_target(&mut self, target: Option<RenderTextureHandle>) {
        self.depth_target = target;
    }

    /// Detaches current render targets, resetting the in-use flag of each
    /// cleared target so later samples read its live image again.
    pub fn clear_render_targets(&mut self, color: bool, depth: bool) {
        if color {
            for slot in 0..MAX_RENDER_TARGETS {
                if let Some(handle) = self.render_targets[slot].take() {
                    if let Some(target) = self.resources.render_textures.get_mut(handle) {
                        target.set_in_use(false);
                    }
                }
            }
        }
        if depth {
            if let Some(handle) = self.depth_target.take() {
                if let Some(target) = self.resources.render_textures.get_mut(handle) {
                    target.set_in_use(false);
                }
            }
        }
    }

    // ========================================================================
    // Frame state
    // ========================================================================

    /// Pass-start hook: resets desired bindings, restores frame defaults and
    /// clears the current framebuffer.
    pub fn pre_render(&mut self, width: u32, height: u32) {
        self.backend.set_blend_enabled(true);
        self.backend.set_depth_test_enabled(true);

        self.set_shader(None);
        self.set_vertex_buffers(&[]);
        self.set_index_buffer(None);
        self.set_viewport(0, 0, width as i32, height as i32);
        self.set_clear_color(0.7, 0.8, 0.9);
        self.clear(true, true);

        self.ensure_fbos();

        for target in self.resources.render_textures.values_mut() {
            target.clear_rendered_to();
        }
        self.phase = DrawPhase::Idle;
    }

    /// Pass-end hook.
    pub fn post_render(&mut self) {
        self.phase = DrawPhase::Idle;
    }

    /// Viewport is not part of the diffed state cache; it is stored for
    /// inspection and issued unconditionally.
    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = IVec4::new(x, y, width, height);
        self.backend.set_viewport(x, y, width, height);
    }

    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32) {
        self.clear_color = Vec3::new(r, g, b);
    }

    /// Clears the currently effective framebuffer (window or offscreen,
    /// depending on render-target occupancy).
    pub fn clear(&mut self, color: bool, depth: bool) {
        self.setup_framebuffer();

        let c = self.clear_color;
        self.backend.set_clear_color(c.x, c.y, c.z, 1.0);

        let mut mask = ClearMask::empty();
        if color {
            mask |= ClearMask::COLOR;
        }
        if depth {
            mask |= ClearMask::DEPTH;
        }
        if mask.is_empty() {
            return;
        }
        self.backend.clear(mask);
    }

    // ========================================================================
    // Draw pipeline
    // ========================================================================

    /// Reconciles desired state with the driver: uploads pending resource
    /// changes, orchestrates the framebuffer, binds shader, buffers,
    /// attributes and textures through the state cache.
    ///
    /// Returns `false` (not ready, draw should be skipped) when no usable
    /// shader is bound; nothing is issued in that case.
    pub fn prepare_to_draw(&mut self) -> bool {
        let Some(shader_handle) = self.shader else {
            debug!("draw skipped: no shader bound");
            return false;
        };
        if !self.resources.shaders.contains_key(shader_handle) {
            debug!("draw skipped: bound shader was destroyed");
            return false;
        }

        // upload pending resource changes
        if let Some(shader) = self.resources.shaders.get_mut(shader_handle) {
            shader.update(&mut self.backend);
        }
        if let Some(handle) = self.index_buffer {
            if let Some(buffer) = self.resources.index_buffers.get_mut(handle) {
                buffer.update(&mut self.ctx, &mut self.backend);
            }
        }
        for &handle in &self.vertex_buffers {
            if let Some(buffer) = self.resources.vertex_buffers.get_mut(handle) {
                buffer.update(&mut self.ctx, &mut self.backend);
            }
        }

        // orchestrate the framebuffer first so in-use flags reflect this
        // draw before textures are resolved against them
        self.setup_framebuffer();

        if let Some(handle) = self.index_buffer {
            if let Some(buffer) = self.resources.index_buffers.get(handle) {
                self.ctx.bind_index_buffer(&mut self.backend, buffer.handle());
            }
        }
        let program = self
            .resources
            .shaders
            .get(shader_handle)
            .map_or(GlHandle::NONE, Shader::handle);
        self.ctx.bind_shader(&mut self.backend, program);

        self.bind_vertex_attributes();
        self.bind_texture_units();

        self.phase = DrawPhase::Ready;
        true
    }

    /// Marks every currently-attached render target as rendered to this
    /// frame. Called after each draw submission.
    pub fn post_draw(&mut self) {
        if let Some(handle) = self.depth_target {
            if let Some(target) = self.resources.render_textures.get_mut(handle) {
                target.set_rendered_to();
            }
        }
        for slot in 0..MAX_RENDER_TARGETS {
            if let Some(handle) = self.render_targets[slot] {
                if let Some(target) = self.resources.render_textures.get_mut(handle) {
                    target.set_rendered_to();
                }
            }
        }
        self.phase = DrawPhase::Drawn;
    }

    /// Draws `primitive_count` primitives from the bound index buffer,
    /// starting at index `start`. Skips silently when no index buffer is
    /// bound or the pipeline is not ready.
    pub fn draw_indexed(&mut self, primitive: Primitive, start: u32, primitive_count: u32) {
        if self.index_buffer.is_none() {
            return;
        }
        if !self.prepare_to_draw() {
            return;
        }
        let index_count = primitive.vertex_count(primitive_count);
        self.backend
            .draw_elements(primitive, index_count, u64::from(start) * INDEX_SIZE);
        self.post_draw();
    }

    /// Draws `primitive_count` primitives straight from the bound vertex
    /// buffers, starting at vertex `start`.
    pub fn draw_arrays(&mut self, primitive: Primitive, start: u32, primitive_count: u32) {
        if !self.prepare_to_draw() {
            return;
        }
        let vertex_count = primitive.vertex_count(primitive_count);
        self.backend.draw_arrays(primitive, start, vertex_count);
        self.post_draw();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn has_custom_render_target(&self) -> bool {
        self.depth_target.is_some() || self.render_targets.iter().any(Option::is_some)
    }

    fn ensure_fbos(&mut self) {
        if self.fbo.is_none() {
            self.fbo = self.backend.create_framebuffer();
        }
        if self.read_fbo.is_none() {
            self.read_fbo = self.backend.create_framebuffer();
        }
        if self.draw_fbo.is_none() {
            self.draw_fbo = self.backend.create_framebuffer();
        }
    }

    /// Reconciles the render-target slots against the cached framebuffer
    /// composition, issuing only the attach/detach and draw-buffer calls
    /// needed to reach the new configuration.
    fn setup_framebuffer(&mut self) {
        if !self.has_custom_render_target() {
            // common fast path: straight to the window framebuffer
            self.ctx.bind_framebuffer(&mut self.backend, GlHandle::NONE);
            return;
        }

        self.ensure_fbos();
        self.ctx.bind_framebuffer(&mut self.backend, self.fbo);

        // build the desired color composition; attachment point i always
        // corresponds to slot i, gaps stay detached
        let mut desired: ColorAttachments = Default::default();
        for slot in 0..MAX_RENDER_TARGETS {
            let Some(handle) = self.render_targets[slot] else {
                continue;
            };
            let Some(target) = self.resources.render_textures.get_mut(handle) else {
                warn!("render target slot {slot} refers to a destroyed target; treating as empty");
                continue;
            };
            target.update(&mut self.ctx, &mut self.backend);
            target.set_in_use(true);
            let multisampled = target.is_multisampled();
            desired[slot] = Some(ColorAttachment {
                source: if multisampled {
                    target.renderbuffer_handle()
                } else {
                    target.main_handle()
                },
                renderbuffer: multisampled,
            });
        }

        // the depth attachment is a single cached pair, diffed on its own
        let mut desired_depth = None;
        if let Some(handle) = self.depth_target {
            if let Some(target) = self.resources.render_textures.get_mut(handle) {
                target.update(&mut self.ctx, &mut self.backend);
                target.set_in_use(true);
                let multisampled = target.is_multisampled();
                desired_depth = Some(DepthAttachment {
                    source: if multisampled {
                        target.renderbuffer_handle()
                    } else {
                        target.main_handle()
                    },
                    renderbuffer: multisampled,
                });
            } else {
                warn!("depth target refers to a destroyed target; treating as empty");
            }
        }
        if self.ctx.fbo_contents.depth != desired_depth {
            match desired_depth {
                Some(att) if att.renderbuffer => self.backend.framebuffer_renderbuffer(
                    FramebufferTarget::Both,
                    AttachmentPoint::Depth,
                    att.source,
                ),
                Some(att) => self.backend.framebuffer_texture_2d(
                    FramebufferTarget::Both,
                    AttachmentPoint::Depth,
                    att.source,
                ),
                None => self.backend.framebuffer_texture_2d(
                    FramebufferTarget::Both,
                    AttachmentPoint::Depth,
                    GlHandle::NONE,
                ),
            }
            self.ctx.fbo_contents.depth = desired_depth;
        }

        // positional diff of the color list; most frames match and issue
        // nothing
        if desired != self.ctx.fbo_contents.colors {
            for point in 0..MAX_RENDER_TARGETS {
                let new = desired[point];
                if new == self.ctx.fbo_contents.colors[point] {
                    continue;
                }
                let attachment = AttachmentPoint::Color(point as u32);
                match new {
                    Some(att) if att.renderbuffer => self.backend.framebuffer_renderbuffer(
                        FramebufferTarget::Both,
                        attachment,
                        att.source,
                    ),
                    Some(att) => self.backend.framebuffer_texture_2d(
                        FramebufferTarget::Both,
                        attachment,
                        att.source,
                    ),
                    None => self.backend.framebuffer_texture_2d(
                        FramebufferTarget::Both,
                        attachment,
                        GlHandle::NONE,
                    ),
                }
            }
            let points = FboContents::draw_buffer_points(&desired);
            debug!("reissued framebuffer color attachments ({} active)", points.len());
            self.backend.draw_buffers(&points);
            self.ctx.fbo_contents.colors = desired;
        }
    }

    /// For each attribute slot, binds the first bound vertex buffer whose
    /// format declares it, or disables the slot when none does.
    fn bind_vertex_attributes(&mut self) {
        let mut owners: [Option<VertexBufferHandle>; MAX_VERTEX_ATTRIBS] =
            [None; MAX_VERTEX_ATTRIBS];
        for &handle in &self.vertex_buffers {
            let Some(buffer) = self.resources.vertex_buffers.get(handle) else {
                continue;
            };
            for &attr in buffer.format().attributes() {
                if owners[attr.index()].is_none() {
                    owners[attr.index()] = Some(handle);
                }
            }
        }

        for attr in Attribute::ALL {
            let index = attr.index() as u32;
            match owners[attr.index()] {
                None => {
                    self.ctx.set_attrib_enabled(&mut self.backend, index, false);
                }
                Some(handle) => {
                    let Some(buffer) = self.resources.vertex_buffers.get(handle) else {
                        continue;
                    };
                    let stride = buffer.format().stride() * F32_SIZE;
                    let offset =
                        u64::from(buffer.format().offset(attr).unwrap_or(0) * F32_SIZE);
                    self.ctx.set_attrib_pointer(
                        &mut self.backend,
                        index,
                        buffer.handle(),
                        attr.components(),
                        stride,
                        offset,
                    );
                }
            }
        }
    }

    /// Uploads and binds every occupied texture unit, substituting backup
    /// images for render targets currently in use as draw destinations.
    fn bind_texture_units(&mut self) {
        for unit in 0..MAX_TEXTURE_UNITS {
            let index = unit as u32;
            match self.texture_units[unit] {
                None | Some(TextureSource::Cube) => {
                    self.ctx
                        .bind_texture_2d(&mut self.backend, index, GlHandle::NONE);
                }
                Some(TextureSource::Texture2D(handle)) => {
                    if let Some(texture) = self.resources.textures.get_mut(handle) {
                        texture.update(&mut self.ctx, &mut self.backend);
                        let id = texture.handle();
                        self.ctx.bind_texture_2d(&mut self.backend, index, id);
                    } else {
                        self.ctx
                            .bind_texture_2d(&mut self.backend, index, GlHandle::NONE);
                    }
                }
                Some(TextureSource::RenderTexture(handle)) => {
                    if let Some(target) = self.resources.render_textures.get_mut(handle) {
                        target.update(&mut self.ctx, &mut self.backend);
                        blit::resolve_if_needed(
                            &mut self.backend,
                            &self.ctx,
                            self.read_fbo,
                            self.draw_fbo,
                            target,
                        );
                        if target.in_use() {
                            // feedback-loop hazard: serve the backup image
                            // while the main image is a draw destination
                            debug!("render target sampled while in use; binding backup image");
                            blit::update_backup(
                                &mut self.backend,
                                &mut self.ctx,
                                self.read_fbo,
                                self.draw_fbo,
                                target,
                            );
                            let id = target.backup_handle();
                            self.ctx.bind_texture_2d(&mut self.backend, index, id);
                        } else {
                            let id = target.main_handle();
                            self.ctx.bind_texture_2d(&mut self.backend, index, id);
                        }
                    } else {
                        self.ctx
                            .bind_texture_2d(&mut self.backend, index, GlHandle::NONE);
                    }
                }
            }
        }
    }
}
