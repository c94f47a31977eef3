//! Multisample resolve and backup-texture copies
//!
//! Both paths run the same pattern: attach source and destination images to
//! the dedicated read/draw framebuffer pair, blit the full rectangle, then
//! rebind the framebuffer the state cache says was current. The cache itself
//! is never touched; the split read/draw binds are scoped to the blit, so a
//! resolve in the middle of an active render pass leaves pass state intact.

use log::debug;

use crate::backend::{AttachmentPoint, FramebufferTarget, GlBackend};
use crate::device::context::GlContext;
use crate::resources::RenderTexture2D;
use crate::types::{ClearMask, GlHandle};

/// Blits the multisample backing store into the resolvable main image, if
/// the target is multisampled and has unresolved draw output.
///
/// Depth-format targets are not resolved via blit; their multisample store
/// stays unresolved and the call is a logged no-op.
pub(crate) fn resolve_if_needed(
    gl: &mut dyn GlBackend,
    ctx: &GlContext,
    read_fbo: GlHandle,
    draw_fbo: GlHandle,
    target: &mut RenderTexture2D,
) {
    if !target.is_multisampled() || !target.needs_resolve() {
        return;
    }
    if target.format().is_depth() {
        debug!("skipping multisample resolve of depth-format target (unsupported)");
        return;
    }

    gl.bind_framebuffer(FramebufferTarget::Read, read_fbo);
    gl.framebuffer_renderbuffer(
        FramebufferTarget::Read,
        AttachmentPoint::Color(0),
        target.renderbuffer_handle(),
    );

    gl.bind_framebuffer(FramebufferTarget::Draw, draw_fbo);
    gl.framebuffer_texture_2d(
        FramebufferTarget::Draw,
        AttachmentPoint::Color(0),
        target.main_handle(),
    );

    gl.blit_framebuffer(target.width(), target.height(), ClearMask::COLOR);

    // restore the pass framebuffer; the cache was never invalidated
    gl.bind_framebuffer(FramebufferTarget::Both, ctx.framebuffer());

    target.mark_resolved();
}

/// Refreshes the target's backup image from its main image, creating the
/// backup storage on first use. Serves consumers that must *read* the target
/// while it is still a draw destination.
pub(crate) fn update_backup(
    gl: &mut dyn GlBackend,
    ctx: &mut GlContext,
    read_fbo: GlHandle,
    draw_fbo: GlHandle,
    target: &mut RenderTexture2D,
) {
    target.ensure_backup(ctx, gl);
    if !target.backup_stale() {
        return;
    }

    let is_color = !target.format().is_depth();
    let point = if is_color {
        AttachmentPoint::Color(0)
    } else {
        AttachmentPoint::Depth
    };
    let mask = if is_color {
        ClearMask::COLOR
    } else {
        ClearMask::DEPTH
    };

    debug!("refreshing backup image of in-use render target");

    gl.bind_framebuffer(FramebufferTarget::Read, read_fbo);
    gl.framebuffer_texture_2d(FramebufferTarget::Read, point, target.main_handle());

    gl.bind_framebuffer(FramebufferTarget::Draw, draw_fbo);
    gl.framebuffer_texture_2d(FramebufferTarget::Draw, point, target.backup_handle());

    gl.blit_framebuffer(target.width(), target.height(), mask);

    gl.bind_framebuffer(FramebufferTarget::Both, ctx.framebuffer());

    target.mark_backup_fresh();
}
