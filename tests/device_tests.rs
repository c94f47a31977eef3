//! Draw Pipeline Tests
//!
//! Tests for:
//! - The canonical indexed-draw scenario (one native draw, correct counts)
//! - Soft skips: missing shader / missing index buffer issue nothing
//! - Prepare idempotence: an unchanged frame binds nothing
//! - Render-target in-use lifecycle and rendered-to flags
//! - Feedback-loop avoidance via the backup image
//! - On-demand multisample resolve when sampling a rendered target

use prism::backend::{GlCall, RecordingBackend};
use prism::{
    Attribute, BufferUsage, ClearMask, DrawPhase, GlHandle, GraphicsDevice, Primitive,
    TextureFormat, TextureSource, VertexFormat,
};

const VS: &str = "void main() { gl_Position = vec4(0.0); }";
const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

fn device() -> GraphicsDevice<RecordingBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    GraphicsDevice::new(RecordingBackend::new())
}

/// Shader + position-only quad (4 vertices, 6 indices), bound and ready.
fn quad_pipeline(dev: &mut GraphicsDevice<RecordingBackend>) {
    let shader = dev.create_shader(VS, FS);
    let format = VertexFormat::new(&[Attribute::Position]).unwrap();
    let vertices = dev.create_vertex_buffer(format, BufferUsage::Static);
    dev.get_vertex_buffer_mut(vertices).unwrap().set_vertices(&[
        -1.0, -1.0, 0.0, //
        1.0, -1.0, 0.0, //
        -1.0, 1.0, 0.0, //
        1.0, 1.0, 0.0, //
    ]);
    let indices = dev.create_index_buffer(BufferUsage::Static);
    dev.get_index_buffer_mut(indices).unwrap().set_indices(&[0, 1, 2, 2, 1, 3]);

    dev.set_shader(Some(shader));
    dev.set_vertex_buffers(&[vertices]);
    dev.set_index_buffer(Some(indices));
}

// ============================================================================
// Canonical draw scenario
// ============================================================================

#[test]
fn indexed_draw_issues_one_native_draw_with_six_indices() {
    let mut dev = device();
    quad_pipeline(&mut dev);

    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    let draws: Vec<_> = dev
        .backend()
        .calls()
        .iter()
        .filter(|c| matches!(c, GlCall::DrawElements { .. }))
        .collect();
    assert_eq!(
        draws,
        vec![&GlCall::DrawElements {
            primitive: Primitive::TriangleList,
            index_count: 6,
            offset: 0,
        }]
    );

    // position enabled, every other attribute slot disabled
    assert!(dev.context().attrib_enabled(0));
    for index in 1..4 {
        assert!(!dev.context().attrib_enabled(index));
    }
    assert_eq!(dev.phase(), DrawPhase::Drawn);
}

#[test]
fn indexed_draw_applies_start_offset_in_bytes() {
    let mut dev = device();
    quad_pipeline(&mut dev);

    dev.draw_indexed(Primitive::TriangleList, 3, 1);

    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::DrawElements { index_count: 3, offset: 6, .. }
        )),
        1,
        "start index 3 must become a 6-byte offset into u16 indices"
    );
}

#[test]
fn position_attribute_pointer_uses_format_arithmetic() {
    let mut dev = device();
    quad_pipeline(&mut dev);

    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::VertexAttribPointer { index: 0, components: 3, stride: 12, offset: 0 }
        )),
        1
    );
}

// ============================================================================
// Soft skips
// ============================================================================

#[test]
fn draw_without_shader_issues_nothing() {
    let mut dev = device();
    let indices = dev.create_index_buffer(BufferUsage::Static);
    dev.get_index_buffer_mut(indices).unwrap().set_indices(&[0, 1, 2]);
    dev.set_index_buffer(Some(indices));

    dev.draw_indexed(Primitive::TriangleList, 0, 1);

    assert!(dev.backend().calls().is_empty(), "a shaderless draw must be a no-op");
    assert_eq!(dev.context().program(), GlHandle::NONE);
    assert_eq!(dev.context().index_buffer(), GlHandle::NONE);
    assert_eq!(dev.phase(), DrawPhase::Idle);
}

#[test]
fn indexed_draw_without_index_buffer_issues_nothing() {
    let mut dev = device();
    let shader = dev.create_shader(VS, FS);
    dev.set_shader(Some(shader));

    dev.draw_indexed(Primitive::TriangleList, 0, 1);

    assert!(dev.backend().calls().is_empty());
}

#[test]
fn draw_with_destroyed_shader_is_skipped() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let shader = dev.bound_shader().unwrap();
    dev.destroy_shader(shader);
    dev.backend_mut().clear_calls();

    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    assert!(dev.backend().calls().is_empty());
}

// ============================================================================
// Prepare idempotence
// ============================================================================

#[test]
fn second_identical_prepare_issues_zero_calls() {
    let mut dev = device();
    quad_pipeline(&mut dev);

    assert!(dev.prepare_to_draw());
    dev.backend_mut().clear_calls();

    assert!(dev.prepare_to_draw());
    assert!(
        dev.backend().calls().is_empty(),
        "unchanged state must not repeat any native call, got {:?}",
        dev.backend().calls()
    );
}

#[test]
fn second_identical_draw_issues_only_the_draw() {
    let mut dev = device();
    quad_pipeline(&mut dev);

    dev.draw_indexed(Primitive::TriangleList, 0, 2);
    dev.backend_mut().clear_calls();
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    assert_eq!(
        dev.backend().calls(),
        &[GlCall::DrawElements {
            primitive: Primitive::TriangleList,
            index_count: 6,
            offset: 0,
        }]
    );
}

// ============================================================================
// Non-indexed draws
// ============================================================================

#[test]
fn draw_arrays_converts_primitive_count_to_vertices() {
    let mut dev = device();
    let shader = dev.create_shader(VS, FS);
    let format = VertexFormat::new(&[Attribute::Position]).unwrap();
    let vertices = dev.create_vertex_buffer(format, BufferUsage::Static);
    dev.get_vertex_buffer_mut(vertices)
        .unwrap()
        .set_vertices(&[0.0; 18]);
    dev.set_shader(Some(shader));
    dev.set_vertex_buffers(&[vertices]);

    dev.draw_arrays(Primitive::TriangleList, 0, 2);

    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::DrawArrays { primitive: Primitive::TriangleList, first: 0, vertex_count: 6 }
        )),
        1
    );
}

// ============================================================================
// Render target lifecycle
// ============================================================================

#[test]
fn prepare_marks_attached_target_in_use_and_clear_resets_it() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let target = dev.create_render_texture(TextureFormat::Rgba8, 64, 64, 1).unwrap();

    dev.set_render_target(0, Some(target));
    assert!(
        !dev.get_render_texture(target).unwrap().in_use(),
        "setting a slot is desired state only"
    );

    assert!(dev.prepare_to_draw());
    assert!(dev.get_render_texture(target).unwrap().in_use());

    dev.clear_render_targets(true, false);
    assert!(!dev.get_render_texture(target).unwrap().in_use());
    assert!(dev.render_target(0).is_none());
}

#[test]
fn post_draw_marks_color_and_depth_targets_rendered() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let color = dev.create_render_texture(TextureFormat::Rgba8, 64, 64, 1).unwrap();
    let depth = dev.create_render_texture(TextureFormat::Depth24, 64, 64, 1).unwrap();

    dev.set_render_target(0, Some(color));
    dev.set_depth_target(Some(depth));
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    assert!(dev.get_render_texture(color).unwrap().rendered_to());
    assert!(dev.get_render_texture(depth).unwrap().rendered_to());

    // the frame boundary resets the fresh-contents flag
    dev.pre_render(640, 480);
    assert!(!dev.get_render_texture(color).unwrap().rendered_to());
    assert!(!dev.get_render_texture(depth).unwrap().rendered_to());
}

// ============================================================================
// Feedback-loop avoidance
// ============================================================================

#[test]
fn sampling_an_attached_target_binds_its_backup_image() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let target = dev.create_render_texture(TextureFormat::Rgba8, 64, 64, 1).unwrap();

    dev.set_render_target(0, Some(target));
    dev.set_texture_unit(0, Some(TextureSource::RenderTexture(target)));

    assert!(dev.prepare_to_draw());

    let rt = dev.get_render_texture(target).unwrap();
    let backup = rt.backup_handle();
    assert!(backup.is_some(), "backup storage must be created on demand");
    assert_ne!(backup, rt.main_handle());
    assert_eq!(
        dev.context().bound_texture(0),
        backup,
        "the sampled unit must see the backup image, not the live target"
    );
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BlitFramebuffer { .. })),
        1,
        "the backup copy path must run exactly once"
    );
}

#[test]
fn detached_target_is_sampled_directly() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let target = dev.create_render_texture(TextureFormat::Rgba8, 64, 64, 1).unwrap();

    dev.set_render_target(0, Some(target));
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    dev.clear_render_targets(true, false);
    dev.set_texture_unit(0, Some(TextureSource::RenderTexture(target)));
    assert!(dev.prepare_to_draw());

    let rt = dev.get_render_texture(target).unwrap();
    assert_eq!(dev.context().bound_texture(0), rt.main_handle());
}

#[test]
fn backup_refresh_happens_once_per_rendered_frame() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let target = dev.create_render_texture(TextureFormat::Rgba8, 64, 64, 1).unwrap();

    dev.set_render_target(0, Some(target));
    dev.set_texture_unit(0, Some(TextureSource::RenderTexture(target)));

    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    // the draw marked the target dirty again, so the next prepare refreshes
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BlitFramebuffer { .. })),
        1
    );

    // a second prepare without an intervening draw has nothing to refresh
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BlitFramebuffer { .. })),
        0
    );
}

// ============================================================================
// Multisample resolve
// ============================================================================

#[test]
fn sampling_a_rendered_multisampled_target_resolves_once() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let target = dev.create_render_texture(TextureFormat::Rgba8, 32, 32, 4).unwrap();

    // pass 1: render into the multisampled target
    dev.set_render_target(0, Some(target));
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    // pass 2: sample it from the default framebuffer
    dev.clear_render_targets(true, false);
    dev.set_texture_unit(0, Some(TextureSource::RenderTexture(target)));
    dev.backend_mut().clear_calls();
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BlitFramebuffer { mask, .. } if *mask == ClearMask::COLOR)),
        1,
        "the multisample store must be resolved into the main image"
    );
    let rt = dev.get_render_texture(target).unwrap();
    assert_eq!(dev.context().bound_texture(0), rt.main_handle());

    // already resolved: drawing again must not blit
    dev.backend_mut().clear_calls();
    dev.draw_indexed(Primitive::TriangleList, 0, 2);
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BlitFramebuffer { .. })),
        0
    );
}

#[test]
fn depth_format_multisampled_target_is_never_blit_resolved() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    let depth = dev.create_render_texture(TextureFormat::Depth24, 32, 32, 4).unwrap();

    dev.set_depth_target(Some(depth));
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    dev.clear_render_targets(false, true);
    dev.set_texture_unit(0, Some(TextureSource::RenderTexture(depth)));
    dev.backend_mut().clear_calls();
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BlitFramebuffer { .. })),
        0,
        "depth resolve is unsupported by design"
    );
}

// ============================================================================
// Frame state and degraded configuration
// ============================================================================

#[test]
fn clear_issues_requested_mask_only() {
    let mut dev = device();
    dev.set_clear_color(0.25, 0.5, 0.75);

    dev.clear(true, false);
    assert_eq!(
        dev.backend().calls(),
        &[
            GlCall::SetClearColor { r: 0.25, g: 0.5, b: 0.75, a: 1.0 },
            GlCall::Clear { mask: ClearMask::COLOR },
        ]
    );

    dev.backend_mut().clear_calls();
    dev.clear(false, true);
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::Clear { mask } if *mask == ClearMask::DEPTH)),
        1
    );

    // neither aspect requested: framebuffer setup runs, nothing is cleared
    dev.backend_mut().clear_calls();
    dev.clear(false, false);
    assert_eq!(dev.backend().count_matching(|c| matches!(c, GlCall::Clear { .. })), 0);
}

#[test]
fn pre_render_resets_desired_bindings_and_clears() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    dev.draw_indexed(Primitive::TriangleList, 0, 2);

    dev.pre_render(640, 480);

    assert!(dev.bound_shader().is_none());
    assert!(dev.bound_index_buffer().is_none());
    assert!(dev.bound_vertex_buffers().is_empty());
    assert_eq!(dev.viewport(), glam::IVec4::new(0, 0, 640, 480));
    assert_eq!(dev.phase(), DrawPhase::Idle);

    assert!(dev.backend().count_matching(|c| matches!(
        c,
        GlCall::SetBlendEnabled { enabled: true }
    )) >= 1);
    assert!(dev.backend().count_matching(|c| matches!(
        c,
        GlCall::Clear { mask } if *mask == ClearMask::COLOR | ClearMask::DEPTH
    )) >= 1);
}

#[test]
fn cube_texture_binds_nothing() {
    let mut dev = device();
    quad_pipeline(&mut dev);
    dev.set_texture_unit(0, Some(TextureSource::Cube));

    assert!(dev.prepare_to_draw(), "an unsupported texture kind must not fail the draw");
    assert_eq!(dev.context().bound_texture(0), GlHandle::NONE);
}

#[test]
fn out_of_range_unit_and_slot_are_ignored() {
    let mut dev = device();
    let target = dev.create_render_texture(TextureFormat::Rgba8, 8, 8, 1).unwrap();

    dev.set_texture_unit(99, Some(TextureSource::RenderTexture(target)));
    dev.set_render_target(99, Some(target));

    assert!(dev.texture_unit(99).is_none());
    assert!(dev.render_target(99).is_none());
    assert!(dev.backend().calls().is_empty());
}
