//! Resource Subsystem Tests
//!
//! Tests for:
//! - VertexFormat: offset/stride arithmetic and validation
//! - Buffer upload idempotence (dirty-flag contract)
//! - IndexBuffer region writes
//! - Texture2D: split data/parameter dirty flags
//! - RenderTexture2D: storage allocation and creation validation
//! - Shader relinking on source change

use prism::backend::{GlCall, RecordingBackend};
use prism::{
    Attribute, BufferUsage, FilterMode, GraphicsDevice, PrismError, TextureFormat, TextureSource,
    VertexFormat,
};

const VS: &str = "void main() { gl_Position = vec4(0.0); }";
const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

fn device() -> GraphicsDevice<RecordingBackend> {
    GraphicsDevice::new(RecordingBackend::new())
}

/// A device with a bound shader, so `prepare_to_draw` runs the upload path.
fn shaded_device() -> GraphicsDevice<RecordingBackend> {
    let mut dev = device();
    let shader = dev.create_shader(VS, FS);
    dev.set_shader(Some(shader));
    dev
}

// ============================================================================
// VertexFormat
// ============================================================================

#[test]
fn vertex_format_offsets_follow_declaration_order() {
    let format =
        VertexFormat::new(&[Attribute::Position, Attribute::Normal, Attribute::TexCoord]).unwrap();

    assert_eq!(format.stride(), 8);
    assert_eq!(format.offset(Attribute::Position), Some(0));
    assert_eq!(format.offset(Attribute::Normal), Some(3));
    assert_eq!(format.offset(Attribute::TexCoord), Some(6));
    assert_eq!(format.offset(Attribute::Color), None);
    assert!(format.has(Attribute::Normal));
    assert!(!format.has(Attribute::Color));
}

#[test]
fn vertex_format_rejects_empty_declaration() {
    assert!(matches!(
        VertexFormat::new(&[]),
        Err(PrismError::EmptyVertexFormat)
    ));
}

#[test]
fn vertex_format_rejects_duplicate_attribute() {
    assert!(matches!(
        VertexFormat::new(&[Attribute::Position, Attribute::Position]),
        Err(PrismError::DuplicateAttribute(Attribute::Position))
    ));
}

// ============================================================================
// Buffer uploads
// ============================================================================

#[test]
fn vertex_buffer_uploads_once_until_changed() {
    let mut dev = shaded_device();
    let format = VertexFormat::new(&[Attribute::Position]).unwrap();
    let buffer = dev.create_vertex_buffer(format, BufferUsage::Dynamic);
    dev.get_vertex_buffer_mut(buffer).unwrap().set_vertices(&[0.0; 9]);
    dev.set_vertex_buffers(&[buffer]);

    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::ArrayBufferData { .. })),
        1
    );

    // clean buffer: no re-upload
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::ArrayBufferData { .. })),
        0
    );

    // changed contents: exactly one more upload, with the new byte length
    dev.get_vertex_buffer_mut(buffer).unwrap().set_vertices(&[0.0; 18]);
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::ArrayBufferData { len: 72, usage: BufferUsage::Dynamic }
        )),
        1
    );
}

#[test]
fn index_buffer_uploads_through_the_cached_bind() {
    let mut dev = shaded_device();
    let buffer = dev.create_index_buffer(BufferUsage::Static);
    dev.get_index_buffer_mut(buffer).unwrap().set_indices(&[0, 1, 2]);
    dev.set_index_buffer(Some(buffer));

    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::ElementBufferData { len: 6, .. })),
        1
    );
    // the upload bound the buffer; prepare must not bind it a second time
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::BindElementBuffer { .. })),
        1
    );
}

#[test]
fn index_buffer_region_write_grows_storage() {
    let mut dev = device();
    let buffer = dev.create_index_buffer(BufferUsage::Dynamic);
    let ib = dev.get_index_buffer_mut(buffer).unwrap();

    ib.set_indices(&[0, 1, 2]);
    ib.write_indices(4, &[7, 8]);

    assert_eq!(ib.index_count(), 6);
    assert_eq!(ib.indices(), &[0, 1, 2, 0, 7, 8]);
}

#[test]
fn vertex_count_derives_from_stride() {
    let mut dev = device();
    let format = VertexFormat::new(&[Attribute::Position, Attribute::TexCoord]).unwrap();
    let buffer = dev.create_vertex_buffer(format, BufferUsage::Static);
    let vb = dev.get_vertex_buffer_mut(buffer).unwrap();

    vb.set_vertices(&[0.0; 15]); // 3 vertices * (3 + 2) elements
    assert_eq!(vb.vertex_count(), 3);
}

// ============================================================================
// Texture2D
// ============================================================================

#[test]
fn texture_data_and_params_upload_independently() {
    let mut dev = shaded_device();
    let texture = dev.create_texture_2d(TextureFormat::Rgba8, 4, 4).unwrap();
    dev.get_texture_2d_mut(texture).unwrap().set_data(&[255; 64]);
    dev.set_texture_unit(0, Some(TextureSource::Texture2D(texture)));

    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::TexImage2d { with_data: true, .. })),
        1
    );
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::TexParameters { .. })),
        1
    );

    // filter change: parameters only, no pixel re-upload
    dev.get_texture_2d_mut(texture)
        .unwrap()
        .set_filters(FilterMode::Nearest, FilterMode::Nearest);
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::TexImage2d { .. })),
        0
    );
    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::TexParameters { min_filter: FilterMode::Nearest, .. }
        )),
        1
    );

    // data change: pixels only
    dev.get_texture_2d_mut(texture).unwrap().set_data(&[0; 64]);
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::TexImage2d { .. })),
        1
    );
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::TexParameters { .. })),
        0
    );
}

#[test]
fn texture_resize_reallocates_storage() {
    let mut dev = shaded_device();
    let texture = dev.create_texture_2d(TextureFormat::Rgba8, 4, 4).unwrap();
    dev.set_texture_unit(0, Some(TextureSource::Texture2D(texture)));
    assert!(dev.prepare_to_draw());

    dev.get_texture_2d_mut(texture).unwrap().resize(8, 8).unwrap();
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::TexImage2d { width: 8, height: 8, with_data: false, .. }
        )),
        1
    );
}

#[test]
fn texture_creation_rejects_empty_dimensions() {
    let mut dev = device();
    assert!(matches!(
        dev.create_texture_2d(TextureFormat::Rgba8, 0, 4),
        Err(PrismError::InvalidTextureSize { width: 0, height: 4 })
    ));
}

// ============================================================================
// RenderTexture2D
// ============================================================================

#[test]
fn render_texture_rejects_bad_sample_counts() {
    let mut dev = device();
    for samples in [0, 3, 32] {
        assert!(matches!(
            dev.create_render_texture(TextureFormat::Rgba8, 8, 8, samples),
            Err(PrismError::InvalidSampleCount(_))
        ));
    }
    assert!(dev.create_render_texture(TextureFormat::Rgba8, 8, 8, 4).is_ok());
}

#[test]
fn single_sample_target_allocates_no_renderbuffer() {
    let mut dev = shaded_device();
    let target = dev.create_render_texture(TextureFormat::Rgba8, 8, 8, 1).unwrap();
    dev.set_render_target(0, Some(target));
    assert!(dev.prepare_to_draw());

    let rt = dev.get_render_texture(target).unwrap();
    assert!(rt.main_handle().is_some());
    assert!(rt.renderbuffer_handle().is_none());
    assert!(!rt.is_multisampled());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::RenderbufferStorage { .. })),
        0
    );
}

#[test]
fn multisampled_target_allocates_renderbuffer_storage() {
    let mut dev = shaded_device();
    let target = dev.create_render_texture(TextureFormat::Rgba8, 8, 8, 4).unwrap();
    dev.set_render_target(0, Some(target));
    assert!(dev.prepare_to_draw());

    assert!(dev.get_render_texture(target).unwrap().renderbuffer_handle().is_some());
    assert_eq!(
        dev.backend().count_matching(|c| matches!(
            c,
            GlCall::RenderbufferStorage { samples: 4, width: 8, height: 8, .. }
        )),
        1
    );
}

// ============================================================================
// Shader
// ============================================================================

#[test]
fn shader_links_once_and_relinks_on_source_change() {
    let mut dev = shaded_device();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::CreateProgram { .. })),
        1
    );

    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::CreateProgram { .. })),
        0
    );

    let shader = dev.bound_shader().unwrap();
    dev.get_shader_mut(shader).unwrap().set_sources(VS, "void main() {}");
    dev.backend_mut().clear_calls();
    assert!(dev.prepare_to_draw());
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::DeleteProgram { .. })),
        1
    );
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::CreateProgram { .. })),
        1
    );
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn destroying_uploaded_resources_deletes_native_objects() {
    let mut dev = shaded_device();
    let format = VertexFormat::new(&[Attribute::Position]).unwrap();
    let buffer = dev.create_vertex_buffer(format, BufferUsage::Static);
    dev.get_vertex_buffer_mut(buffer).unwrap().set_vertices(&[0.0; 9]);
    dev.set_vertex_buffers(&[buffer]);
    assert!(dev.prepare_to_draw());

    dev.backend_mut().clear_calls();
    dev.destroy_vertex_buffer(buffer);
    assert_eq!(
        dev.backend()
            .count_matching(|c| matches!(c, GlCall::DeleteBuffer { .. })),
        1
    );
    assert!(dev.get_vertex_buffer(buffer).is_none());
}

#[test]
fn destroying_a_never_uploaded_resource_is_silent() {
    let mut dev = device();
    let buffer = dev.create_index_buffer(BufferUsage::Static);
    dev.destroy_index_buffer(buffer);
    assert!(dev.backend().calls().is_empty());
}
