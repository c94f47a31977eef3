//! Error Types
//!
//! The error surface of the backend is intentionally small: runtime draw
//! operations never fail (an incomplete configuration skips the draw, see
//! the device documentation), so errors only arise when *creating* resources
//! with invalid parameters.

use thiserror::Error;

use crate::types::Attribute;

/// Errors raised by the resource creation surface.
#[derive(Error, Debug)]
pub enum PrismError {
    /// A vertex format must declare at least one attribute.
    #[error("vertex format declares no attributes")]
    EmptyVertexFormat,

    /// A vertex format may declare each attribute slot at most once.
    #[error("vertex format declares {0:?} more than once")]
    DuplicateAttribute(Attribute),

    /// Texture and render-target storage must be non-empty.
    #[error("texture dimensions must be non-zero (got {width}x{height})")]
    InvalidTextureSize { width: u32, height: u32 },

    /// Multisample counts are powers of two between 1 and 16.
    #[error("invalid multisample count {0} (expected a power of two in 1..=16)")]
    InvalidSampleCount(u32),
}

/// Alias for `Result<T, PrismError>`.
pub type Result<T> = std::result::Result<T, PrismError>;
