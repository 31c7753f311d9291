//! Error types for thumbnail rendering.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailError {
    /// Rendering was requested before any pyramid exists for the thumbnail.
    #[error("Thumbnail cache is not initialized")]
    UninitializedCache,
}
