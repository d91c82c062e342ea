//! Typed errors for the dictionary codec, encoder and reader.

use thiserror::Error;

/// Errors produced while encoding or reading a dictionary byte image.
///
/// `NotFound`-shaped outcomes (an unknown word, an empty prediction list, ...)
/// are never represented here: they are ordinary empty/singleton return
/// values from the query methods, not errors.
#[derive(Error, Debug)]
pub enum DictError {
    /// An offset read would land outside the image, or a structural
    /// invariant (child count, parent pointer, region boundary) was
    /// violated while walking the image.
    #[error("corrupt dictionary image: {0}")]
    CorruptImage(String),

    /// The encoder's write cursor would exceed the 24-bit address space.
    #[error("encoder overflow: cursor {cursor} exceeds limit {limit}")]
    EncodeOverflow { cursor: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, DictError>;
