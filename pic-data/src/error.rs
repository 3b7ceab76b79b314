use thiserror::Error;
use wad::WadError;

/// Load time picture errors. Any of these means the asset data is corrupt and
/// the level can't be loaded.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error(transparent)]
    Wad(#[from] WadError),

    #[error("Bad PNAMES and/or texture directory: texture {texture} uses patch {index} of {count}")]
    BadPatchIndex {
        texture: String,
        index: i32,
        count: usize,
    },

    #[error("Missing patch {patch} in texture {texture}")]
    MissingPatch { texture: String, patch: String },

    #[error("Texture {texture} has a column without a patch at {column}")]
    ColumnWithoutPatch { texture: String, column: usize },

    /// Composite offsets are 16 bit
    #[error("Texture {texture} composite is {size} bytes, over 64k")]
    CompositeTooLarge { texture: String, size: usize },
}
