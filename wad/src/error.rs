use std::io;

use thiserror::Error;

/// Errors that can be encountered while opening or parsing a WAD.
#[derive(Error, Debug)]
pub enum WadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Header magic wasn't `IWAD` or `PWAD`
    #[error("not a WAD file, header was {0:?}")]
    BadHeader([u8; 4]),

    #[error("corrupt WAD: directory extends beyond end of file")]
    DirectoryOutOfBounds,

    #[error("corrupt WAD: lump {name} at {offset}+{size} extends beyond end of file")]
    LumpOutOfBounds { name: String, offset: usize, size: usize },

    #[error("lump {0} not found")]
    MissingLump(String),

    #[error("lump {name} is too short, needed {needed} bytes but has {len}")]
    LumpTooShort {
        name: String,
        needed: usize,
        len: usize,
    },

    /// A TEXTURE1/TEXTURE2 entry is garbled: negative counts, offsets past
    /// the end of the lump, or a patch list running off the end
    #[error("Bad texture directory in {lump}, entry {entry}")]
    BadTextureDirectory { lump: String, entry: usize },
}
