use std::ops::Range;

use crate::wad::{get_i16, get_i32, get_u16, lump_name};
use crate::WadError;

/// Terminates a column's list of posts
pub const POST_END: u8 = 0xFF;

/// A single run of opaque pixels in a column.
///
/// Encoded in a lump as:
///
/// | Field Size | Data Type | Content                                     |
/// |------------|-----------|---------------------------------------------|
/// |  0x00      |    u8     | Row the run starts at, `0xFF` ends a column |
/// |  0x01      |    u8     | Pixel count                                 |
/// |  0x02      |    u8     | Unused padding                              |
/// |  0x03..n   |    u8     | `length` palette indices                    |
/// |  n+1       |    u8     | Unused padding                              |
///
/// Columns taller than 254 rows use the tall patch convention: a start row
/// that is not greater than the previous post's row is relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Post<'a> {
    /// Absolute row in the column
    pub top: i32,
    pub pixels: &'a [u8],
}

/// Walks the encoded posts of one column. Stops at `POST_END`, or early if
/// the data is truncated.
#[derive(Debug, Clone)]
pub struct PostIter<'a> {
    data: &'a [u8],
    pos: usize,
    last_top: i32,
}

impl<'a> PostIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            last_top: -1,
        }
    }
}

impl<'a> Iterator for PostIter<'a> {
    type Item = Post<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let delta = *self.data.get(self.pos)?;
        if delta == POST_END {
            return None;
        }
        let len = *self.data.get(self.pos + 1)? as usize;
        let start = self.pos + 3;
        let pixels = self.data.get(start..start + len)?;
        self.pos = start + len + 1;

        let delta = delta as i32;
        let top = if delta <= self.last_top {
            self.last_top + delta
        } else {
            delta
        };
        self.last_top = top;
        Some(Post { top, pixels })
    }
}

const MAX_DELTA: i32 = POST_END as i32 - 1;

fn push_post(out: &mut Vec<u8>, delta: i32, pixels: &[u8]) {
    out.push(delta as u8);
    out.push(pixels.len() as u8);
    out.push(0);
    out.extend_from_slice(pixels);
    out.push(0);
}

/// Encode a list of `(row, pixels)` runs in the post format, terminated with
/// `POST_END`. Runs must be in increasing row order. Long runs are split and
/// rows past 254 are reached with relative posts.
pub fn encode_posts<'a>(runs: impl IntoIterator<Item = (usize, &'a [u8])>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut last: i32 = -1;
    for (row, pixels) in runs {
        let mut row = row as i32;
        for chunk in pixels.chunks(MAX_DELTA as usize) {
            loop {
                if row > last && row <= MAX_DELTA {
                    push_post(&mut out, row, chunk);
                    break;
                }
                if last >= 0 && row - last <= last.min(MAX_DELTA) {
                    push_post(&mut out, row - last, chunk);
                    break;
                }
                // Step forward with an empty post
                push_post(&mut out, MAX_DELTA, &[]);
                last = if last < MAX_DELTA {
                    MAX_DELTA
                } else {
                    last + MAX_DELTA
                };
            }
            last = row;
            row += chunk.len() as i32;
        }
    }
    out.push(POST_END);
    out
}

/// A patch is the basic picture format: a header, a table of column offsets,
/// then each column as a list of posts.
///
/// | Field Size | Data Type | Content                                    |
/// |------------|-----------|--------------------------------------------|
/// |  0x00-0x01 |    u16    | Width                                      |
/// |  0x02-0x03 |    u16    | Height                                     |
/// |  0x04-0x05 |    i16    | Left offset                                |
/// |  0x06-0x07 |    i16    | Top offset                                 |
/// |  0x08..    |  [u32; w] | Byte offset of each column from lump start |
///
/// The lump bytes are kept as-is and columns are handed out as slices of them.
#[derive(Debug, Clone)]
pub struct WadPatch {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub left_offset: i16,
    pub top_offset: i16,
    data: Vec<u8>,
    columns: Vec<Range<usize>>,
}

impl WadPatch {
    pub fn from_lump(name: &str, data: Vec<u8>) -> Result<Self, WadError> {
        let too_short = |needed: usize, len: usize| WadError::LumpTooShort {
            name: name.to_owned(),
            needed,
            len,
        };
        let (Some(width), Some(height), Some(left_offset), Some(top_offset)) = (
            get_u16(&data, 0),
            get_u16(&data, 2),
            get_i16(&data, 4),
            get_i16(&data, 6),
        ) else {
            return Err(too_short(8, data.len()));
        };

        let mut columns = Vec::with_capacity(width as usize);
        for x in 0..width as usize {
            let start = get_i32(&data, 8 + x * 4)
                .ok_or_else(|| too_short(8 + (x + 1) * 4, data.len()))?
                as u32 as usize;
            if start >= data.len() {
                return Err(too_short(start + 1, data.len()));
            }
            let end = column_end(&data, start);
            columns.push(start..end);
        }

        Ok(Self {
            name: name.to_owned(),
            width,
            height,
            left_offset,
            top_offset,
            data,
            columns,
        })
    }

    /// Encoded posts for column `x`, including the terminator
    #[inline]
    pub fn column_data(&self, x: usize) -> &[u8] {
        &self.data[self.columns[x].clone()]
    }

    #[inline]
    pub fn posts(&self, x: usize) -> PostIter<'_> {
        PostIter::new(self.column_data(x))
    }

    /// Build a patch lump from per column run lists
    pub fn encode(
        height: u16,
        left_offset: i16,
        top_offset: i16,
        columns: &[Vec<(usize, &[u8])>],
    ) -> Vec<u8> {
        let width = columns.len();
        let mut out = Vec::new();
        out.extend_from_slice(&(width as u16).to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&left_offset.to_le_bytes());
        out.extend_from_slice(&top_offset.to_le_bytes());
        let table = out.len();
        out.resize(table + width * 4, 0);
        for (x, runs) in columns.iter().enumerate() {
            let offset = out.len() as u32;
            out[table + x * 4..table + x * 4 + 4].copy_from_slice(&offset.to_le_bytes());
            out.extend(encode_posts(runs.iter().copied()));
        }
        out
    }
}

/// Scan forward to one past the terminator, or the end of the data when the
/// column is truncated
fn column_end(data: &[u8], start: usize) -> usize {
    let mut pos = start;
    while let Some(&top) = data.get(pos) {
        if top == POST_END {
            return pos + 1;
        }
        let Some(&len) = data.get(pos + 1) else {
            break;
        };
        pos += len as usize + 4;
    }
    data.len()
}

/// A patch placed in a composite texture.
///
/// | Field Size | Data Type | Content                     |
/// |------------|-----------|-----------------------------|
/// |  0x00-0x01 |    i16    | Origin X                    |
/// |  0x02-0x03 |    i16    | Origin Y                    |
/// |  0x04-0x05 |    i16    | Index in to `PNAMES`        |
/// |  0x06-0x07 |    i16    | Step dir, unused            |
/// |  0x08-0x09 |    i16    | Colourmap, unused           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadTexPatch {
    pub origin_x: i16,
    pub origin_y: i16,
    pub patch_index: i16,
}

pub const TEXPATCH_SIZE: usize = 10;
pub const TEXTURE_HEADER_SIZE: usize = 22;

/// A composite texture definition from `TEXTURE1`/`TEXTURE2`.
///
/// The lump starts with an `i32` count and that many `i32` offsets to each
/// entry. An entry is:
///
/// | Field Size | Data Type | Content                         |
/// |------------|-----------|---------------------------------|
/// |  0x00-0x07 |  8 ASCII  | Name                            |
/// |  0x08-0x0B |    i32    | Masked flag, unused             |
/// |  0x0C-0x0D |    i16    | Width                           |
/// |  0x0E-0x0F |    i16    | Height                          |
/// |  0x10-0x13 |    i32    | Column directory, unused        |
/// |  0x14-0x15 |    i16    | Patch count                     |
/// |  0x16..    |  [10; n]  | `WadTexPatch` records           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadTexture {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub patches: Vec<WadTexPatch>,
}

impl WadTexture {
    /// Parse entry `entry` of a texture directory lump
    pub(crate) fn from_directory(
        lump: &str,
        data: &[u8],
        entry: usize,
    ) -> Result<WadTexture, WadError> {
        let bad = || WadError::BadTextureDirectory {
            lump: lump.to_owned(),
            entry,
        };
        let offset = get_i32(data, 4 + entry * 4).ok_or_else(bad)?;
        if offset < 0 {
            return Err(bad());
        }
        let base = offset as usize;
        let header = data.get(base..base + TEXTURE_HEADER_SIZE).ok_or_else(bad)?;
        let name = lump_name(&header[0..8]);
        let width = get_i16(header, 12).ok_or_else(bad)?;
        let height = get_i16(header, 14).ok_or_else(bad)?;
        let count = get_i16(header, 20).ok_or_else(bad)?;
        if width <= 0 || height <= 0 || count < 0 {
            return Err(bad());
        }

        let mut patches = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let p = base + TEXTURE_HEADER_SIZE + i * TEXPATCH_SIZE;
            let rec = data.get(p..p + TEXPATCH_SIZE).ok_or_else(bad)?;
            patches.push(WadTexPatch {
                origin_x: i16::from_le_bytes([rec[0], rec[1]]),
                origin_y: i16::from_le_bytes([rec[2], rec[3]]),
                patch_index: i16::from_le_bytes([rec[4], rec[5]]),
            });
        }

        Ok(WadTexture {
            name,
            width: width as u16,
            height: height as u16,
            patches,
        })
    }

    /// Build a texture directory lump
    pub fn encode_directory(textures: &[WadTexture]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(textures.len() as i32).to_le_bytes());
        let table = out.len();
        out.resize(table + textures.len() * 4, 0);
        for (i, tex) in textures.iter().enumerate() {
            let offset = out.len() as i32;
            out[table + i * 4..table + i * 4 + 4].copy_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&name_bytes(&tex.name));
            out.extend_from_slice(&0i32.to_le_bytes());
            out.extend_from_slice(&(tex.width as i16).to_le_bytes());
            out.extend_from_slice(&(tex.height as i16).to_le_bytes());
            out.extend_from_slice(&0i32.to_le_bytes());
            out.extend_from_slice(&(tex.patches.len() as i16).to_le_bytes());
            for p in &tex.patches {
                out.extend_from_slice(&p.origin_x.to_le_bytes());
                out.extend_from_slice(&p.origin_y.to_le_bytes());
                out.extend_from_slice(&p.patch_index.to_le_bytes());
                out.extend_from_slice(&1i16.to_le_bytes());
                out.extend_from_slice(&0i16.to_le_bytes());
            }
        }
        out
    }
}

/// Build a `PNAMES` lump: an `i32` count then 8 byte names
pub fn encode_pnames(names: &[&str]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + names.len() * 8);
    out.extend_from_slice(&(names.len() as i32).to_le_bytes());
    for n in names {
        out.extend_from_slice(&name_bytes(n));
    }
    out
}

pub(crate) fn name_bytes(name: &str) -> [u8; 8] {
    let mut n = [0u8; 8];
    for (i, b) in name.bytes().take(8).enumerate() {
        n[i] = b.to_ascii_uppercase();
    }
    n
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WadColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl WadColour {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed as `0xAABBGGRR`, the byte order of an RGBA8 buffer read as LE
    #[inline]
    pub const fn to_rgba(self) -> u32 {
        0xFF00_0000 | (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }
}

/// One of the 14 palettes in `PLAYPAL`, 256 RGB triplets
#[derive(Debug, Clone)]
pub struct WadPalette(pub [WadColour; 256]);

pub const PALETTE_SIZE: usize = 256 * 3;

impl WadPalette {
    pub(crate) fn from_bytes(data: &[u8]) -> Self {
        let mut pal = [WadColour::default(); 256];
        for (c, rgb) in pal.iter_mut().zip(data.chunks_exact(3)) {
            *c = WadColour::new(rgb[0], rgb[1], rgb[2]);
        }
        Self(pal)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }
}

/// A 64x64 floor or ceiling picture, row major, with no header
#[derive(Debug, Clone)]
pub struct WadFlat {
    pub name: String,
    pub data: Vec<u8>,
}

pub const FLAT_SIZE: usize = 64 * 64;
