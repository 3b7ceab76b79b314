use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use std::{fmt, str};

use log::{debug, info};

use crate::WadError;

const HEADER_SIZE: usize = 12;
const DIR_ENTRY_SIZE: usize = 16;

/// Header which tells us the WAD type and where the data is
///
/// The header structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                              |
/// |------------|--------------|------------------------------------------------------|
/// | 0x00-0x03  | 4 ASCII char | *Must* be an ASCII string (either "IWAD" or "PWAD")  |
/// | 0x04-0x07  | unsigned int | The number entries in the directory                  |
/// | 0x08-0x0b  | unsigned int | Offset in bytes to the directory in the WAD file     |
///
struct WadHeader {
    /// Will be either `IWAD` for game, or `PWAD` for patch
    wad_type: [u8; 4],
    /// The count of "lumps" of data
    dir_count: u32,
    /// Offset in bytes that the lump data starts at
    dir_offset: u32,
}

impl fmt::Debug for WadHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nWadHeader {{\n  wad_type: {},\n  dir_count: {},\n  dir_offset: {},\n}}",
            String::from_utf8_lossy(&self.wad_type),
            self.dir_count,
            self.dir_offset
        )
    }
}

/// Contains the details for a lump of data: where it starts, the size of it,
/// the name, and which loaded file it lives in
///
/// The directory structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                                    |
/// |------------|--------------|------------------------------------------------------------|
/// | 0x00-0x03  | unsigned int | Offset value to the start of the lump data in the WAD file |
/// | 0x04-0x07  | unsigned int | The size of the lump in bytes                              |
/// | 0x08-0x0f  | 8 ASCII char | ASCII holding the name of the lump                         |
///
#[derive(Clone)]
pub struct LumpInfo {
    pub name: String,
    /// Index in to the loaded files
    pub file_handle: usize,
    /// The offset in bytes where the lump data starts
    pub offset: usize,
    /// The size in bytes of the lump referenced
    pub size: usize,
}

impl fmt::Debug for LumpInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nLumpInfo {{\n  name: {},\n  file_handle: {},\n  size: {},\n  offset: {},\n}}",
            &self.name, self.file_handle, self.size, self.offset
        )
    }
}

/// "Where's All (the) Data": the loaded WAD files in memory plus one merged
/// directory. Later files override earlier ones by name, the same way a PWAD
/// replaces IWAD lumps.
#[derive(Default)]
pub struct WadData {
    pub(crate) file_data: Vec<Vec<u8>>,
    lumps: Vec<LumpInfo>,
}

impl fmt::Debug for WadData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nWadData {{\n  files: {},\n  lumps: {},\n}}",
            self.file_data.len(),
            self.lumps.len()
        )
    }
}

impl WadData {
    /// Open and read the WAD at `file_path` in to memory
    pub fn new<P: AsRef<Path>>(file_path: P) -> Result<Self, WadError> {
        let mut wad = Self::default();
        wad.add_file(file_path)?;
        Ok(wad)
    }

    /// Build from a WAD image already in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WadError> {
        let mut wad = Self::default();
        wad.add_bytes(bytes)?;
        Ok(wad)
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file_path: P) -> Result<(), WadError> {
        let mut file = File::open(file_path.as_ref())?;
        let mut bytes = Vec::with_capacity(file.metadata()?.len() as usize);
        file.read_to_end(&mut bytes)?;
        info!("Read {:?}, {} bytes", file_path.as_ref(), bytes.len());
        self.add_bytes(bytes)
    }

    pub fn add_bytes(&mut self, bytes: Vec<u8>) -> Result<(), WadError> {
        let header = read_header(&bytes)?;
        debug!("{header:?}");
        let file_handle = self.file_data.len();
        let dir_start = header.dir_offset as usize;
        let dir_end = dir_start + header.dir_count as usize * DIR_ENTRY_SIZE;
        if dir_end > bytes.len() {
            return Err(WadError::DirectoryOutOfBounds);
        }

        self.lumps.reserve(header.dir_count as usize);
        for entry in bytes[dir_start..dir_end].chunks_exact(DIR_ENTRY_SIZE) {
            let offset = read_u32(entry, 0) as usize;
            let size = read_u32(entry, 4) as usize;
            let name = lump_name(&entry[8..16]);
            if offset + size > bytes.len() {
                return Err(WadError::LumpOutOfBounds { name, offset, size });
            }
            self.lumps.push(LumpInfo {
                name,
                file_handle,
                offset,
                size,
            });
        }
        self.file_data.push(bytes);
        Ok(())
    }

    pub fn lumps(&self) -> &[LumpInfo] {
        &self.lumps
    }

    /// Find the last lump with this name, so PWAD lumps win
    pub fn find_lump(&self, name: &str) -> Option<&LumpInfo> {
        self.lumps
            .iter()
            .rev()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn find_lump_or_err(&self, name: &str) -> Result<&LumpInfo, WadError> {
        self.find_lump(name)
            .ok_or_else(|| WadError::MissingLump(name.to_owned()))
    }

    pub fn lump_exists(&self, name: &str) -> bool {
        self.find_lump(name).is_some()
    }

    pub fn lump_data(&self, info: &LumpInfo) -> &[u8] {
        &self.file_data[info.file_handle][info.offset..info.offset + info.size]
    }

    pub fn get_lump(&self, name: &str) -> Option<&[u8]> {
        self.find_lump(name).map(|l| self.lump_data(l))
    }

    /// Every lump between the `start` and `end` markers of each loaded file,
    /// e.g `F_START`/`F_END`. Nested markers such as `F1_START` are skipped.
    pub fn lumps_between(&self, start: &str, end: &str) -> Vec<&LumpInfo> {
        let mut out = Vec::new();
        let mut inside = false;
        for lump in &self.lumps {
            if lump.name.eq_ignore_ascii_case(start) {
                inside = true;
                continue;
            }
            if lump.name.eq_ignore_ascii_case(end) {
                inside = false;
                continue;
            }
            if inside && lump.size > 0 {
                out.push(lump);
            }
        }
        out
    }
}

fn read_header(bytes: &[u8]) -> Result<WadHeader, WadError> {
    if bytes.len() < HEADER_SIZE {
        return Err(WadError::DirectoryOutOfBounds);
    }
    let mut wad_type = [0u8; 4];
    wad_type.copy_from_slice(&bytes[0..4]);
    if &wad_type != b"IWAD" && &wad_type != b"PWAD" {
        return Err(WadError::BadHeader(wad_type));
    }
    Ok(WadHeader {
        wad_type,
        dir_count: read_u32(bytes, 4),
        dir_offset: read_u32(bytes, 8),
    })
}

/// Lump names are 8 bytes, NUL padded
pub(crate) fn lump_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).to_ascii_uppercase()
}

#[inline]
pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Bounds checked little endian reads for lumps that may be truncated
#[inline]
pub(crate) fn get_i16(data: &[u8], offset: usize) -> Option<i16> {
    let b = data.get(offset..offset + 2)?;
    Some(i16::from_le_bytes([b[0], b[1]]))
}

#[inline]
pub(crate) fn get_u16(data: &[u8], offset: usize) -> Option<u16> {
    let b = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

#[inline]
pub(crate) fn get_i32(data: &[u8], offset: usize) -> Option<i32> {
    let b = data.get(offset..offset + 4)?;
    Some(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Assembles a WAD image in memory. Lumps are written in the order they are
/// added, followed by the directory.
#[derive(Debug)]
pub struct WadBuilder {
    wad_type: [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn iwad() -> Self {
        Self {
            wad_type: *b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        Self {
            wad_type: *b"PWAD",
            lumps: Vec::new(),
        }
    }

    pub fn lump(&mut self, name: &str, data: Vec<u8>) -> &mut Self {
        self.lumps.push((name.to_ascii_uppercase(), data));
        self
    }

    /// A zero sized marker lump such as `F_START`
    pub fn marker(&mut self, name: &str) -> &mut Self {
        self.lump(name, Vec::new())
    }

    pub fn build(&self) -> Vec<u8> {
        let data_len: usize = self.lumps.iter().map(|(_, d)| d.len()).sum();
        let dir_offset = HEADER_SIZE + data_len;
        let mut out = Vec::with_capacity(dir_offset + self.lumps.len() * DIR_ENTRY_SIZE);
        out.extend_from_slice(&self.wad_type);
        out.extend_from_slice(&(self.lumps.len() as u32).to_le_bytes());
        out.extend_from_slice(&(dir_offset as u32).to_le_bytes());

        let mut offsets = Vec::with_capacity(self.lumps.len());
        for (_, data) in &self.lumps {
            offsets.push(out.len());
            out.extend_from_slice(data);
        }
        for ((name, data), offset) in self.lumps.iter().zip(offsets) {
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            let mut n = [0u8; 8];
            for (i, b) in name.bytes().take(8).enumerate() {
                n[i] = b;
            }
            out.extend_from_slice(&n);
        }
        out
    }
}
