use std::marker::PhantomData;

use crate::lumps::*;
use crate::wad::{get_i32, lump_name};
use crate::{WadData, WadError};

/// Walks a lump made of fixed size records, handing each record's byte offset
/// to `transformer`
pub struct LumpIter<T, F: Fn(usize) -> T> {
    item_size: usize,
    item_count: usize,
    lump_offset: usize,
    current: usize,
    transformer: F,
    _phantom: PhantomData<T>,
}

impl<T, F> Iterator for LumpIter<T, F>
where
    F: Fn(usize) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.item_count {
            let offset = self.lump_offset + self.current * self.item_size;
            let item = (self.transformer)(offset);
            self.current += 1;
            return Some(item);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.item_count - self.current;
        (n, Some(n))
    }
}

impl WadData {
    /// The names in `PNAMES`, in index order
    pub fn pnames_iter(
        &self,
    ) -> Result<LumpIter<String, impl Fn(usize) -> String + '_>, WadError> {
        let data = self
            .get_lump("PNAMES")
            .ok_or_else(|| WadError::MissingLump("PNAMES".into()))?;
        let count = get_i32(data, 0).unwrap_or(0).max(0) as usize;
        let needed = 4 + count * 8;
        if data.len() < needed {
            return Err(WadError::LumpTooShort {
                name: "PNAMES".into(),
                needed,
                len: data.len(),
            });
        }
        Ok(LumpIter {
            item_size: 8,
            item_count: count,
            lump_offset: 4,
            current: 0,
            transformer: move |offset| lump_name(&data[offset..offset + 8]),
            _phantom: PhantomData,
        })
    }

    pub fn playpal_iter(
        &self,
    ) -> Result<LumpIter<WadPalette, impl Fn(usize) -> WadPalette + '_>, WadError> {
        let data = self
            .get_lump("PLAYPAL")
            .ok_or_else(|| WadError::MissingLump("PLAYPAL".into()))?;
        Ok(LumpIter {
            item_size: PALETTE_SIZE,
            item_count: data.len() / PALETTE_SIZE,
            lump_offset: 0,
            current: 0,
            transformer: move |offset| WadPalette::from_bytes(&data[offset..offset + PALETTE_SIZE]),
            _phantom: PhantomData,
        })
    }

    /// Each light level of `COLORMAP` as a 256 entry remap table
    pub fn colourmap_iter<'a>(
        &'a self,
    ) -> Result<LumpIter<&'a [u8], impl Fn(usize) -> &'a [u8] + 'a>, WadError> {
        let data = self
            .get_lump("COLORMAP")
            .ok_or_else(|| WadError::MissingLump("COLORMAP".into()))?;
        Ok(LumpIter {
            item_size: 256,
            item_count: data.len() / 256,
            lump_offset: 0,
            current: 0,
            transformer: move |offset| &data[offset..offset + 256],
            _phantom: PhantomData,
        })
    }

    /// Every texture in the named directory lump. A missing lump is an empty
    /// list since `TEXTURE2` only exists in some IWADs.
    pub fn texture_iter(&self, lump: &str) -> Result<Vec<WadTexture>, WadError> {
        let Some(data) = self.get_lump(lump) else {
            return Ok(Vec::new());
        };
        let count = get_i32(data, 0).ok_or_else(|| WadError::BadTextureDirectory {
            lump: lump.to_owned(),
            entry: 0,
        })?;
        if count < 0 {
            return Err(WadError::BadTextureDirectory {
                lump: lump.to_owned(),
                entry: 0,
            });
        }
        (0..count as usize)
            .map(|entry| WadTexture::from_directory(lump, data, entry))
            .collect()
    }

    /// All flats between `F_START`/`F_END`. PWADs that use `FF_START`/`FF_END`
    /// are included too.
    pub fn flats_iter(&self) -> impl Iterator<Item = WadFlat> + '_ {
        let mut lumps = self.lumps_between("F_START", "F_END");
        lumps.extend(self.lumps_between("FF_START", "FF_END"));
        lumps.into_iter().filter_map(move |info| {
            let data = self.lump_data(info);
            if data.len() < FLAT_SIZE {
                log::warn!("Flat {} is only {} bytes, skipping", info.name, data.len());
                return None;
            }
            Some(WadFlat {
                name: info.name.clone(),
                data: data[..FLAT_SIZE].to_vec(),
            })
        })
    }

    /// Load the patch named `name`, `None` if the WAD doesn't have it
    pub fn get_patch(&self, name: &str) -> Option<Result<WadPatch, WadError>> {
        let data = self.get_lump(name)?;
        Some(WadPatch::from_lump(name, data.to_vec()))
    }
}
