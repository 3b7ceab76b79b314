use log::warn;
use wad::{WadFlat, FLAT_SIZE};

/// A 64x64 floor/ceiling picture, row major
#[derive(Debug, Clone)]
pub struct FlatPic {
    pub name: String,
    pub data: Vec<u8>,
}

/// Flats by number, through a translation table that animation rewrites
#[derive(Debug)]
pub struct FlatProvider {
    flats: Vec<FlatPic>,
    translation: Vec<usize>,
    placeholder: Vec<u8>,
}

impl FlatProvider {
    pub fn new(flats: Vec<WadFlat>) -> Self {
        let flats: Vec<FlatPic> = flats
            .into_iter()
            .map(|f| FlatPic {
                name: f.name,
                data: f.data,
            })
            .collect();
        let translation = (0..flats.len()).collect();
        Self {
            flats,
            translation,
            placeholder: vec![0; FLAT_SIZE],
        }
    }

    pub fn num_flats(&self) -> usize {
        self.flats.len()
    }

    /// The pixels of whatever flat `num` currently translates to. Unknown
    /// numbers get a blank flat.
    #[inline]
    pub fn get_flat(&self, num: usize) -> &[u8] {
        match self.translation.get(num).and_then(|n| self.flats.get(*n)) {
            Some(flat) => &flat.data,
            None => {
                warn!("No flat {num}, drawing placeholder");
                &self.placeholder
            }
        }
    }

    pub fn flat(&self, num: usize) -> Option<&FlatPic> {
        self.flats.get(num)
    }

    pub fn flat_num_for_name(&self, name: &str) -> Option<usize> {
        self.flats
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Point `num` at flat `to`
    pub fn set_translation(&mut self, num: usize, to: usize) {
        if let Some(t) = self.translation.get_mut(num) {
            *t = to;
        }
    }

    pub fn translation(&self, num: usize) -> usize {
        self.translation.get(num).copied().unwrap_or(num)
    }

    pub fn reset_translation(&mut self) {
        for (i, t) in self.translation.iter_mut().enumerate() {
            *t = i;
        }
    }
}
