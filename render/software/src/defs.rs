use std::fmt::Debug;

use math::FixedT;

pub const SIL_NONE: i32 = 0;
pub const SIL_BOTTOM: i32 = 1;
pub const SIL_TOP: i32 = 2;
pub const SIL_BOTH: i32 = 3;

/// Bits of `DrawSeg::tiers`
pub const TIER_TOP: u8 = 1;
pub const TIER_MID: u8 = 2;
pub const TIER_BOTTOM: u8 = 4;

/// Empty column marker in `Visplane::top`
pub const VISPLANE_EMPTY: u16 = 0xffff;

/// Where a draw seg's sprite clip comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilhouetteClip {
    /// Single sided or closed: nothing behind shows at all
    Solid,
    /// Start of the saved clip values in the openings pool, `[x1]` first
    Openings(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct DrawSeg {
    /// Index of the seg in the frame's seg list
    pub seg: usize,
    pub x1: i32,
    pub x2: i32,

    pub scale1: FixedT,
    pub scale2: FixedT,
    pub scalestep: FixedT,

    /// 0=none, 1=bottom, 2=top, 3=both
    pub silhouette: i32,
    /// Which of the upper, middle and lower textures the seg has. A masked
    /// middle counts as the middle tier.
    pub tiers: u8,

    /// do not clip sprites above this
    pub bsilheight: FixedT,

    /// do not clip sprites below this
    pub tsilheight: FixedT,

    /// Ceiling clip per column
    pub sprtopclip: Option<SilhouetteClip>,
    /// Floor clip per column
    pub sprbottomclip: Option<SilhouetteClip>,

    /// Start of the masked mid texture columns in the openings pool
    pub maskedtexturecol: Option<usize>,
}

impl DrawSeg {
    pub fn new(seg: usize) -> Self {
        DrawSeg {
            seg,
            x1: 0,
            x2: 0,
            scale1: FixedT::ZERO,
            scale2: FixedT::ZERO,
            scalestep: FixedT::ZERO,
            silhouette: SIL_NONE,
            tiers: 0,
            bsilheight: FixedT::ZERO,
            tsilheight: FixedT::ZERO,
            sprtopclip: None,
            sprbottomclip: None,
            maskedtexturecol: None,
        }
    }

    #[inline]
    pub fn has_tier(&self, tier: u8) -> bool {
        self.tiers & tier != 0
    }

    /// Openings pool index for column `x` of a range starting at `start`
    #[inline]
    pub fn opening_index(&self, start: usize, x: i32) -> usize {
        start + (x - self.x1) as usize
    }
}

/// The range of columns on the screen clipped against
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClipRange {
    /// Leftmost starting pixel/column
    pub first: i32,
    /// Rightmost ending pixel/column
    pub last: i32,
}

/// Handle to a visplane, valid until the next reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisplaneId(pub usize);

/// What makes two visplanes interchangeable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneKey {
    pub height: FixedT,
    pub picnum: usize,
    pub lightlevel: i32,
}

/// Now what is a visplane, anyway?
#[derive(Clone)]
pub struct Visplane {
    pub height: FixedT,
    pub picnum: usize,
    pub lightlevel: i32,
    pub minx: i32,
    pub maxx: i32,
    /// One entry of padding either side so spans can read `x - 1` and
    /// `maxx + 1`
    top: Vec<u16>,
    bottom: Vec<u16>,
}

impl Debug for Visplane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visplane")
            .field("height", &self.height)
            .field("picnum", &self.picnum)
            .field("lightlevel", &self.lightlevel)
            .field("minx", &self.minx)
            .field("maxx", &self.maxx)
            .finish_non_exhaustive()
    }
}

impl Visplane {
    pub fn new(screen_width: usize) -> Self {
        Visplane {
            height: FixedT::ZERO,
            picnum: 0,
            lightlevel: 0,
            minx: screen_width as i32,
            maxx: -1,
            top: vec![VISPLANE_EMPTY; screen_width + 2],
            bottom: vec![0; screen_width + 2],
        }
    }

    /// Take on a key with no columns
    pub(crate) fn init(&mut self, key: PlaneKey) {
        self.height = key.height;
        self.picnum = key.picnum;
        self.lightlevel = key.lightlevel;
        self.minx = self.top.len() as i32 - 2;
        self.maxx = -1;
        self.top.fill(VISPLANE_EMPTY);
    }

    pub fn key(&self) -> PlaneKey {
        PlaneKey {
            height: self.height,
            picnum: self.picnum,
            lightlevel: self.lightlevel,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx
    }

    /// Column `x` in -1..=width
    #[inline]
    pub fn top(&self, x: i32) -> u16 {
        self.top[(x + 1) as usize]
    }

    #[inline]
    pub fn bottom(&self, x: i32) -> u16 {
        self.bottom[(x + 1) as usize]
    }

    #[inline]
    pub fn is_filled(&self, x: i32) -> bool {
        self.top(x) != VISPLANE_EMPTY
    }

    #[inline]
    pub fn set_column(&mut self, x: i32, top: i32, bottom: i32) {
        self.top[(x + 1) as usize] = top as u16;
        self.bottom[(x + 1) as usize] = bottom as u16;
    }

    /// Close off the columns either side of the range for span building
    pub(crate) fn seal(&mut self) {
        if self.is_empty() {
            return;
        }
        // Padded index of minx - 1 and maxx + 1
        self.top[self.minx as usize] = VISPLANE_EMPTY;
        self.top[(self.maxx + 2) as usize] = VISPLANE_EMPTY;
    }
}

#[cfg(test)]
mod tests {
    use math::FixedT;

    use super::{PlaneKey, Visplane};

    #[test]
    fn default_vis_plane() {
        let mut plane = Visplane::new(320);
        assert!(plane.is_empty());
        plane.init(PlaneKey {
            height: FixedT::from_int(8),
            picnum: 3,
            lightlevel: 160,
        });
        assert!(plane.is_empty());
        assert!(!plane.is_filled(0));
        plane.set_column(0, 10, 20);
        assert!(plane.is_filled(0));
        assert_eq!(plane.bottom(0), 20);
        // Padding either side
        assert!(!plane.is_filled(-1));
        assert!(!plane.is_filled(320));
    }
}
