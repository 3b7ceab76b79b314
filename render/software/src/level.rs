//! The read-only level data the renderer is fed. Sectors are referenced by
//! index in to the slice handed to the frame, segs arrive already ordered
//! front to back.

use glam::Vec2;
use math::{point_to_angle, Bam, FixedT, FixedVec2};

/// The flags control some attributes of the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefFlags {
    /// The linedef's two sidedefs can have "-" as a texture
    TwoSided = 1 << 2,
    /// The upper texture is pasted onto the wall from
    /// the top down instead of from the bottom up like usual.
    UnpegTop = 1 << 3,
    /// Lower and middle textures are drawn from the
    /// bottom up, instead of from the top down like usual
    UnpegBottom = 1 << 4,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sector {
    pub floorheight: FixedT,
    pub ceilingheight: FixedT,
    /// Flat number, untranslated
    pub floorpic: usize,
    pub ceilingpic: usize,
    pub lightlevel: i32,
}

impl Sector {
    pub fn new(
        floor: i32,
        ceiling: i32,
        floorpic: usize,
        ceilingpic: usize,
        lightlevel: i32,
    ) -> Self {
        Self {
            floorheight: FixedT::from_int(floor),
            ceilingheight: FixedT::from_int(ceiling),
            floorpic,
            ceilingpic,
            lightlevel,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SideDef {
    pub textureoffset: FixedT,
    pub rowoffset: FixedT,
    /// Texture numbers, untranslated. `None` is the "-" texture
    pub toptexture: Option<usize>,
    pub bottomtexture: Option<usize>,
    pub midtexture: Option<usize>,
}

/// A wall fragment as produced by the BSP walk
#[derive(Debug, Clone, Copy)]
pub struct Seg {
    pub v1: FixedVec2,
    pub v2: FixedVec2,
    /// Distance along the linedef to the start of this seg
    pub offset: FixedT,
    pub angle: Bam,
    pub sidedef: SideDef,
    /// `LineDefFlags` of the owning line
    pub flags: u32,
    pub frontsector: usize,
    pub backsector: Option<usize>,
}

impl Seg {
    pub fn new(
        v1: FixedVec2,
        v2: FixedVec2,
        sidedef: SideDef,
        frontsector: usize,
        backsector: Option<usize>,
    ) -> Self {
        Self {
            v1,
            v2,
            offset: FixedT::ZERO,
            angle: point_to_angle(v2.x - v1.x, v2.y - v1.y),
            sidedef,
            flags: 0,
            frontsector,
            backsector,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_offset(mut self, offset: FixedT) -> Self {
        self.offset = offset;
        self
    }

    #[inline]
    pub fn has_flag(&self, flag: LineDefFlags) -> bool {
        self.flags & flag as u32 != 0
    }
}

/// Where the frame is seen from
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewPoint {
    pub xy: FixedVec2,
    /// Eye height in world units
    pub viewz: FixedT,
    pub angle: Bam,
    /// Added to every light level, e.g. from a gun flash
    pub extralight: i32,
}

impl ViewPoint {
    pub fn new(xy: Vec2, viewz: f32, angle: Bam) -> Self {
        Self {
            xy: xy.into(),
            viewz: viewz.into(),
            angle,
            extralight: 0,
        }
    }
}
