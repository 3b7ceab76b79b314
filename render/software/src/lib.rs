//! Software renderer for walls, floors and ceilings. Segs arrive front to back
//! from an outside BSP walk, get clipped against what is already solid, and
//! are drawn column by column. Floors and ceilings are collected as visplanes
//! along the way and drawn as spans once every seg is done.

mod bsp;
mod config;
mod defs;
mod level;
mod masked;
mod openings;
mod planes;
mod portals;
mod segs;
#[cfg(test)]
mod test_data;
mod utilities;

pub use bsp::{FrameStats, SoftwareRenderer};
pub use config::RenderConfig;
pub use defs::{
    ClipRange, DrawSeg, PlaneKey, SilhouetteClip, Visplane, VisplaneId, SIL_BOTH, SIL_BOTTOM,
    SIL_NONE, SIL_TOP, TIER_BOTTOM, TIER_MID, TIER_TOP,
};
pub use level::{LineDefFlags, Sector, Seg, SideDef, ViewPoint};
pub use openings::OpeningsPool;
pub use planes::{PlaneState, VisplaneManager};
pub use portals::ClipState;
pub use utilities::ViewTables;

use log::debug;
use math::Bam;
use pic_data::PicData;

/// What one frame reads and never changes
#[derive(Clone, Copy)]
pub(crate) struct FrameInputs<'a> {
    pub view: &'a ViewPoint,
    pub tables: &'a ViewTables,
    pub sectors: &'a [Sector],
    pub segs: &'a [Seg],
    pub pic_data: &'a PicData,
}

/// Everything a frame writes to on its way through segs, planes and masked
/// walls. `reset` puts it back to an open screen for the next frame, the
/// backing storage is kept.
pub struct FrameRenderContext {
    pub clip: ClipState,
    pub openings: OpeningsPool,
    pub planes: VisplaneManager,
    /// Every wall range drawn this frame, in draw order
    pub drawsegs: Vec<DrawSeg>,
    /// Planes the current sector's walls mark, `None` when on the wrong side
    /// of the view
    pub floorplane: Option<VisplaneId>,
    pub ceilingplane: Option<VisplaneId>,
    /// Angle from the view to the first vertex of the current seg
    pub rw_angle1: Bam,
    /// Column ranges already covered by solid walls, with a sentinel each end
    pub solidsegs: Vec<ClipRange>,
    width: i32,
}

impl FrameRenderContext {
    pub fn new(screen_width: usize, screen_height: usize, config: &RenderConfig) -> Self {
        let mut ctx = Self {
            clip: ClipState::new(screen_width, screen_height),
            openings: OpeningsPool::new(config.initial_openings),
            planes: VisplaneManager::new(screen_width, screen_height, config.initial_visplanes),
            drawsegs: Vec::with_capacity(config.initial_drawsegs),
            floorplane: None,
            ceilingplane: None,
            rw_angle1: Bam::ZERO,
            solidsegs: Vec::with_capacity(32),
            width: screen_width as i32,
        };
        ctx.reset();
        ctx
    }

    /// Doom function names `R_ClearClipSegs`, `R_ClearDrawSegs` and
    /// `R_ClearPlanes`
    pub fn reset(&mut self) {
        self.clip.clear();
        self.openings.clear();
        self.planes.reset();
        self.drawsegs.clear();
        self.floorplane = None;
        self.ceilingplane = None;
        self.rw_angle1 = Bam::ZERO;

        self.solidsegs.clear();
        self.solidsegs.push(ClipRange {
            first: i32::MIN + 1,
            last: -1,
        });
        self.solidsegs.push(ClipRange {
            first: self.width,
            last: i32::MAX,
        });
    }

    pub(crate) fn push_drawseg(&mut self, ds: DrawSeg) {
        let capacity = self.drawsegs.capacity();
        self.drawsegs.push(ds);
        if self.drawsegs.capacity() != capacity {
            debug!("Drawsegs grown to {}", self.drawsegs.capacity());
        }
    }
}
