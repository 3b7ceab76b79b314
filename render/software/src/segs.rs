#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::warn;
use math::{finetangent, Bam, FixedT, FRACBITS};
use pic_data::LIGHTSEGSHIFT;
use render_trait::{ColumnDraw, DrawTarget};

use crate::defs::{
    DrawSeg, SilhouetteClip, SIL_BOTH, SIL_BOTTOM, SIL_NONE, SIL_TOP, TIER_BOTTOM, TIER_MID,
    TIER_TOP,
};
use crate::level::{LineDefFlags, Sector};
use crate::utilities::point_to_dist;
use crate::{FrameInputs, FrameRenderContext};

const HEIGHTBITS: i32 = 12;
const HEIGHTUNIT: i32 = 1 << HEIGHTBITS;

/// All of the state in this struct is unique to it as it is used once per seg
/// to be rendered.
pub(crate) struct WallRasterizer {
    /// Hand columns to the target in groups of four
    batching: bool,

    /// True if any of the segs textures might be visible.
    segtextured: bool,
    /// False if the back side is the same plane.
    markfloor: bool,
    markceiling: bool,
    maskedtexture: bool,
    /// No back sector, so every column closes once drawn
    single_sided: bool,
    /// Start of this seg's masked columns in the openings pool, `[rw_x]` first
    maskedtexturecol: Option<usize>,
    // Texture numbers of the tiers present, translated when drawn
    toptexture: Option<usize>,
    bottomtexture: Option<usize>,
    midtexture: Option<usize>,

    rw_normalangle: Bam,
    // regular wall
    rw_x: i32,
    rw_stopx: i32,
    rw_centerangle: Bam,
    rw_offset: FixedT,
    rw_distance: FixedT,
    rw_scale: FixedT,
    rw_scalestep: FixedT,
    rw_midtexturemid: FixedT,
    rw_toptexturemid: FixedT,
    rw_bottomtexturemid: FixedT,

    // Screen rows, fixed point with HEIGHTBITS of fraction
    pixhigh: i32,
    pixlow: i32,
    pixhighstep: i32,
    pixlowstep: i32,

    topfrac: i32,
    topstep: i32,
    bottomfrac: i32,
    bottomstep: i32,

    // World heights relative to the view, shifted down by 4
    worldtop: i32,
    worldbottom: i32,
    worldhigh: i32,
    worldlow: i32,

    /// Light table row for the wall
    wall_lights: i32,
}

impl WallRasterizer {
    pub fn new(batching: bool) -> Self {
        Self {
            batching,
            segtextured: false,
            markfloor: false,
            markceiling: false,
            maskedtexture: false,
            single_sided: false,
            maskedtexturecol: None,
            toptexture: None,
            bottomtexture: None,
            midtexture: None,
            rw_normalangle: Bam::ZERO,
            rw_x: 0,
            rw_stopx: 0,
            rw_centerangle: Bam::ZERO,
            rw_offset: FixedT::ZERO,
            rw_distance: FixedT::ZERO,
            rw_scale: FixedT::ZERO,
            rw_scalestep: FixedT::ZERO,
            rw_midtexturemid: FixedT::ZERO,
            rw_toptexturemid: FixedT::ZERO,
            rw_bottomtexturemid: FixedT::ZERO,
            pixhigh: 0,
            pixlow: 0,
            pixhighstep: 0,
            pixlowstep: 0,
            topfrac: 0,
            topstep: 0,
            bottomfrac: 0,
            bottomstep: 0,
            worldtop: 0,
            worldbottom: 0,
            worldhigh: 0,
            worldlow: 0,
            wall_lights: 0,
        }
    }

    pub fn set_batching(&mut self, batching: bool) {
        self.batching = batching;
    }

    /// Doom function name `R_StoreWallRange`. Draws the columns
    /// `start..=stop` of seg `seg_index` and records a draw seg for it.
    pub fn store_wall_range(
        &mut self,
        start: i32,
        stop: i32,
        seg_index: usize,
        frame: &FrameInputs,
        ctx: &mut FrameRenderContext,
        target: &mut impl DrawTarget,
    ) {
        #[cfg(feature = "hprof")]
        profile!("store_wall_range");
        let tables = frame.tables;
        if start < 0 || stop >= tables.width || start > stop {
            warn!("Bad wall range {start} to {stop}, skipped");
            return;
        }

        let seg = &frame.segs[seg_index];
        let view = frame.view;
        let pic_data = frame.pic_data;
        let sky_num = pic_data.sky_num();
        let sidedef = &seg.sidedef;
        let frontsector = &frame.sectors[seg.frontsector];
        let backsector: Option<&Sector> = seg.backsector.map(|b| &frame.sectors[b]);

        let mut ds = DrawSeg::new(seg_index);

        self.rw_normalangle = seg.angle + Bam::A90;
        let offsetangle = (self.rw_normalangle - ctx.rw_angle1)
            .signed()
            .unsigned_abs()
            .min(Bam::A90.0);
        let distangle = Bam::new(Bam::A90.0 - offsetangle);
        let hyp = point_to_dist(view.xy, seg.v1);
        self.rw_distance = hyp * distangle.sin();

        ds.x1 = start;
        ds.x2 = stop;
        self.rw_x = start;
        self.rw_stopx = stop + 1;

        let visangle = view.angle + tables.xtoviewangle[start as usize];
        self.rw_scale = tables.scale_from_global_angle(
            visangle,
            view.angle,
            self.rw_normalangle,
            self.rw_distance,
        );
        ds.scale1 = self.rw_scale;
        if stop > start {
            let visangle = view.angle + tables.xtoviewangle[stop as usize];
            ds.scale2 = tables.scale_from_global_angle(
                visangle,
                view.angle,
                self.rw_normalangle,
                self.rw_distance,
            );
            self.rw_scalestep = (ds.scale2 - self.rw_scale) / (stop - start);
            ds.scalestep = self.rw_scalestep;
        } else {
            ds.scale2 = ds.scale1;
            self.rw_scalestep = FixedT::ZERO;
        }

        // calculate texture boundaries
        //  and decide if floor / ceiling marks are needed
        let mut worldtop = frontsector.ceilingheight - view.viewz;
        let worldbottom = frontsector.floorheight - view.viewz;
        let mut worldhigh = FixedT::ZERO;
        let mut worldlow = FixedT::ZERO;

        self.midtexture = None;
        self.toptexture = None;
        self.bottomtexture = None;
        self.maskedtexture = false;
        self.maskedtexturecol = None;
        self.single_sided = backsector.is_none();

        match backsector {
            None => {
                // single sided line
                self.midtexture = sidedef.midtexture;
                self.markfloor = true;
                self.markceiling = true;
                self.rw_midtexturemid = match sidedef.midtexture {
                    Some(mid) if seg.has_flag(LineDefFlags::UnpegBottom) => {
                        let vtop = frontsector.floorheight
                            + FixedT::from_int(pic_data.wall_height(mid) as i32);
                        vtop - view.viewz
                    }
                    // top of texture at top
                    _ => worldtop,
                };
                self.rw_midtexturemid += sidedef.rowoffset;

                ds.silhouette = SIL_BOTH;
                ds.sprtopclip = Some(SilhouetteClip::Solid);
                ds.sprbottomclip = Some(SilhouetteClip::Solid);
                ds.bsilheight = FixedT::MAX;
                ds.tsilheight = FixedT::MIN;
            }
            Some(backsector) => {
                // two sided line
                ds.sprtopclip = None;
                ds.sprbottomclip = None;
                ds.silhouette = SIL_NONE;

                if frontsector.floorheight > backsector.floorheight {
                    ds.silhouette = SIL_BOTTOM;
                    ds.bsilheight = frontsector.floorheight;
                } else if backsector.floorheight > view.viewz {
                    ds.silhouette = SIL_BOTTOM;
                    ds.bsilheight = FixedT::MAX;
                }

                if frontsector.ceilingheight < backsector.ceilingheight {
                    ds.silhouette |= SIL_TOP;
                    ds.tsilheight = frontsector.ceilingheight;
                } else if backsector.ceilingheight < view.viewz {
                    ds.silhouette |= SIL_TOP;
                    ds.tsilheight = FixedT::MIN;
                }

                // closed door
                if backsector.ceilingheight <= frontsector.floorheight {
                    ds.sprbottomclip = Some(SilhouetteClip::Solid);
                    ds.bsilheight = FixedT::MAX;
                    ds.silhouette |= SIL_BOTTOM;
                }
                if backsector.floorheight >= frontsector.ceilingheight {
                    ds.sprtopclip = Some(SilhouetteClip::Solid);
                    ds.tsilheight = FixedT::MIN;
                    ds.silhouette |= SIL_TOP;
                }

                worldhigh = backsector.ceilingheight - view.viewz;
                worldlow = backsector.floorheight - view.viewz;

                // hack to allow height changes in outdoor areas
                if frontsector.ceilingpic == sky_num && backsector.ceilingpic == sky_num {
                    worldtop = worldhigh;
                }

                self.markfloor = worldlow != worldbottom
                    || backsector.floorpic != frontsector.floorpic
                    || backsector.lightlevel != frontsector.lightlevel;
                self.markceiling = worldhigh != worldtop
                    || backsector.ceilingpic != frontsector.ceilingpic
                    || backsector.lightlevel != frontsector.lightlevel;

                if backsector.ceilingheight <= frontsector.floorheight
                    || backsector.floorheight >= frontsector.ceilingheight
                {
                    self.markceiling = true;
                    self.markfloor = true;
                }

                if worldhigh < worldtop {
                    self.toptexture = sidedef.toptexture;
                    self.rw_toptexturemid = match sidedef.toptexture {
                        Some(top) if !seg.has_flag(LineDefFlags::UnpegTop) => {
                            let vtop = backsector.ceilingheight
                                + FixedT::from_int(pic_data.wall_height(top) as i32);
                            vtop - view.viewz
                        }
                        _ => worldtop,
                    };
                }

                if worldlow > worldbottom {
                    self.bottomtexture = sidedef.bottomtexture;
                    self.rw_bottomtexturemid = if seg.has_flag(LineDefFlags::UnpegBottom) {
                        worldtop
                    } else {
                        worldlow
                    };
                }

                self.rw_toptexturemid += sidedef.rowoffset;
                self.rw_bottomtexturemid += sidedef.rowoffset;

                if sidedef.midtexture.is_some() {
                    self.maskedtexture = true;
                    let start = ctx.openings.alloc((self.rw_stopx - self.rw_x) as usize);
                    self.maskedtexturecol = Some(start);
                    ds.maskedtexturecol = Some(start);
                }
            }
        }

        if self.toptexture.is_some() {
            ds.tiers |= TIER_TOP;
        }
        if self.midtexture.is_some() || self.maskedtexture {
            ds.tiers |= TIER_MID;
        }
        if self.bottomtexture.is_some() {
            ds.tiers |= TIER_BOTTOM;
        }

        self.segtextured = self.midtexture.is_some()
            || self.toptexture.is_some()
            || self.bottomtexture.is_some()
            || self.maskedtexture;

        // calculate rw_offset (only needed for textured lines)
        if self.segtextured {
            let mut offsetangle = self.rw_normalangle - ctx.rw_angle1;
            if offsetangle > Bam::A180 {
                offsetangle = -offsetangle;
            }
            if offsetangle > Bam::A90 {
                offsetangle = Bam::A90;
            }
            self.rw_offset = hyp * offsetangle.sin();
            if self.rw_normalangle - ctx.rw_angle1 < Bam::A180 {
                self.rw_offset = -self.rw_offset;
            }
            self.rw_offset += sidedef.textureoffset + seg.offset;
            self.rw_centerangle = Bam::A90 + view.angle - self.rw_normalangle;

            // Fake contrast, horizontal walls darker and vertical brighter
            let mut lightnum = (frontsector.lightlevel >> LIGHTSEGSHIFT) + view.extralight;
            if seg.v1.y == seg.v2.y {
                lightnum -= 1;
            } else if seg.v1.x == seg.v2.x {
                lightnum += 1;
            }
            self.wall_lights = lightnum;
        }

        // if a floor / ceiling plane is on the wrong side
        //  of the view plane, it is definitely invisible
        //  and doesn't need to be marked.
        if frontsector.floorheight >= view.viewz {
            // above view plane
            self.markfloor = false;
        }
        if frontsector.ceilingheight <= view.viewz && frontsector.ceilingpic != sky_num {
            // below view plane
            self.markceiling = false;
        }

        // calculate incremental stepping values for texture edges
        self.worldtop = worldtop.raw() >> 4;
        self.worldbottom = worldbottom.raw() >> 4;
        let centery = tables.centeryfrac.raw() >> 4;

        self.topstep = -height_mul(self.worldtop, self.rw_scalestep);
        self.topfrac = centery - height_mul(self.worldtop, self.rw_scale);
        self.bottomstep = -height_mul(self.worldbottom, self.rw_scalestep);
        self.bottomfrac = centery - height_mul(self.worldbottom, self.rw_scale);

        if backsector.is_some() {
            self.worldhigh = worldhigh.raw() >> 4;
            self.worldlow = worldlow.raw() >> 4;
            if self.worldhigh < self.worldtop {
                self.pixhigh = centery - height_mul(self.worldhigh, self.rw_scale);
                self.pixhighstep = -height_mul(self.worldhigh, self.rw_scalestep);
            }
            if self.worldlow > self.worldbottom {
                self.pixlow = centery - height_mul(self.worldlow, self.rw_scale);
                self.pixlowstep = -height_mul(self.worldlow, self.rw_scalestep);
            }
        }

        // render it
        if self.markceiling {
            ctx.ceilingplane = ctx
                .ceilingplane
                .map(|plane| ctx.planes.check_plane(plane, self.rw_x, self.rw_stopx - 1));
        }
        if self.markfloor {
            ctx.floorplane = ctx
                .floorplane
                .map(|plane| ctx.planes.check_plane(plane, self.rw_x, self.rw_stopx - 1));
        }

        self.render_seg_loop(frame, ctx, target);

        // save sprite clipping info
        if (ds.silhouette & SIL_TOP != 0 || self.maskedtexture) && ds.sprtopclip.is_none() {
            let start = ctx.openings.push_slice(ctx.clip.ceiling_range(start, stop));
            ds.sprtopclip = Some(SilhouetteClip::Openings(start));
        }
        if (ds.silhouette & SIL_BOTTOM != 0 || self.maskedtexture) && ds.sprbottomclip.is_none() {
            let start = ctx.openings.push_slice(ctx.clip.floor_range(start, stop));
            ds.sprbottomclip = Some(SilhouetteClip::Openings(start));
        }

        if self.maskedtexture && ds.silhouette & SIL_TOP == 0 {
            ds.silhouette |= SIL_TOP;
            ds.tsilheight = FixedT::MIN;
        }
        if self.maskedtexture && ds.silhouette & SIL_BOTTOM == 0 {
            ds.silhouette |= SIL_BOTTOM;
            ds.bsilheight = FixedT::MAX;
        }
        ctx.push_drawseg(ds);
    }

    /// Doom function name `R_RenderSegLoop`
    fn render_seg_loop(
        &mut self,
        frame: &FrameInputs,
        ctx: &mut FrameRenderContext,
        target: &mut impl DrawTarget,
    ) {
        let tables = frame.tables;
        let pic_data = frame.pic_data;
        let first = self.rw_x;
        let mut batch = ColumnBatch::new(self.batching);

        while self.rw_x < self.rw_stopx {
            let x = self.rw_x;

            let mut yl = (self.topfrac + HEIGHTUNIT - 1) >> HEIGHTBITS;
            // no space above wall?
            if yl < ctx.clip.ceiling(x) + 1 {
                yl = ctx.clip.ceiling(x) + 1;
            }

            if self.markceiling {
                if let Some(plane) = ctx.ceilingplane {
                    let top = ctx.clip.ceiling(x) + 1;
                    let bottom = (yl - 1).min(ctx.clip.floor(x) - 1);
                    if top <= bottom {
                        ctx.planes.plane_mut(plane).set_column(x, top, bottom);
                    }
                }
            }

            let mut yh = self.bottomfrac >> HEIGHTBITS;
            if yh >= ctx.clip.floor(x) {
                yh = ctx.clip.floor(x) - 1;
            }

            if self.markfloor {
                if let Some(plane) = ctx.floorplane {
                    let top = (yh + 1).max(ctx.clip.ceiling(x) + 1);
                    let bottom = ctx.clip.floor(x) - 1;
                    if top <= bottom {
                        ctx.planes.plane_mut(plane).set_column(x, top, bottom);
                    }
                }
            }

            let mut texturecolumn = 0;
            let mut iscale = FixedT::ZERO;
            if self.segtextured {
                let angle = self.rw_centerangle + tables.xtoviewangle[x as usize];
                let along = self.rw_offset - finetangent(angle.fine()) * self.rw_distance;
                texturecolumn = along.raw() >> FRACBITS;
                iscale = FixedT::new((u32::MAX / self.rw_scale.raw().max(1) as u32) as i32);
            }
            let colourmap = pic_data.wall_light_colourmap(self.wall_lights, self.rw_scale.raw());
            let column = |texture: usize, texturemid: FixedT, yl: i32, yh: i32| ColumnDraw {
                x: x as usize,
                yl,
                yh,
                source: pic_data.wall_column(texture, texturecolumn).pixels,
                colourmap,
                texturemid,
                iscale,
                centery: tables.centery,
            };

            if self.single_sided {
                if let Some(mid) = self.midtexture {
                    if yl <= yh {
                        batch.push(column(mid, self.rw_midtexturemid, yl, yh), target);
                    }
                }
                ctx.clip.close(x);
            } else {
                // two sided line
                if self.toptexture.is_some() || self.markceiling {
                    let mut top_edge = yl - 1;
                    if let Some(top) = self.toptexture {
                        let mut mid = self.pixhigh >> HEIGHTBITS;
                        self.pixhigh += self.pixhighstep;
                        if mid >= ctx.clip.floor(x) {
                            mid = ctx.clip.floor(x) - 1;
                        }
                        if mid >= yl {
                            batch.push(column(top, self.rw_toptexturemid, yl, mid), target);
                            top_edge = mid;
                        }
                    }
                    ctx.clip.clip_ceiling(x, top_edge);
                }

                if self.bottomtexture.is_some() || self.markfloor {
                    let mut bottom_edge = yh + 1;
                    if let Some(bottom) = self.bottomtexture {
                        let mut mid = (self.pixlow + HEIGHTUNIT - 1) >> HEIGHTBITS;
                        self.pixlow += self.pixlowstep;
                        // no space above wall?
                        if mid <= ctx.clip.ceiling(x) {
                            mid = ctx.clip.ceiling(x) + 1;
                        }
                        if mid <= yh {
                            batch.push(column(bottom, self.rw_bottomtexturemid, mid, yh), target);
                            bottom_edge = mid;
                        }
                    }
                    ctx.clip.clip_floor(x, bottom_edge);
                }

                if let Some(start) = self.maskedtexturecol {
                    // save texturecol for backdrawing of masked mid texture
                    ctx.openings
                        .set(start + (x - first) as usize, texturecolumn as i16);
                }
            }

            self.rw_x += 1;
            self.rw_scale += self.rw_scalestep;
            self.topfrac += self.topstep;
            self.bottomfrac += self.bottomstep;
        }
        batch.finish(target);
    }
}

/// `FixedMul` of a height shifted by 4 with a scale, staying in that unit
#[inline]
fn height_mul(height: i32, scale: FixedT) -> i32 {
    (FixedT::new(height) * scale).raw()
}

/// Collects wall columns so the target can write four at a time
struct ColumnBatch<'a> {
    enabled: bool,
    pending: [Option<ColumnDraw<'a>>; 4],
    len: usize,
}

impl<'a> ColumnBatch<'a> {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            pending: [None; 4],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, column: ColumnDraw<'a>, target: &mut impl DrawTarget) {
        if !self.enabled {
            target.plot_column(&column);
            return;
        }
        self.pending[self.len] = Some(column);
        self.len += 1;
        if let [Some(a), Some(b), Some(c), Some(d)] = self.pending {
            target.plot_columns4(&[a, b, c, d]);
            self.pending = [None; 4];
            self.len = 0;
        }
    }

    /// Anything short of a full group goes out one by one
    fn finish(&mut self, target: &mut impl DrawTarget) {
        for column in self.pending.iter_mut().filter_map(Option::take) {
            target.plot_column(&column);
        }
        self.len = 0;
    }
}
