#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::{trace, warn};
use math::{point_to_angle, Bam};
use pic_data::PicData;
use render_trait::DrawTarget;

use crate::config::RenderConfig;
use crate::defs::ClipRange;
use crate::level::{Sector, Seg, ViewPoint};
use crate::masked::draw_masked_segs;
use crate::segs::WallRasterizer;
use crate::utilities::ViewTables;
use crate::{FrameInputs, FrameRenderContext};

/// Counters for one rendered frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Segs handed in
    pub segs: usize,
    /// Wall ranges drawn
    pub drawsegs: usize,
    /// Visplanes with columns that were drawn
    pub visplanes: usize,
    /// Draw segs with a see-through middle
    pub masked: usize,
    /// Openings values used
    pub openings: usize,
}

/// Drives one frame: sets up the planes for each sector, clips every seg
/// against the solid walls already drawn, then draws planes and masked
/// middles.
pub struct SoftwareRenderer {
    config: RenderConfig,
    tables: ViewTables,
    seg_renderer: WallRasterizer,
    ctx: FrameRenderContext,
}

impl SoftwareRenderer {
    pub fn new(width: usize, height: usize, config: RenderConfig) -> Self {
        Self {
            tables: ViewTables::new(width, height),
            seg_renderer: WallRasterizer::new(config.column_batching),
            ctx: FrameRenderContext::new(width, height, &config),
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_column_batching(&mut self, batching: bool) {
        self.config.column_batching = batching;
        self.seg_renderer.set_batching(batching);
    }

    pub fn tables(&self) -> &ViewTables {
        &self.tables
    }

    /// State left from the last frame, for inspection
    pub fn context(&self) -> &FrameRenderContext {
        &self.ctx
    }

    /// Render `segs`, ordered front to back, as seen from `view`
    pub fn render_frame(
        &mut self,
        view: &ViewPoint,
        sectors: &[Sector],
        segs: &[Seg],
        pic_data: &mut PicData,
        target: &mut impl DrawTarget,
    ) -> FrameStats {
        #[cfg(feature = "hprof")]
        profile!("render_frame");
        pic_data.set_view_width(self.tables.width as usize);
        prepare_textures(segs, pic_data);
        let pic_data: &PicData = pic_data;

        let Self {
            tables,
            seg_renderer,
            ctx,
            ..
        } = self;
        ctx.reset();
        let frame = FrameInputs {
            view,
            tables,
            sectors,
            segs,
            pic_data,
        };

        let sky_num = pic_data.sky_num();
        let mut current_sector = None;
        for (i, seg) in segs.iter().enumerate() {
            let back_ok = seg.backsector.is_none_or(|b| b < sectors.len());
            if seg.frontsector >= sectors.len() || !back_ok {
                warn!("Seg {i} references a missing sector, skipped");
                continue;
            }
            // Doom function name `R_Subsector`, plane part
            if current_sector != Some(seg.frontsector) {
                current_sector = Some(seg.frontsector);
                let front = &sectors[seg.frontsector];
                ctx.floorplane = (front.floorheight < view.viewz).then(|| {
                    ctx.planes
                        .find_plane(front.floorheight, front.floorpic, front.lightlevel, sky_num)
                });
                ctx.ceilingplane =
                    (front.ceilingheight > view.viewz || front.ceilingpic == sky_num).then(|| {
                        ctx.planes.find_plane(
                            front.ceilingheight,
                            front.ceilingpic,
                            front.lightlevel,
                            sky_num,
                        )
                    });
            }
            add_line(i, &frame, seg_renderer, ctx, target);
        }

        let visplanes = ctx.planes.flush(view, tables, pic_data, target);
        let masked = draw_masked_segs(&frame, ctx, target);

        let stats = FrameStats {
            segs: segs.len(),
            drawsegs: ctx.drawsegs.len(),
            visplanes,
            masked,
            openings: ctx.openings.len(),
        };
        trace!("{stats:?}");
        stats
    }
}

/// Composites must be resident before drawing starts, the frame only reads
fn prepare_textures(segs: &[Seg], pic_data: &mut PicData) {
    pic_data.begin_frame();
    pic_data.prepare_wall(pic_data.sky_pic());
    for seg in segs {
        let side = &seg.sidedef;
        for texture in [side.toptexture, side.midtexture, side.bottomtexture]
            .into_iter()
            .flatten()
        {
            pic_data.prepare_wall(texture);
        }
    }
}

/// Doom function name `R_AddLine`. Clips the seg to the view and passes the
/// columns it covers on as a solid or see-through range.
fn add_line(
    seg_index: usize,
    frame: &FrameInputs,
    seg_renderer: &mut WallRasterizer,
    ctx: &mut FrameRenderContext,
    target: &mut impl DrawTarget,
) {
    #[cfg(feature = "hprof")]
    profile!("add_line");
    let seg = &frame.segs[seg_index];
    let view = frame.view;
    let tables = frame.tables;

    let mut angle1 = point_to_angle(seg.v1.x - view.xy.x, seg.v1.y - view.xy.y);
    let mut angle2 = point_to_angle(seg.v2.x - view.xy.x, seg.v2.y - view.xy.y);

    // Clip to view edges.
    let span = angle1 - angle2;

    // Back side? I.e. backface culling?
    if span >= Bam::A180 {
        return;
    }

    // Global angle needed by segcalc.
    ctx.rw_angle1 = angle1;
    angle1 -= view.angle;
    angle2 -= view.angle;

    let clipangle = tables.clipangle;
    let mut tspan = angle1 + clipangle;
    if tspan > clipangle + clipangle {
        tspan -= clipangle + clipangle;
        // Totally off the left edge?
        if tspan >= span {
            return;
        }
        angle1 = clipangle;
    }
    tspan = clipangle - angle2;
    if tspan > clipangle + clipangle {
        tspan -= clipangle + clipangle;
        // Totally off the right edge?
        if tspan >= span {
            return;
        }
        angle2 = -clipangle;
    }

    // The seg is in the view range, but not necessarily visible.
    let x1 = tables.angle_to_x(angle1);
    let x2 = tables.angle_to_x(angle2);

    // Does not cross a pixel?
    if x1 == x2 {
        return;
    }

    let front = &frame.sectors[seg.frontsector];
    let Some(back) = seg.backsector.map(|b| &frame.sectors[b]) else {
        // Single sided line?
        clip_solid_seg(x1, x2 - 1, seg_index, frame, seg_renderer, ctx, target);
        return;
    };

    // Closed door.
    if back.ceilingheight <= front.floorheight || back.floorheight >= front.ceilingheight {
        clip_solid_seg(x1, x2 - 1, seg_index, frame, seg_renderer, ctx, target);
        return;
    }

    // Reject empty lines used for triggers and special events.
    // Identical floor and ceiling on both sides, identical light levels
    // on both sides, and no middle texture.
    if back.ceilingheight == front.ceilingheight
        && back.floorheight == front.floorheight
        && back.ceilingpic == front.ceilingpic
        && back.floorpic == front.floorpic
        && back.lightlevel == front.lightlevel
        && seg.sidedef.midtexture.is_none()
    {
        return;
    }

    // Window, or a change in floor or ceiling
    clip_pass_seg(x1, x2 - 1, seg_index, frame, seg_renderer, ctx, target);
}

/// Doom function name `R_ClipSolidWallSegment`. Draws the parts of
/// `first..=last` not already covered and adds the range to the solid list.
fn clip_solid_seg(
    first: i32,
    last: i32,
    seg_index: usize,
    frame: &FrameInputs,
    seg_renderer: &mut WallRasterizer,
    ctx: &mut FrameRenderContext,
    target: &mut impl DrawTarget,
) {
    // Find the first range that touches the range
    //  (adjacent pixels are touching).
    let mut start = 0;
    while ctx.solidsegs[start].last < first - 1 {
        start += 1;
    }

    if first < ctx.solidsegs[start].first {
        if last < ctx.solidsegs[start].first - 1 {
            // Post is entirely visible (above start),
            // so insert a new clippost.
            seg_renderer.store_wall_range(first, last, seg_index, frame, ctx, target);
            ctx.solidsegs.insert(start, ClipRange { first, last });
            return;
        }

        // There is a fragment above *start.
        let stop = ctx.solidsegs[start].first - 1;
        seg_renderer.store_wall_range(first, stop, seg_index, frame, ctx, target);
        // Now adjust the clip size.
        ctx.solidsegs[start].first = first;
    }

    // Bottom contained in start?
    if last <= ctx.solidsegs[start].last {
        return;
    }

    let mut next = start;
    while last >= ctx.solidsegs[next + 1].first - 1 {
        // There is a fragment between two posts.
        let from = ctx.solidsegs[next].last + 1;
        let to = ctx.solidsegs[next + 1].first - 1;
        seg_renderer.store_wall_range(from, to, seg_index, frame, ctx, target);
        next += 1;

        if last <= ctx.solidsegs[next].last {
            // Bottom is contained in next.
            // Adjust the clip size.
            ctx.solidsegs[start].last = ctx.solidsegs[next].last;
            crunch(&mut ctx.solidsegs, start, next);
            return;
        }
    }

    // There is a fragment after *next.
    let from = ctx.solidsegs[next].last + 1;
    seg_renderer.store_wall_range(from, last, seg_index, frame, ctx, target);
    // Adjust the clip size.
    ctx.solidsegs[start].last = last;
    crunch(&mut ctx.solidsegs, start, next);
}

/// Doom function name `R_ClipPassWallSegment`. Clips the given range of
/// columns, but does not include it in the clip list. Does handle windows,
/// e.g. LineDefs with upper and lower texture.
fn clip_pass_seg(
    first: i32,
    last: i32,
    seg_index: usize,
    frame: &FrameInputs,
    seg_renderer: &mut WallRasterizer,
    ctx: &mut FrameRenderContext,
    target: &mut impl DrawTarget,
) {
    // Find the first range that touches the range
    //  (adjacent pixels are touching).
    let mut start = 0;
    while ctx.solidsegs[start].last < first - 1 {
        start += 1;
    }

    if first < ctx.solidsegs[start].first {
        if last < ctx.solidsegs[start].first - 1 {
            // Post is entirely visible (above start).
            seg_renderer.store_wall_range(first, last, seg_index, frame, ctx, target);
            return;
        }

        // There is a fragment above *start.
        let stop = ctx.solidsegs[start].first - 1;
        seg_renderer.store_wall_range(first, stop, seg_index, frame, ctx, target);
    }

    // Bottom contained in start?
    if last <= ctx.solidsegs[start].last {
        return;
    }

    while last >= ctx.solidsegs[start + 1].first - 1 {
        // There is a fragment between two posts.
        let from = ctx.solidsegs[start].last + 1;
        let to = ctx.solidsegs[start + 1].first - 1;
        seg_renderer.store_wall_range(from, to, seg_index, frame, ctx, target);
        start += 1;

        if last <= ctx.solidsegs[start].last {
            return;
        }
    }

    // There is a fragment after *next.
    let from = ctx.solidsegs[start].last + 1;
    seg_renderer.store_wall_range(from, last, seg_index, frame, ctx, target);
}

/// Remove posts in between start and next. Start has been widened to cover
/// them.
fn crunch(solidsegs: &mut Vec<ClipRange>, start: usize, next: usize) {
    if next > start {
        solidsegs.drain(start + 1..=next);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use math::{Bam, FixedT, FixedVec2};
    use pic_data::PicData;
    use render_target::{DrawBuffer, Palettized};
    use render_trait::PixelBuffer;

    use super::{crunch, SoftwareRenderer};
    use crate::defs::{ClipRange, SilhouetteClip};
    use crate::level::{LineDefFlags, Sector, Seg, SideDef, ViewPoint};
    use crate::test_data::*;
    use crate::{RenderConfig, SIL_BOTTOM, TIER_BOTTOM, TIER_MID, TIER_TOP};

    const W: usize = 64;
    const H: usize = 32;
    const EMPTY: u8 = 255;

    fn wall(x: i32, half: i32, side: SideDef, front: usize, back: Option<usize>) -> Seg {
        Seg::new(
            FixedVec2::from_ints(x, half),
            FixedVec2::from_ints(x, -half),
            side,
            front,
            back,
        )
    }

    fn solid_side() -> SideDef {
        SideDef {
            midtexture: Some(WALL_TEX),
            ..SideDef::default()
        }
    }

    fn view() -> ViewPoint {
        ViewPoint::new(Vec2::ZERO, 41.0, Bam::ZERO)
    }

    fn buffer(pic_data: &PicData) -> DrawBuffer<Palettized> {
        let mut buf = DrawBuffer::new(W, H, Palettized::new(pic_data.palette()));
        buf.clear_with_colour(EMPTY);
        buf
    }

    /// Floor and ceiling both drop 8 units per step towards a far wall
    fn stairs() -> (Vec<Sector>, Vec<Seg>) {
        let sectors: Vec<Sector> = (0..6)
            .map(|i| Sector::new(-i * 8, 128 - i * 8, FLOOR_FLAT, CEIL_FLAT, 255))
            .collect();
        let step = SideDef {
            toptexture: Some(BRICK_TEX),
            ..SideDef::default()
        };
        let mut segs: Vec<Seg> = (0..5)
            .map(|i| wall(64 * (i as i32 + 1), 1024, step, i, Some(i + 1)))
            .collect();
        segs.push(wall(512, 1024, solid_side(), 5, None));
        (sectors, segs)
    }

    fn render(
        config: RenderConfig,
        sectors: &[Sector],
        segs: &[Seg],
    ) -> (SoftwareRenderer, Vec<u8>) {
        render_from(&view(), config, sectors, segs)
    }

    fn render_from(
        view: &ViewPoint,
        config: RenderConfig,
        sectors: &[Sector],
        segs: &[Seg],
    ) -> (SoftwareRenderer, Vec<u8>) {
        let mut pic_data = test_pic_data();
        let mut buf = buffer(&pic_data);
        let mut renderer = SoftwareRenderer::new(W, H, config);
        renderer.render_frame(view, sectors, segs, &mut pic_data, &mut buf);
        (renderer, buf.pixels().to_vec())
    }

    fn bands_side() -> SideDef {
        SideDef {
            midtexture: Some(BANDS_TEX),
            ..SideDef::default()
        }
    }

    /// Screen row `y` of the middle column
    fn middle(px: &[u8], y: usize) -> u8 {
        px[y * W + W / 2]
    }

    /// Wall 128 units ahead whose texture column 0 is 1040 units to the left,
    /// so the middle of the screen shows texture column 19 or so
    fn across(side: SideDef, front: usize, back: Option<usize>) -> Seg {
        Seg::new(
            FixedVec2::from_ints(128, 1040),
            FixedVec2::from_ints(128, -1024),
            side,
            front,
            back,
        )
    }

    fn banded_wall(side: SideDef, flags: u32, offset: i32) -> Seg {
        across(side, 0, None)
            .with_flags(flags)
            .with_offset(FixedT::from_int(offset))
    }

    #[test]
    fn closed_room_fills_screen() {
        let mut pic_data = test_pic_data();
        let mut buf = buffer(&pic_data);
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255)];
        let segs = [wall(512, 1024, solid_side(), 0, None)];

        let mut renderer = SoftwareRenderer::new(W, H, RenderConfig::default());
        let stats = renderer.render_frame(&view(), &sectors, &segs, &mut pic_data, &mut buf);
        assert_eq!(stats.drawsegs, 1);
        assert_eq!(stats.visplanes, 2);
        assert_eq!(stats.masked, 0);

        let px = buf.pixels();
        assert!(px.iter().all(|p| *p != EMPTY));
        let column: Vec<u8> = (0..H).map(|y| px[y * W + W / 2]).collect();
        assert_eq!(column[0], CEIL_PIXEL);
        assert_eq!(column[H / 2], WALL_PIXEL);
        assert_eq!(column[H - 1], FLOOR_PIXEL);
        // Ceiling, then wall, then floor with no gaps or repeats
        let mut runs = column.clone();
        runs.dedup();
        assert_eq!(runs, vec![CEIL_PIXEL, WALL_PIXEL, FLOOR_PIXEL]);

        let ds = &renderer.context().drawsegs[0];
        assert_eq!((ds.x1, ds.x2), (0, W as i32 - 1));
        assert_eq!(ds.sprtopclip, Some(SilhouetteClip::Solid));
        assert_eq!(ds.tiers, TIER_MID);
        // Everything is covered, the posts merged with both sentinels
        assert_eq!(renderer.context().solidsegs.len(), 1);
    }

    #[test]
    fn empty_frame_draws_nothing() {
        let mut pic_data = test_pic_data();
        let mut buf = buffer(&pic_data);
        let mut renderer = SoftwareRenderer::new(W, H, RenderConfig::default());
        let stats = renderer.render_frame(&view(), &[], &[], &mut pic_data, &mut buf);
        assert_eq!(stats.visplanes, 0);
        assert_eq!(stats.drawsegs, 0);
        assert!(buf.pixels().iter().all(|p| *p == EMPTY));
    }

    #[test]
    fn back_side_and_bad_sectors_are_skipped() {
        let mut pic_data = test_pic_data();
        let mut buf = buffer(&pic_data);
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255)];
        // Facing away from the view
        let reversed = Seg::new(
            FixedVec2::from_ints(512, -1024),
            FixedVec2::from_ints(512, 1024),
            solid_side(),
            0,
            None,
        );
        let missing = wall(512, 1024, solid_side(), 7, None);
        let mut renderer = SoftwareRenderer::new(W, H, RenderConfig::default());
        let stats =
            renderer.render_frame(&view(), &sectors, &[reversed, missing], &mut pic_data, &mut buf);
        assert_eq!(stats.drawsegs, 0);
        assert!(buf.pixels().iter().all(|p| *p == EMPTY));
    }

    #[test]
    fn floor_seen_twice_gets_two_planes() {
        // A pillar in a different light hides the middle of the far wall
        let sectors = [
            Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255),
            Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 200),
        ];
        let segs = [
            wall(256, 32, solid_side(), 1, None),
            wall(512, 1024, solid_side(), 0, None),
        ];
        let (renderer, px) = render(RenderConfig::default(), &sectors, &segs);
        assert!(px.iter().all(|p| *p != EMPTY));

        let ctx = renderer.context();
        // The far wall is drawn either side of the pillar
        assert_eq!(ctx.drawsegs.len(), 3);
        let floors: Vec<_> = ctx
            .planes
            .active()
            .iter()
            .filter(|p| p.picnum == FLOOR_FLAT && p.lightlevel == 255 && !p.is_empty())
            .collect();
        assert_eq!(floors.len(), 2);
        let (a, b) = (floors[0], floors[1]);
        assert_eq!(a.key(), b.key());
        assert!(a.maxx < b.minx || b.maxx < a.minx);
    }

    #[test]
    fn steps_leave_silhouettes() {
        let (sectors, segs) = stairs();
        let (renderer, px) = render(RenderConfig::default(), &sectors, &segs);
        assert!(px.iter().all(|p| *p != EMPTY));

        let ctx = renderer.context();
        assert_eq!(ctx.drawsegs.len(), 6);
        for ds in &ctx.drawsegs[..5] {
            assert_eq!(ds.silhouette & SIL_BOTTOM, SIL_BOTTOM);
            assert!(matches!(ds.sprbottomclip, Some(SilhouetteClip::Openings(_))));
            assert_eq!(ds.tiers, TIER_TOP);
        }
        assert_eq!(ctx.drawsegs[5].tiers, TIER_MID);
        // Clips never cross
        for x in 0..W as i32 {
            assert!(ctx.clip.ceiling(x) <= ctx.clip.floor(x), "column {x}");
        }
    }

    #[test]
    fn openings_growth_keeps_silhouettes() {
        let (sectors, segs) = stairs();
        let small = RenderConfig {
            initial_openings: 16,
            ..RenderConfig::default()
        };
        let (grown, grown_px) = render(small, &sectors, &segs);
        let (roomy, roomy_px) = render(RenderConfig::default(), &sectors, &segs);
        assert!(grown.context().openings.capacity() > 16);
        assert_eq!(grown_px, roomy_px);

        let clip_values = |r: &SoftwareRenderer| -> Vec<Vec<i16>> {
            let ctx = r.context();
            ctx.drawsegs
                .iter()
                .filter_map(|ds| match ds.sprbottomclip {
                    Some(SilhouetteClip::Openings(start)) => Some(
                        ctx.openings
                            .slice(start, (ds.x2 - ds.x1 + 1) as usize)
                            .to_vec(),
                    ),
                    _ => None,
                })
                .collect()
        };
        let a = clip_values(&grown);
        assert_eq!(a.len(), 5);
        assert_eq!(a, clip_values(&roomy));
        // The nearest step saved the floor clip of its whole range
        assert_eq!(a[0].len(), W);
    }

    #[test]
    fn batched_columns_match_single() {
        let (sectors, mut segs) = stairs();
        segs.insert(
            0,
            wall(
                48,
                1024,
                SideDef {
                    midtexture: Some(GRATE_TEX),
                    ..SideDef::default()
                },
                0,
                Some(0),
            ),
        );
        let batched = RenderConfig {
            column_batching: true,
            ..RenderConfig::default()
        };
        let (_, single) = render(RenderConfig::default(), &sectors, &segs);
        let (_, four) = render(batched, &sectors, &segs);
        assert_eq!(single, four);
    }

    #[test]
    fn masked_middle_shows_what_is_behind() {
        let sectors = [
            Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255),
            Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255),
        ];
        let grate = SideDef {
            midtexture: Some(GRATE_TEX),
            ..SideDef::default()
        };
        let segs = [
            wall(128, 1024, grate, 0, Some(1)),
            wall(512, 1024, solid_side(), 1, None),
        ];
        let (renderer, px) = render(RenderConfig::default(), &sectors, &segs);
        let stats_masked = renderer
            .context()
            .drawsegs
            .iter()
            .filter(|ds| ds.maskedtexturecol.is_some())
            .count();
        assert_eq!(stats_masked, 1);

        let at = |y: usize| px[y * W + W / 2];
        // Through the gap at the top of the grate to the ceiling
        assert_eq!(at(1), CEIL_PIXEL);
        assert_eq!(at(4), GRATE_PIXEL);
        // Below the grate is the far wall
        assert_eq!(at(14), WALL_PIXEL);

        // Every masked column was drawn once
        let ctx = renderer.context();
        let ds = ctx.drawsegs.iter().find(|ds| ds.maskedtexturecol.is_some()).unwrap();
        let start = ds.maskedtexturecol.unwrap();
        let cols = ctx.openings.slice(start, (ds.x2 - ds.x1 + 1) as usize);
        assert!(cols.iter().all(|c| *c == i16::MAX));
        assert!(ds.has_tier(TIER_MID));
        assert!(!ds.has_tier(TIER_TOP) && !ds.has_tier(TIER_BOTTOM));
    }

    #[test]
    fn untextured_solid_wall_still_closes() {
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255)];
        let segs = [
            wall(512, 1024, SideDef::default(), 0, None),
            wall(1024, 2048, solid_side(), 0, None),
        ];
        let (renderer, px) = render(RenderConfig::default(), &sectors, &segs);
        let ctx = renderer.context();
        for x in 0..W as i32 {
            assert!(ctx.clip.is_closed(x), "column {x}");
        }
        // Nothing drawn where the wall is and nothing seen past it
        assert_eq!(ctx.drawsegs.len(), 1);
        assert_eq!(ctx.drawsegs[0].tiers, 0);
        assert!(!px.contains(&WALL_PIXEL));
        assert_eq!(middle(&px, H / 2), EMPTY);
        assert_eq!(middle(&px, 0), CEIL_PIXEL);
        assert_eq!(middle(&px, H - 1), FLOOR_PIXEL);
    }

    #[test]
    fn middle_texture_pegging() {
        // Ceiling 96 and floor 0, the wall covers rows 3 to 26
        let sectors = [Sector::new(0, 96, FLOOR_FLAT, CEIL_FLAT, 255)];
        let upper = band_pixel(false, false);
        let lower = band_pixel(true, false);

        // Texture top at the ceiling, row 64 lands 32 units up
        let (_, px) = render(RenderConfig::default(), &sectors, &[banded_wall(bands_side(), 0, 0)]);
        assert_eq!(middle(&px, 5), upper);
        assert_eq!(middle(&px, 14), upper);
        assert_eq!(middle(&px, 22), lower);

        // Texture bottom at the floor, row 64 lands 64 units up
        let unpegged = banded_wall(bands_side(), LineDefFlags::UnpegBottom as u32, 0);
        let (_, px) = render(RenderConfig::default(), &sectors, &[unpegged]);
        assert_eq!(middle(&px, 5), upper);
        assert_eq!(middle(&px, 14), lower);
        assert_eq!(middle(&px, 22), lower);

        // Row offset moves the texture up
        let raised = SideDef {
            rowoffset: FixedT::from_int(32),
            ..bands_side()
        };
        let (_, px) = render(RenderConfig::default(), &sectors, &[banded_wall(raised, 0, 0)]);
        assert_eq!(middle(&px, 5), upper);
        assert_eq!(middle(&px, 14), lower);
    }

    #[test]
    fn column_offsets_add_up() {
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255)];
        let left = band_pixel(true, false);
        let right = band_pixel(true, true);
        let row = 14;

        let (_, px) = render(RenderConfig::default(), &sectors, &[banded_wall(bands_side(), 0, 0)]);
        assert_eq!(middle(&px, row), left);

        let shifted = SideDef {
            textureoffset: FixedT::from_int(32),
            ..bands_side()
        };
        let (_, px) = render(RenderConfig::default(), &sectors, &[banded_wall(shifted, 0, 0)]);
        assert_eq!(middle(&px, row), right);

        let (_, px) =
            render(RenderConfig::default(), &sectors, &[banded_wall(bands_side(), 0, 32)]);
        assert_eq!(middle(&px, row), right);

        // Both together go round the 64 wide texture
        let (_, px) = render(RenderConfig::default(), &sectors, &[banded_wall(shifted, 0, 32)]);
        assert_eq!(middle(&px, row), left);
    }

    #[test]
    fn upper_and_lower_pegging() {
        let far = |sector| wall(512, 1024, solid_side(), sector, None);
        let step = |side: SideDef, flags: u32| {
            across(side, 0, Some(1)).with_flags(flags | LineDefFlags::TwoSided as u32)
        };
        let upper = SideDef {
            toptexture: Some(BANDS_TEX),
            ..SideDef::default()
        };
        let lower = SideDef {
            bottomtexture: Some(BANDS_TEX),
            ..SideDef::default()
        };

        // Lower ceiling beyond, the upper tier covers rows 0 to 10
        let sectors = [
            Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255),
            Sector::new(0, 64, FLOOR_FLAT, CEIL_FLAT, 255),
        ];
        let (_, px) = render(RenderConfig::default(), &sectors, &[step(upper, 0), far(1)]);
        // Bottom of the texture sits on the lower ceiling
        assert_eq!(middle(&px, 5), band_pixel(true, false));
        let unpegged = step(upper, LineDefFlags::UnpegTop as u32);
        let (_, px) = render(RenderConfig::default(), &sectors, &[unpegged, far(1)]);
        assert_eq!(middle(&px, 5), band_pixel(false, false));

        // Raised floor beyond, the lower tier covers rows 19 to 26
        let sectors = [
            Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 255),
            Sector::new(32, 128, FLOOR_FLAT, CEIL_FLAT, 255),
        ];
        let (_, px) = render(RenderConfig::default(), &sectors, &[step(lower, 0), far(1)]);
        // Top of the texture sits on the raised floor
        assert_eq!(middle(&px, 22), band_pixel(false, false));
        let unpegged = step(lower, LineDefFlags::UnpegBottom as u32);
        let (_, px) = render(RenderConfig::default(), &sectors, &[unpegged, far(1)]);
        // Lined up with the front ceiling instead
        assert_eq!(middle(&px, 22), band_pixel(true, false));
    }

    #[test]
    fn walls_along_x_are_darker() {
        // Bright enough that walls along Y stay at full bright
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, CEIL_FLAT, 240)];
        let (_, px) = render(
            RenderConfig::default(),
            &sectors,
            &[wall(512, 1024, solid_side(), 0, None)],
        );
        assert_eq!(middle(&px, H / 2), WALL_PIXEL);

        let north = Seg::new(
            FixedVec2::from_ints(-1024, 512),
            FixedVec2::from_ints(1024, 512),
            solid_side(),
            0,
            None,
        );
        let facing_north = ViewPoint::new(Vec2::ZERO, 41.0, Bam::A90);
        let (_, px) = render_from(&facing_north, RenderConfig::default(), &sectors, &[north]);
        // Any colourmap past the first is a flat 200 plus the map number
        assert!(middle(&px, H / 2) > 200);
    }

    #[test]
    fn sky_ceiling_is_drawn_from_the_sky_texture() {
        let mut pic_data = test_pic_data();
        let sky = pic_data.sky_num();
        let mut buf = buffer(&pic_data);
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, sky, 255)];
        let segs = [wall(512, 1024, solid_side(), 0, None)];
        let mut renderer = SoftwareRenderer::new(W, H, RenderConfig::default());
        renderer.render_frame(&view(), &sectors, &segs, &mut pic_data, &mut buf);
        assert_eq!(buf.pixels()[W / 2], SKY_PIXEL);
        let plane = renderer
            .context()
            .planes
            .active()
            .iter()
            .find(|p| p.picnum == sky)
            .map(|p| (p.height, p.lightlevel));
        assert_eq!(plane, Some((FixedT::ZERO, 0)));
    }

    #[test]
    fn sky_texture_can_be_swapped() {
        let mut pic_data = test_pic_data();
        let sky = pic_data.sky_num();
        pic_data.set_sky_pic(WALL_TEX);
        let mut buf = buffer(&pic_data);
        let sectors = [Sector::new(0, 128, FLOOR_FLAT, sky, 255)];
        let segs = [wall(512, 1024, solid_side(), 0, None)];
        let mut renderer = SoftwareRenderer::new(W, H, RenderConfig::default());
        renderer.render_frame(&view(), &sectors, &segs, &mut pic_data, &mut buf);
        assert_eq!(buf.pixels()[W / 2], WALL_PIXEL);
        assert!(!buf.pixels().contains(&SKY_PIXEL));
    }

    #[test]
    fn crunch_merges_posts() {
        let mut posts = vec![
            ClipRange { first: -10, last: -1 },
            ClipRange { first: 0, last: 10 },
            ClipRange { first: 12, last: 20 },
            ClipRange { first: 22, last: 30 },
            ClipRange { first: 64, last: 100 },
        ];
        posts[1].last = 30;
        crunch(&mut posts, 1, 3);
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[1], ClipRange { first: 0, last: 30 });
        assert_eq!(posts[2].first, 64);
    }
}
