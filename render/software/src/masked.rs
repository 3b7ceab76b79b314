//! See-through middle textures of two sided lines. They are held back until
//! the planes are down and then drawn far to near, clipped by the silhouette
//! each draw seg saved.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::warn;
use math::{FixedT, FRACBITS, FRACUNIT};
use pic_data::LIGHTSEGSHIFT;
use render_trait::{ColumnDraw, DrawTarget};

use crate::defs::{DrawSeg, SilhouetteClip};
use crate::level::LineDefFlags;
use crate::{FrameInputs, FrameRenderContext};

/// Doom function name `R_DrawMasked`, wall part. Returns the number of draw
/// segs that had a masked middle.
pub(crate) fn draw_masked_segs(
    frame: &FrameInputs,
    ctx: &mut FrameRenderContext,
    target: &mut impl DrawTarget,
) -> usize {
    #[cfg(feature = "hprof")]
    profile!("draw_masked_segs");
    let mut count = 0;
    for i in (0..ctx.drawsegs.len()).rev() {
        let ds = ctx.drawsegs[i];
        if ds.maskedtexturecol.is_some() {
            render_masked_seg_range(&ds, ds.x1, ds.x2, frame, ctx, target);
            count += 1;
        }
    }
    count
}

/// Doom function name `R_RenderMaskedSegRange`
pub(crate) fn render_masked_seg_range(
    ds: &DrawSeg,
    x1: i32,
    x2: i32,
    frame: &FrameInputs,
    ctx: &mut FrameRenderContext,
    target: &mut impl DrawTarget,
) {
    let Some(cols) = ds.maskedtexturecol else {
        return;
    };
    let seg = &frame.segs[ds.seg];
    let (Some(texnum), Some(back)) = (seg.sidedef.midtexture, seg.backsector) else {
        warn!("Masked draw seg {} has no middle texture or back sector", ds.seg);
        return;
    };
    let view = frame.view;
    let tables = frame.tables;
    let pic_data = frame.pic_data;
    let frontsector = &frame.sectors[seg.frontsector];
    let backsector = &frame.sectors[back];

    let mut lightnum = (frontsector.lightlevel >> LIGHTSEGSHIFT) + view.extralight;
    if seg.v1.y == seg.v2.y {
        lightnum -= 1;
    } else if seg.v1.x == seg.v2.x {
        lightnum += 1;
    }

    // find positioning
    let mut texturemid = if seg.has_flag(LineDefFlags::UnpegBottom) {
        frontsector.floorheight.max(backsector.floorheight)
            + FixedT::from_int(pic_data.wall_height(texnum) as i32)
            - view.viewz
    } else {
        frontsector.ceilingheight.min(backsector.ceilingheight) - view.viewz
    };
    texturemid += seg.sidedef.rowoffset;

    let view_height = ctx.clip.view_height() as i32;
    let mut spryscale = ds.scale1 + ds.scalestep * (x1 - ds.x1);
    for x in x1..=x2 {
        let index = ds.opening_index(cols, x);
        let Some(texturecolumn) = ctx.openings.get(index) else {
            break;
        };
        if texturecolumn != i16::MAX {
            // Rows drawn must sit strictly between these
            let ceiling = match ds.sprtopclip {
                Some(SilhouetteClip::Openings(start)) => ctx
                    .openings
                    .get(ds.opening_index(start, x))
                    .map_or(-1, i32::from),
                Some(SilhouetteClip::Solid) => view_height,
                None => -1,
            };
            let floor = match ds.sprbottomclip {
                Some(SilhouetteClip::Openings(start)) => ctx
                    .openings
                    .get(ds.opening_index(start, x))
                    .map_or(view_height, i32::from),
                Some(SilhouetteClip::Solid) => -1,
                None => view_height,
            };

            let colourmap = pic_data.wall_light_colourmap(lightnum, spryscale.raw());
            let sprtopscreen = tables.centeryfrac - texturemid * spryscale;
            let iscale = FixedT::new((u32::MAX / spryscale.raw().max(1) as u32) as i32);
            let column = pic_data.wall_column(texnum, texturecolumn as i32);

            // Doom function name `R_DrawMaskedColumn`
            for post in column.posts() {
                let topscreen = sprtopscreen + spryscale * post.top;
                let bottomscreen = topscreen + spryscale * post.pixels.len() as i32;
                let yl = ((topscreen.raw() + FRACUNIT - 1) >> FRACBITS).max(ceiling + 1);
                let yh = ((bottomscreen.raw() - 1) >> FRACBITS).min(floor - 1);
                if yl <= yh {
                    target.plot_column(&ColumnDraw {
                        x: x as usize,
                        yl,
                        yh,
                        source: post.pixels,
                        colourmap,
                        texturemid: texturemid - FixedT::from_int(post.top),
                        iscale,
                        centery: tables.centery,
                    });
                }
            }
            ctx.openings.set(index, i16::MAX);
        }
        spryscale += ds.scalestep;
    }
}
