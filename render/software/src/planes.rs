use std::collections::HashMap;

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::{debug, trace};
use math::{Bam, FixedT};
use pic_data::{PicData, LIGHTSEGSHIFT};
use render_trait::{ColumnDraw, DrawTarget, SpanDraw};

use crate::defs::{PlaneKey, Visplane, VisplaneId, VISPLANE_EMPTY};
use crate::level::ViewPoint;
use crate::utilities::{sin_cos, ViewTables, SKY_TEXTURE_MID};

/// Sky columns are indexed by the top bits of the view angle
const ANGLETOSKYSHIFT: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneState {
    /// Segs are still adding columns
    Accumulating,
    /// Drawn, nothing more happens until the next reset
    Flushed,
}

/// Owns every visplane of the frame. Planes live in a pool that only grows,
/// `active` of them are in use this frame.
pub struct VisplaneManager {
    planes: Vec<Visplane>,
    active: usize,
    /// Every plane made for a key this frame, oldest first
    lookup: HashMap<PlaneKey, Vec<VisplaneId>>,
    width: usize,
    state: PlaneState,
    spans: SpanState,
}

impl VisplaneManager {
    pub fn new(screen_width: usize, screen_height: usize, initial: usize) -> Self {
        let planes = (0..initial.max(1))
            .map(|_| Visplane::new(screen_width))
            .collect();
        Self {
            planes,
            active: 0,
            lookup: HashMap::new(),
            width: screen_width,
            state: PlaneState::Accumulating,
            spans: SpanState::new(screen_height),
        }
    }

    /// Doom function name `R_ClearPlanes`, plane part
    pub fn reset(&mut self) {
        self.active = 0;
        self.lookup.clear();
        self.state = PlaneState::Accumulating;
    }

    pub fn state(&self) -> PlaneState {
        self.state
    }

    /// Planes handed out this frame
    pub fn len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Pool size, grows on demand and is kept across frames
    pub fn capacity(&self) -> usize {
        self.planes.len()
    }

    #[inline]
    pub fn plane(&self, id: VisplaneId) -> &Visplane {
        &self.planes[id.0]
    }

    #[inline]
    pub fn plane_mut(&mut self, id: VisplaneId) -> &mut Visplane {
        &mut self.planes[id.0]
    }

    pub fn active(&self) -> &[Visplane] {
        &self.planes[..self.active]
    }

    fn new_plane(&mut self, key: PlaneKey) -> VisplaneId {
        if self.active == self.planes.len() {
            let size = self.planes.len() * 2;
            let width = self.width;
            self.planes.resize_with(size, || Visplane::new(width));
            debug!("Visplanes grown to {size}");
        }
        let id = VisplaneId(self.active);
        self.active += 1;
        self.planes[id.0].init(key);
        self.lookup.entry(key).or_default().push(id);
        id
    }

    /// Doom function name `R_FindPlane`. Sky planes all share one key, their
    /// height and light never show.
    pub fn find_plane(
        &mut self,
        mut height: FixedT,
        picnum: usize,
        mut lightlevel: i32,
        sky_num: usize,
    ) -> VisplaneId {
        if picnum == sky_num {
            height = FixedT::ZERO;
            lightlevel = 0;
        }
        let key = PlaneKey {
            height,
            picnum,
            lightlevel,
        };
        // The newest is the one most likely to sit next to the columns coming
        if let Some(id) = self.lookup.get(&key).and_then(|b| b.last()) {
            return *id;
        }
        self.new_plane(key)
    }

    /// Doom function name `R_CheckPlane`. Returns the plane to fill
    /// `start..=stop` into: the same one if the range can join it, otherwise a
    /// new plane with the same key.
    pub fn check_plane(&mut self, id: VisplaneId, start: i32, stop: i32) -> VisplaneId {
        let plane = &mut self.planes[id.0];
        if plane.is_empty() {
            plane.minx = start;
            plane.maxx = stop;
            return id;
        }

        let separated = start > plane.maxx + 1 || stop < plane.minx - 1;
        if !separated {
            let intrl = start.max(plane.minx);
            let intrh = stop.min(plane.maxx);
            if !(intrl..=intrh).any(|x| plane.is_filled(x)) {
                plane.minx = plane.minx.min(start);
                plane.maxx = plane.maxx.max(stop);
                return id;
            }
        }

        let key = plane.key();
        let new = self.new_plane(key);
        let plane = &mut self.planes[new.0];
        plane.minx = start;
        plane.maxx = stop;
        trace!("Split visplane {} into {}", id.0, new.0);
        new
    }

    /// Doom function name `R_DrawPlanes`. Draws every plane with columns and
    /// returns how many were drawn. Only the first call after a reset draws.
    pub fn flush(
        &mut self,
        view: &ViewPoint,
        tables: &ViewTables,
        pic_data: &PicData,
        target: &mut impl DrawTarget,
    ) -> usize {
        #[cfg(feature = "hprof")]
        profile!("flush_planes");
        if self.state == PlaneState::Flushed {
            trace!("Visplanes already flushed this frame");
            return 0;
        }
        self.state = PlaneState::Flushed;

        self.spans.begin(view, tables);
        let sky_num = pic_data.sky_num();
        let mut drawn = 0;
        for plane in self.planes[..self.active].iter_mut() {
            if plane.is_empty() {
                continue;
            }
            drawn += 1;
            if plane.picnum == sky_num {
                draw_sky(plane, view, tables, pic_data, target);
                continue;
            }
            plane.seal();
            self.spans.draw_plane(plane, view, tables, pic_data, target);
        }
        trace!("Flushed {drawn} of {} visplanes", self.active);
        drawn
    }
}

/// Sky is drawn as wall columns at a fixed distance, always full bright
fn draw_sky(
    plane: &Visplane,
    view: &ViewPoint,
    tables: &ViewTables,
    pic_data: &PicData,
    target: &mut impl DrawTarget,
) {
    let sky_pic = pic_data.sky_pic();
    let colourmap = pic_data.colourmap(0);
    for x in plane.minx..=plane.maxx {
        if !plane.is_filled(x) {
            continue;
        }
        let yl = plane.top(x) as i32;
        let yh = plane.bottom(x) as i32;
        if yl > yh {
            continue;
        }
        let angle = view.angle + tables.xtoviewangle[x as usize];
        let column = pic_data.wall_column(sky_pic, (angle.0 >> ANGLETOSKYSHIFT) as i32);
        target.plot_column(&ColumnDraw {
            x: x as usize,
            yl,
            yh,
            source: column.pixels,
            colourmap,
            texturemid: FixedT::from_int(SKY_TEXTURE_MID),
            iscale: tables.sky_iscale,
            centery: tables.centery,
        });
    }
}

/// Per row span starts and the distance caches of `R_MapPlane`
struct SpanState {
    spanstart: Vec<i32>,
    cachedheight: Vec<FixedT>,
    cacheddistance: Vec<FixedT>,
    cachedxstep: Vec<FixedT>,
    cachedystep: Vec<FixedT>,
    basexscale: FixedT,
    baseyscale: FixedT,
}

/// What stays the same for every span of one plane
struct PlaneSpans<'a> {
    planeheight: FixedT,
    light: i32,
    flat: &'a [u8],
}

impl SpanState {
    fn new(screen_height: usize) -> Self {
        Self {
            spanstart: vec![0; screen_height],
            cachedheight: vec![FixedT::ZERO; screen_height],
            cacheddistance: vec![FixedT::ZERO; screen_height],
            cachedxstep: vec![FixedT::ZERO; screen_height],
            cachedystep: vec![FixedT::ZERO; screen_height],
            basexscale: FixedT::ZERO,
            baseyscale: FixedT::ZERO,
        }
    }

    /// Left to right mapping for the view angle, and a clean distance cache
    fn begin(&mut self, view: &ViewPoint, tables: &ViewTables) {
        let len = tables.height.max(0) as usize;
        if self.spanstart.len() != len {
            *self = Self::new(len);
        }
        self.cachedheight.fill(FixedT::ZERO);
        self.cacheddistance.fill(FixedT::ZERO);
        self.cachedxstep.fill(FixedT::ZERO);
        self.cachedystep.fill(FixedT::ZERO);

        let (sin, cos) = sin_cos(view.angle - Bam::A90);
        self.basexscale = cos / tables.centerxfrac;
        self.baseyscale = -(sin / tables.centerxfrac);
    }

    fn draw_plane(
        &mut self,
        plane: &Visplane,
        view: &ViewPoint,
        tables: &ViewTables,
        pic_data: &PicData,
        target: &mut impl DrawTarget,
    ) {
        let spans = PlaneSpans {
            planeheight: (plane.height - view.viewz).abs(),
            light: (plane.lightlevel >> LIGHTSEGSHIFT) + view.extralight,
            flat: pic_data.get_flat(plane.picnum),
        };

        let top = |x: i32| plane.top(x) as i32;
        let bottom = |x: i32| plane.bottom(x) as i32;
        for x in plane.minx..=plane.maxx + 1 {
            self.make_spans(
                x,
                (top(x - 1), bottom(x - 1)),
                (top(x), bottom(x)),
                &spans,
                view,
                tables,
                pic_data,
                target,
            );
        }
    }

    /// Doom function name `R_MakeSpans`. Closes the rows column `x - 1` had
    /// that column `x` does not, and opens the ones `x` starts.
    #[allow(clippy::too_many_arguments)]
    fn make_spans(
        &mut self,
        x: i32,
        (mut t1, mut b1): (i32, i32),
        (mut t2, mut b2): (i32, i32),
        spans: &PlaneSpans,
        view: &ViewPoint,
        tables: &ViewTables,
        pic_data: &PicData,
        target: &mut impl DrawTarget,
    ) {
        // An empty column has top past every row
        if t1 == VISPLANE_EMPTY as i32 {
            b1 = -1;
        }
        if t2 == VISPLANE_EMPTY as i32 {
            b2 = -1;
        }

        while t1 < t2 && t1 <= b1 {
            self.map_plane(t1, x - 1, spans, view, tables, pic_data, target);
            t1 += 1;
        }
        while b1 > b2 && b1 >= t1 {
            self.map_plane(b1, x - 1, spans, view, tables, pic_data, target);
            b1 -= 1;
        }
        while t2 < t1 && t2 <= b2 {
            self.spanstart[t2 as usize] = x;
            t2 += 1;
        }
        while b2 > b1 && b2 >= t2 {
            self.spanstart[b2 as usize] = x;
            b2 -= 1;
        }
    }

    /// Doom function name `R_MapPlane`. Draws row `y` from its span start to
    /// `x2`.
    #[allow(clippy::too_many_arguments)]
    fn map_plane(
        &mut self,
        y: i32,
        x2: i32,
        spans: &PlaneSpans,
        view: &ViewPoint,
        tables: &ViewTables,
        pic_data: &PicData,
        target: &mut impl DrawTarget,
    ) {
        let row = y as usize;
        if row >= self.spanstart.len() {
            return;
        }
        let x1 = self.spanstart[row];
        if x2 < x1 || x1 < 0 {
            trace!("Bad span {x1}..{x2} at row {y}");
            return;
        }

        let (distance, xstep, ystep) = if spans.planeheight != self.cachedheight[row] {
            let distance = spans.planeheight * tables.yslope[row];
            let xstep = distance * self.basexscale;
            let ystep = distance * self.baseyscale;
            self.cachedheight[row] = spans.planeheight;
            self.cacheddistance[row] = distance;
            self.cachedxstep[row] = xstep;
            self.cachedystep[row] = ystep;
            (distance, xstep, ystep)
        } else {
            (
                self.cacheddistance[row],
                self.cachedxstep[row],
                self.cachedystep[row],
            )
        };

        let length = distance * tables.distscale[x1 as usize];
        let angle = view.angle + tables.xtoviewangle[x1 as usize];
        let (sin, cos) = sin_cos(angle);
        let xfrac = view.xy.x + cos * length;
        let yfrac = -view.xy.y - sin * length;

        let colourmap = pic_data.flat_light_colourmap(spans.light, distance.raw());
        target.plot_span(&SpanDraw {
            y: row,
            x1: x1 as usize,
            x2: x2 as usize,
            source: spans.flat,
            colourmap,
            xfrac,
            yfrac,
            xstep,
            ystep,
        });
    }
}
