use math::{
    finecosine, finesine, finetangent, tantoangle, Bam, FixedT, FixedVec2, ANGLETOFINESHIFT,
    DBITS, FINEANGLES, FRACBITS, FRACUNIT,
};

/// Fine angle covering the horizontal field of view, 90 degrees
const FIELDOFVIEW: usize = 2048;
/// Smallest scale a wall column can have
const MIN_SCALE: i32 = 256;
/// Largest scale a wall column can have
const MAX_SCALE: i32 = 64 * FRACUNIT;
/// Sky texture row at the centre of the view
pub const SKY_TEXTURE_MID: i32 = 100;

/// The per view size lookups, rebuilt whenever the view size changes
#[derive(Debug, Clone)]
pub struct ViewTables {
    pub width: i32,
    pub height: i32,
    pub centerx: i32,
    pub centery: i32,
    pub centerxfrac: FixedT,
    pub centeryfrac: FixedT,
    pub projection: FixedT,
    /// Screen column for each fine angle in the half circle
    pub viewangletox: Vec<i32>,
    /// View relative angle of each column, `width + 1` entries
    pub xtoviewangle: Vec<Bam>,
    /// The angle either side of the view centre that still shows
    pub clipangle: Bam,
    /// Distance factor per row for planes at one unit height
    pub yslope: Vec<FixedT>,
    /// Per column correction from centre distance to true distance
    pub distscale: Vec<FixedT>,
    /// Sky texture rows per screen row
    pub sky_iscale: FixedT,
}

impl ViewTables {
    /// Doom function name `R_ExecuteSetViewSize`
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1) as i32;
        let height = height.max(1) as i32;
        let centerx = width / 2;
        let centery = height / 2;
        let centerxfrac = FixedT::from_int(centerx);
        let centeryfrac = FixedT::from_int(centery);

        let (viewangletox, xtoviewangle) = init_texture_mapping(width, centerxfrac);
        let clipangle = xtoviewangle[0];

        let yslope = (0..height)
            .map(|i| {
                let dy = FixedT::new(((i - height / 2) << FRACBITS) + FRACUNIT / 2).abs();
                FixedT::from_int(width / 2) / dy
            })
            .collect();

        let distscale = xtoviewangle[..width as usize]
            .iter()
            .map(|a| FixedT::ONE / a.cos().abs())
            .collect();

        Self {
            width,
            height,
            centerx,
            centery,
            centerxfrac,
            centeryfrac,
            projection: centerxfrac,
            viewangletox,
            xtoviewangle,
            clipangle,
            yslope,
            distscale,
            sky_iscale: FixedT::new(FRACUNIT * 200 / height),
        }
    }

    /// Screen column of a view relative angle already clipped to the view
    #[inline]
    pub fn angle_to_x(&self, angle: Bam) -> i32 {
        self.viewangletox[(angle + Bam::A90).fine()]
    }

    /// Doom function name `R_ScaleFromGlobalAngle`. Scale of a wall at
    /// `distance` along its normal, seen at `visangle`.
    pub fn scale_from_global_angle(
        &self,
        visangle: Bam,
        view_angle: Bam,
        normal_angle: Bam,
        distance: FixedT,
    ) -> FixedT {
        let anglea = Bam::A90 + (visangle - view_angle);
        let angleb = Bam::A90 + (visangle - normal_angle);
        let sinea = anglea.sin();
        let sineb = angleb.sin();
        let num = self.projection * sineb;
        let den = distance * sinea;

        if den.raw() > num.raw() >> FRACBITS {
            let scale = (num / den).raw();
            FixedT::new(scale.clamp(MIN_SCALE, MAX_SCALE))
        } else {
            FixedT::new(MAX_SCALE)
        }
    }
}

/// Doom function name `R_InitTextureMapping`
fn init_texture_mapping(width: i32, centerxfrac: FixedT) -> (Vec<i32>, Vec<Bam>) {
    let focal = centerxfrac / finetangent(FINEANGLES / 4 + FIELDOFVIEW / 2);

    let mut viewangletox: Vec<i32> = (0..FINEANGLES / 2)
        .map(|i| {
            let tan = finetangent(i);
            if tan.raw() > FRACUNIT * 2 {
                -1
            } else if tan.raw() < -FRACUNIT * 2 {
                width + 1
            } else {
                let t = tan * focal;
                let t = (centerxfrac - t + FixedT::new(FRACUNIT - 1)).to_int();
                t.clamp(-1, width + 1)
            }
        })
        .collect();

    // The smallest angle that maps to each column
    let xtoviewangle = (0..=width)
        .map(|x| {
            let i = viewangletox.iter().position(|t| *t <= x).unwrap_or(FINEANGLES / 2);
            Bam::new(((i as u32) << ANGLETOFINESHIFT).wrapping_sub(Bam::A90.0))
        })
        .collect();

    // Take out the fencepost cases
    for t in viewangletox.iter_mut() {
        if *t == -1 {
            *t = 0;
        } else if *t == width + 1 {
            *t = width;
        }
    }
    (viewangletox, xtoviewangle)
}

/// Doom function name `R_PointToDist`
pub fn point_to_dist(view: FixedVec2, point: FixedVec2) -> FixedT {
    let mut dx = (point.x - view.x).abs();
    let mut dy = (point.y - view.y).abs();
    if dy > dx {
        std::mem::swap(&mut dx, &mut dy);
    }
    if dx == FixedT::ZERO {
        return FixedT::ZERO;
    }
    let slope = ((dy / dx).raw() >> DBITS) as usize;
    let angle = Bam::new(tantoangle(slope)) + Bam::A90;
    dx / angle.sin()
}

/// Fine sine and cosine of an angle, for plane texture stepping
#[inline]
pub fn sin_cos(angle: Bam) -> (FixedT, FixedT) {
    (finesine(angle.fine()), finecosine(angle.fine()))
}

#[cfg(test)]
mod tests {
    use math::{Bam, FixedT, FixedVec2, FRACUNIT};

    use super::{point_to_dist, ViewTables};

    #[test]
    fn texture_mapping_edges() {
        let t = ViewTables::new(320, 200);
        assert_eq!(t.xtoviewangle.len(), 321);
        // Left edge looks 45 degrees left, the centre straight ahead
        assert!((t.clipangle.to_degrees() - 45.0).abs() < 0.2);
        assert!(t.xtoviewangle[160].to_degrees() < 0.2 || t.xtoviewangle[160].to_degrees() > 359.8);
        // Columns run right to left in angle
        assert!(t.xtoviewangle[10].signed() > t.xtoviewangle[300].signed());
        assert_eq!(t.angle_to_x(Bam::ZERO), 160);
        assert_eq!(t.angle_to_x(t.clipangle), 0);
    }

    #[test]
    fn distances() {
        let view = FixedVec2::from_ints(0, 0);
        let d = point_to_dist(view, FixedVec2::from_ints(100, 0));
        assert!((d.raw() - 100 * FRACUNIT).abs() < FRACUNIT / 8);
        let d = point_to_dist(view, FixedVec2::from_ints(30, -40));
        assert!((d.raw() - 50 * FRACUNIT).abs() < FRACUNIT / 4);
        assert_eq!(point_to_dist(view, view), FixedT::ZERO);
    }

    #[test]
    fn scale_is_clamped() {
        let t = ViewTables::new(320, 200);
        // Straight on at 160 units the projection and distance cancel
        let s = t.scale_from_global_angle(Bam::ZERO, Bam::ZERO, Bam::ZERO, FixedT::from_int(160));
        assert!((s.raw() - FRACUNIT).abs() < 64);
        let s = t.scale_from_global_angle(Bam::ZERO, Bam::ZERO, Bam::ZERO, FixedT::new(1));
        assert_eq!(s.raw(), 64 * FRACUNIT);
        // Far away and nearly edge on
        let normal = Bam::A90 - Bam::new(0x0100_0000);
        let s = t.scale_from_global_angle(Bam::ZERO, Bam::ZERO, normal, FixedT::from_int(2000));
        assert_eq!(s.raw(), 256);
    }

    #[test]
    fn plane_slopes() {
        let t = ViewTables::new(320, 200);
        assert_eq!(t.yslope.len(), 200);
        assert_eq!(t.distscale.len(), 320);
        // Rows nearest the horizon are the furthest away
        assert!(t.yslope[100] > t.yslope[150]);
        assert!(t.distscale[0] > t.distscale[160]);
        assert_eq!(t.sky_iscale, FixedT::ONE);
    }
}
