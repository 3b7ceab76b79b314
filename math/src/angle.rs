use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::trig::{finecosine, finesine, finetangent, slope_div, tantoangle, ANGLETOFINESHIFT};
use crate::FixedT;

pub const ANG45: u32 = 0x2000_0000;
pub const ANG90: u32 = 0x4000_0000;
pub const ANG180: u32 = 0x8000_0000;
pub const ANG270: u32 = 0xc000_0000;

/// Binary angle measurement. The full circle is the full `u32` range so all
/// arithmetic wraps for free.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bam(pub u32);

impl Bam {
    pub const ZERO: Bam = Bam(0);
    pub const A45: Bam = Bam(ANG45);
    pub const A90: Bam = Bam(ANG90);
    pub const A180: Bam = Bam(ANG180);
    pub const A270: Bam = Bam(ANG270);

    #[inline]
    pub const fn new(bam: u32) -> Self {
        Self(bam)
    }

    pub fn from_degrees(deg: f32) -> Self {
        let turns = (deg / 360.0).rem_euclid(1.0) as f64;
        Self((turns * 4294967296.0) as u64 as u32)
    }

    pub fn to_degrees(self) -> f32 {
        (self.0 as f64 / 4294967296.0 * 360.0) as f32
    }

    /// Index in to the fine tables
    #[inline]
    pub const fn fine(self) -> usize {
        (self.0 >> ANGLETOFINESHIFT) as usize
    }

    #[inline]
    pub fn sin(self) -> FixedT {
        finesine(self.fine())
    }

    #[inline]
    pub fn cos(self) -> FixedT {
        finecosine(self.fine())
    }

    /// Only meaningful for angles in -90..+90, as the tangent table covers
    /// that half circle
    #[inline]
    pub fn tan(self) -> FixedT {
        finetangent((self + Bam::A90).fine())
    }

    /// The angle as a signed quantity, used where Doom compares an
    /// `angle_t` difference against `ANG180`
    #[inline]
    pub const fn signed(self) -> i32 {
        self.0 as i32
    }
}

impl Add for Bam {
    type Output = Bam;

    #[inline]
    fn add(self, other: Bam) -> Bam {
        Bam(self.0.wrapping_add(other.0))
    }
}

impl AddAssign for Bam {
    #[inline]
    fn add_assign(&mut self, other: Bam) {
        self.0 = self.0.wrapping_add(other.0);
    }
}

impl Sub for Bam {
    type Output = Bam;

    #[inline]
    fn sub(self, other: Bam) -> Bam {
        Bam(self.0.wrapping_sub(other.0))
    }
}

impl SubAssign for Bam {
    #[inline]
    fn sub_assign(&mut self, other: Bam) {
        self.0 = self.0.wrapping_sub(other.0);
    }
}

impl Neg for Bam {
    type Output = Bam;

    #[inline]
    fn neg(self) -> Bam {
        Bam(self.0.wrapping_neg())
    }
}

/// Doom function name `R_PointToAngle2`. Angle of the vector `(dx, dy)`
/// resolved by octant through `tantoangle`.
pub fn point_to_angle(dx: FixedT, dy: FixedT) -> Bam {
    let x = dx.raw();
    let y = dy.raw();
    if x == 0 && y == 0 {
        return Bam::ZERO;
    }

    let ax = x.unsigned_abs();
    let ay = y.unsigned_abs();
    let a = if x >= 0 {
        if y >= 0 {
            if ax > ay {
                tantoangle(slope_div(ay, ax))
            } else {
                (ANG90 - 1).wrapping_sub(tantoangle(slope_div(ax, ay)))
            }
        } else if ax > ay {
            tantoangle(slope_div(ay, ax)).wrapping_neg()
        } else {
            ANG270.wrapping_add(tantoangle(slope_div(ax, ay)))
        }
    } else if y >= 0 {
        if ax > ay {
            (ANG180 - 1).wrapping_sub(tantoangle(slope_div(ay, ax)))
        } else {
            ANG90.wrapping_add(tantoangle(slope_div(ax, ay)))
        }
    } else if ax > ay {
        ANG180.wrapping_add(tantoangle(slope_div(ay, ax)))
    } else {
        (ANG270 - 1).wrapping_sub(tantoangle(slope_div(ax, ay)))
    };
    Bam(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Bam, b: u32) -> bool {
        a.0.wrapping_sub(b).min(b.wrapping_sub(a.0)) < 0x0020_0000
    }

    #[test]
    fn octants() {
        let one = FixedT::ONE;
        let zero = FixedT::ZERO;
        assert!(close(point_to_angle(one, zero), 0));
        assert!(close(point_to_angle(one, one), ANG45));
        assert!(close(point_to_angle(zero, one), ANG90));
        assert!(close(point_to_angle(-one, one), ANG90 + ANG45));
        assert!(close(point_to_angle(-one, zero), ANG180));
        assert!(close(point_to_angle(-one, -one), ANG180 + ANG45));
        assert!(close(point_to_angle(zero, -one), ANG270));
        assert!(close(point_to_angle(one, -one), ANG270 + ANG45));
        assert_eq!(point_to_angle(zero, zero), Bam::ZERO);
    }

    #[test]
    fn wrapping_ops() {
        let a = Bam::A270 + Bam::A180;
        assert_eq!(a, Bam::A90);
        assert_eq!(Bam::ZERO - Bam::A90, Bam::A270);
        assert_eq!(-Bam::A90, Bam::A270);
    }

    #[test]
    fn degrees_round_trip() {
        assert_eq!(Bam::from_degrees(90.0), Bam::A90);
        assert_eq!(Bam::from_degrees(-90.0), Bam::A270);
        assert!((Bam::A45.to_degrees() - 45.0).abs() < 0.001);
    }

    #[test]
    fn trig_through_bam() {
        assert!(Bam::A90.sin().raw() > 65530);
        assert!(Bam::ZERO.cos().raw() > 65530);
        assert!((Bam::A45.tan().raw() - 65536).abs() < 64);
    }
}
