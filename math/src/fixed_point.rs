use glam::Vec2;

use crate::{fixed_to_float, float_to_fixed, FRACBITS, FRACUNIT};

/// A 16.16 fixed point number, the `fixed_t` of the renderer. Addition,
/// subtraction and negation wrap like the C arithmetic they replace, texture
/// and flat coordinates depend on it. Multiplication and division clamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedT(i32);

impl FixedT {
    pub const ZERO: FixedT = FixedT(0);
    pub const ONE: FixedT = FixedT(FRACUNIT);
    pub const MAX: FixedT = FixedT(i32::MAX);
    pub const MIN: FixedT = FixedT(i32::MIN);

    /// Wrap a raw `fixed_t` value
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Integer to fixed, `n << FRACBITS`
    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self(value << FRACBITS)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Fixed to integer, rounding toward negative infinity
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Doom function name `FixedMul`
    #[inline]
    pub const fn fixed_mul(self, rhs: FixedT) -> FixedT {
        let r = (self.0 as i64 * rhs.0 as i64) >> FRACBITS;
        if r > i32::MAX as i64 {
            Self(i32::MAX)
        } else if r < i32::MIN as i64 {
            Self(i32::MIN)
        } else {
            Self(r as i32)
        }
    }

    /// Doom function name `FixedDiv`. Overflowing quotients clamp to the
    /// signed extreme.
    #[inline]
    pub const fn fixed_div(self, rhs: FixedT) -> FixedT {
        let a = self.0 as i64;
        let b = rhs.0 as i64;
        if (a.abs() >> 14) >= b.abs() {
            return if (self.0 ^ rhs.0) < 0 {
                Self(i32::MIN)
            } else {
                Self(i32::MAX)
            };
        }
        Self(((a << FRACBITS) / b) as i32)
    }
}

impl std::ops::Add for FixedT {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl std::ops::Sub for FixedT {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl std::ops::AddAssign for FixedT {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl std::ops::SubAssign for FixedT {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl std::ops::Mul for FixedT {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: FixedT) -> Self::Output {
        self.fixed_mul(rhs)
    }
}

impl std::ops::Div for FixedT {
    type Output = Self;

    #[inline]
    fn div(self, rhs: FixedT) -> Self::Output {
        self.fixed_div(rhs)
    }
}

/// Scale by a plain integer, e.g. `step * (stop - start)`
impl std::ops::Mul<i32> for FixedT {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

/// Divide by a plain integer, e.g. `(scale2 - scale1) / (stop - start)`
impl std::ops::Div<i32> for FixedT {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i32) -> Self::Output {
        if rhs == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        Self(self.0 / rhs)
    }
}

impl std::ops::Shr<u32> for FixedT {
    type Output = Self;

    #[inline]
    fn shr(self, rhs: u32) -> Self::Output {
        Self(self.0 >> rhs)
    }
}

impl std::ops::Shl<u32> for FixedT {
    type Output = Self;

    #[inline]
    fn shl(self, rhs: u32) -> Self::Output {
        Self(self.0.wrapping_shl(rhs))
    }
}

impl std::ops::Neg for FixedT {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl From<f32> for FixedT {
    fn from(value: f32) -> Self {
        Self(float_to_fixed(value))
    }
}

impl From<i16> for FixedT {
    fn from(value: i16) -> Self {
        Self((value as i32) << FRACBITS)
    }
}

impl From<i32> for FixedT {
    fn from(value: i32) -> Self {
        Self(value << FRACBITS)
    }
}

impl From<FixedT> for f32 {
    fn from(value: FixedT) -> Self {
        fixed_to_float(value.0)
    }
}

impl From<FixedT> for i32 {
    fn from(value: FixedT) -> Self {
        value.0 >> FRACBITS
    }
}

/// A map vertex in fixed point world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedVec2 {
    pub x: FixedT,
    pub y: FixedT,
}

impl FixedVec2 {
    pub const fn new(x: FixedT, y: FixedT) -> Self {
        Self { x, y }
    }

    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: FixedT::from_int(x),
            y: FixedT::from_int(y),
        }
    }
}

impl From<Vec2> for FixedVec2 {
    fn from(v: Vec2) -> Self {
        Self {
            x: v.x.into(),
            y: v.y.into(),
        }
    }
}

impl From<FixedVec2> for Vec2 {
    fn from(v: FixedVec2) -> Self {
        Vec2::new(v.x.into(), v.y.into())
    }
}
