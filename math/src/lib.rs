//! Integer math used by the software renderer: 16.16 fixed point, binary angle
//! measurement and the fine trig tables that every column and span lookup is
//! driven by.

mod angle;
mod fixed_point;
mod trig;

use std::f32::consts::PI;

pub use angle::*;
pub use fixed_point::*;
pub use trig::*;

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// Convert a Doom `fixed_t` fixed-point float to `f32`
pub const fn fixed_to_float(value: i32) -> f32 {
    value as f32 / FRACUNIT as f32
}

/// Convert a `f32` to Doom `fixed_t`, truncating toward zero
pub const fn float_to_fixed(value: f32) -> i32 {
    (value * FRACUNIT as f32) as i32
}

const DEG_TO_RAD: f32 = PI / 180.0;

/// Convert a BAM (Binary Angle Measure) to radians
#[inline]
pub const fn bam_to_radian(value: u32) -> f32 {
    (value as f32 * 8.381_903e-8) * DEG_TO_RAD
}
