//! The fine trig tables. Generated once on first use with the same half-step
//! offsets the original tables were built with, so every lookup lands on the
//! value the column and span math expects.

use lazy_static::lazy_static;

use crate::{FixedT, FRACUNIT};

/// Size of the angle tables (fineangles)
pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
/// `angle_t >> ANGLETOFINESHIFT` gives a fine table index
pub const ANGLETOFINESHIFT: u32 = 19;

pub const SLOPERANGE: usize = 2048;
pub const SLOPEBITS: u32 = 11;
pub const DBITS: u32 = 16 - SLOPEBITS;

const TAU: f64 = std::f64::consts::PI * 2.0;

lazy_static! {
    /// `finesine`, with a quarter turn of overlap so `finecosine` can index
    /// straight in to it
    static ref FINESINE: Vec<i32> = (0..FINEANGLES * 5 / 4)
        .map(|i| {
            let a = (i as f64 + 0.5) * TAU / FINEANGLES as f64;
            (a.sin() * FRACUNIT as f64) as i32
        })
        .collect();

    /// `finetangent`, covering -90..+90 degrees
    static ref FINETANGENT: Vec<i32> = (0..FINEANGLES / 2)
        .map(|i| {
            let a = (i as f64 - FINEANGLES as f64 / 4.0 + 0.5) * TAU / FINEANGLES as f64;
            let t = a.tan() * FRACUNIT as f64;
            t.clamp(i32::MIN as f64, i32::MAX as f64) as i32
        })
        .collect();

    /// `tantoangle`, binary angle of `atan(i / SLOPERANGE)`
    static ref TANTOANGLE: Vec<u32> = (0..=SLOPERANGE)
        .map(|i| {
            let a = (i as f64 / SLOPERANGE as f64).atan();
            (a / TAU * 4294967296.0) as u32
        })
        .collect();
}

#[inline]
pub fn finesine(index: usize) -> FixedT {
    FixedT::new(FINESINE[index & FINEMASK])
}

#[inline]
pub fn finecosine(index: usize) -> FixedT {
    FixedT::new(FINESINE[(index & FINEMASK) + FINEANGLES / 4])
}

#[inline]
pub fn finetangent(index: usize) -> FixedT {
    FixedT::new(FINETANGENT[index & (FINEANGLES / 2 - 1)])
}

#[inline]
pub fn tantoangle(index: usize) -> u32 {
    TANTOANGLE[index.min(SLOPERANGE)]
}

/// Doom function name `SlopeDiv`
#[inline]
pub fn slope_div(num: u32, den: u32) -> usize {
    if den < 512 {
        return SLOPERANGE;
    }
    let ans = ((num as u64) << 3) / ((den >> 8) as u64);
    (ans as usize).min(SLOPERANGE)
}
