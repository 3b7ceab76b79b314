//! What the software renderer needs from whatever it draws in to. The renderer
//! only ever produces palette indices run through a colourmap; turning those
//! in to stored pixels is the buffer's business.

use math::{FixedT, FRACBITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSize {
    width_usize: usize,
    height_usize: usize,
    width: i32,
    height: i32,
}

impl BufferSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width_usize: width,
            height_usize: height,
            width: width as i32,
            height: height as i32,
        }
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn half_width(&self) -> i32 {
        self.width / 2
    }

    pub const fn half_height(&self) -> i32 {
        self.height / 2
    }

    pub const fn width_usize(&self) -> usize {
        self.width_usize
    }

    pub const fn height_usize(&self) -> usize {
        self.height_usize
    }

    pub const fn area(&self) -> usize {
        self.width_usize * self.height_usize
    }
}

pub trait PixelBuffer {
    fn size(&self) -> &BufferSize;
    fn clear(&mut self);
    /// Fill with one palette index
    fn clear_with_colour(&mut self, index: u8);
    /// Store a palette index at X|Y
    fn set_pixel(&mut self, x: usize, y: usize, index: u8);
    /// The RGBA colour at X|Y
    fn read_pixel(&self, x: usize, y: usize) -> [u8; 4];
    /// Elements to add/subtract to go up or down the Y while keeping X
    fn pitch(&self) -> usize;
    /// Get an index point for this coord
    fn get_buf_index(&self, x: usize, y: usize) -> usize;
}

/// A vertical run of a wall, sky or masked column at constant depth
#[derive(Debug, Clone, Copy)]
pub struct ColumnDraw<'a> {
    pub x: usize,
    /// First row, inclusive
    pub yl: i32,
    /// Last row, inclusive
    pub yh: i32,
    /// Texture rows, wrapped when sampled
    pub source: &'a [u8],
    pub colourmap: &'a [u8; 256],
    /// Texture row that lands on `centery`
    pub texturemid: FixedT,
    /// Texture rows per screen row
    pub iscale: FixedT,
    pub centery: i32,
}

impl ColumnDraw<'_> {
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.yl <= self.yh && !self.source.is_empty()
    }

    /// Texture position of the first row drawn
    #[inline]
    pub fn start_frac(&self) -> FixedT {
        self.texturemid + self.iscale * (self.yl - self.centery)
    }

    /// Palette index for the texture position `frac`, through the colourmap
    #[inline]
    pub fn texel(&self, frac: FixedT) -> u8 {
        let len = self.source.len();
        let row = frac.raw() >> FRACBITS;
        let row = if len.is_power_of_two() {
            row as usize & (len - 1)
        } else {
            row.rem_euclid(len as i32) as usize
        };
        self.colourmap[self.source[row] as usize]
    }
}

/// A horizontal run of a floor or ceiling flat
#[derive(Debug, Clone, Copy)]
pub struct SpanDraw<'a> {
    pub y: usize,
    pub x1: usize,
    /// Inclusive
    pub x2: usize,
    /// 64x64 flat, row major
    pub source: &'a [u8],
    pub colourmap: &'a [u8; 256],
    pub xfrac: FixedT,
    pub yfrac: FixedT,
    pub xstep: FixedT,
    pub ystep: FixedT,
}

impl SpanDraw<'_> {
    /// Palette index for the flat position, through the colourmap
    #[inline]
    pub fn texel(&self, xfrac: FixedT, yfrac: FixedT) -> u8 {
        let spot = ((yfrac.raw() >> (FRACBITS - 6)) & (63 * 64)) + ((xfrac.raw() >> FRACBITS) & 63);
        self.colourmap[self.source.get(spot as usize).copied().unwrap_or(0) as usize]
    }
}

/// Doom function name `R_DrawColumn`
pub trait PlotColumn {
    fn plot_column(&mut self, column: &ColumnDraw);

    /// Four columns handed over together so the target can write them row by
    /// row. Must give the same pixels as plotting each alone.
    fn plot_columns4(&mut self, columns: &[ColumnDraw; 4]) {
        for column in columns {
            self.plot_column(column);
        }
    }
}

/// Doom function name `R_DrawSpan`
pub trait PlotSpan {
    fn plot_span(&mut self, span: &SpanDraw);
}

/// Everything the renderer draws through
pub trait DrawTarget: PixelBuffer + PlotColumn + PlotSpan {}

impl<T: PixelBuffer + PlotColumn + PlotSpan> DrawTarget for T {}

#[cfg(test)]
mod tests {
    use math::FixedT;

    use crate::{BufferSize, ColumnDraw, SpanDraw};

    const IDENTITY: [u8; 256] = {
        let mut map = [0; 256];
        let mut i = 0;
        while i < 256 {
            map[i] = i as u8;
            i += 1;
        }
        map
    };

    #[test]
    fn buffer_size() {
        let size = BufferSize::new(320, 200);
        assert_eq!(size.half_width(), 160);
        assert_eq!(size.half_height(), 100);
        assert_eq!(size.area(), 64000);
    }

    #[test]
    fn column_wraps_non_power_of_two() {
        let source = [10, 11, 12];
        let col = ColumnDraw {
            x: 0,
            yl: 0,
            yh: 3,
            source: &source,
            colourmap: &IDENTITY,
            texturemid: FixedT::ZERO,
            iscale: FixedT::ONE,
            centery: 0,
        };
        assert_eq!(col.texel(FixedT::from_int(3)), 10);
        assert_eq!(col.texel(FixedT::from_int(-1)), 12);
        assert_eq!(col.start_frac(), FixedT::ZERO);
    }

    #[test]
    fn column_masks_power_of_two() {
        let source = [1, 2, 3, 4];
        let col = ColumnDraw {
            x: 0,
            yl: 2,
            yh: 5,
            source: &source,
            colourmap: &IDENTITY,
            texturemid: FixedT::from_int(1),
            iscale: FixedT::ONE,
            centery: 1,
        };
        assert_eq!(col.start_frac(), FixedT::from_int(2));
        assert_eq!(col.texel(FixedT::from_int(5)), 2);
    }

    #[test]
    fn empty_column_not_drawn() {
        let col = ColumnDraw {
            x: 0,
            yl: 0,
            yh: 3,
            source: &[],
            colourmap: &IDENTITY,
            texturemid: FixedT::ZERO,
            iscale: FixedT::ONE,
            centery: 0,
        };
        assert!(!col.is_drawable());
    }

    #[test]
    fn span_spot() {
        let flat: Vec<u8> = (0..4096).map(|i| (i / 64) as u8).collect();
        let span = SpanDraw {
            y: 0,
            x1: 0,
            x2: 0,
            source: &flat,
            colourmap: &IDENTITY,
            xfrac: FixedT::ZERO,
            yfrac: FixedT::ZERO,
            xstep: FixedT::ZERO,
            ystep: FixedT::ZERO,
        };
        // Row comes from yfrac, wrapping at 64
        assert_eq!(span.texel(FixedT::from_int(3), FixedT::from_int(5)), 5);
        assert_eq!(span.texel(FixedT::ZERO, FixedT::from_int(70)), 6);
    }
}
