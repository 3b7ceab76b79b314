#[cfg(feature = "hprof")]
use coarse_prof::profile;
use math::FixedT;
use render_trait::{BufferSize, ColumnDraw, PixelBuffer, PlotColumn, PlotSpan, SpanDraw};
use wad::WadPalette;

use crate::PixelFormat;

/// A frame in memory. What a pixel is depends on `F`.
pub struct DrawBuffer<F: PixelFormat> {
    size: BufferSize,
    buffer: Vec<F::Pixel>,
    format: F,
}

impl<F: PixelFormat> DrawBuffer<F> {
    pub fn new(width: usize, height: usize, format: F) -> Self {
        Self {
            size: BufferSize::new(width, height),
            buffer: vec![F::Pixel::default(); width * height],
            format,
        }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn set_palette(&mut self, palette: &WadPalette) {
        self.format.set_palette(palette);
    }

    /// The stored pixels, row major
    pub fn pixels(&self) -> &[F::Pixel] {
        &self.buffer
    }

    #[inline(always)]
    fn put(&mut self, pos: usize, index: u8) {
        let px = self.format.from_index(index);
        #[cfg(feature = "safety_check")]
        {
            self.buffer[pos] = px;
        }
        #[cfg(not(feature = "safety_check"))]
        if let Some(p) = self.buffer.get_mut(pos) {
            *p = px;
        }
    }

    /// Clip a column to the buffer, returning the rows and the texture
    /// position of the first one
    #[inline]
    fn clip_column(&self, column: &ColumnDraw) -> Option<(i32, i32, FixedT)> {
        if !column.is_drawable() || column.x >= self.size.width_usize() {
            return None;
        }
        let mut frac = column.start_frac();
        let mut yl = column.yl;
        if yl < 0 {
            frac += column.iscale * -yl;
            yl = 0;
        }
        let yh = column.yh.min(self.size.height() - 1);
        if yl > yh {
            return None;
        }
        Some((yl, yh, frac))
    }
}

impl<F: PixelFormat> PixelBuffer for DrawBuffer<F> {
    #[inline(always)]
    fn size(&self) -> &BufferSize {
        &self.size
    }

    fn clear(&mut self) {
        self.buffer.fill(F::Pixel::default());
    }

    fn clear_with_colour(&mut self, index: u8) {
        let px = self.format.from_index(index);
        self.buffer.fill(px);
    }

    #[inline(always)]
    fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        #[cfg(feature = "safety_check")]
        if x >= self.size.width_usize() || y >= self.size.height_usize() {
            panic!("set_pixel out of bounds: {x}, {y}");
        }
        let pos = self.get_buf_index(x, y);
        self.put(pos, index);
    }

    /// Read the colour of a single pixel at X|Y
    #[inline]
    fn read_pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let pos = self.get_buf_index(x, y);
        self.buffer
            .get(pos)
            .map_or([0; 4], |p| self.format.to_rgba(*p))
    }

    #[inline(always)]
    fn pitch(&self) -> usize {
        self.size.width_usize()
    }

    #[inline(always)]
    fn get_buf_index(&self, x: usize, y: usize) -> usize {
        y * self.size.width_usize() + x
    }
}

impl<F: PixelFormat> PlotColumn for DrawBuffer<F> {
    fn plot_column(&mut self, column: &ColumnDraw) {
        let Some((yl, yh, mut frac)) = self.clip_column(column) else {
            return;
        };
        let pitch = self.pitch();
        let mut pos = self.get_buf_index(column.x, yl as usize);
        for _ in yl..=yh {
            self.put(pos, column.texel(frac));
            frac += column.iscale;
            pos += pitch;
        }
    }

    /// Writes the four columns a row at a time so each row touches one
    /// stretch of the buffer
    fn plot_columns4(&mut self, columns: &[ColumnDraw; 4]) {
        #[cfg(feature = "hprof")]
        profile!("plot_columns4");
        let mut clipped = [None; 4];
        let mut top = i32::MAX;
        let mut bottom = i32::MIN;
        for (c, out) in columns.iter().zip(clipped.iter_mut()) {
            if let Some((yl, yh, frac)) = self.clip_column(c) {
                top = top.min(yl);
                bottom = bottom.max(yh);
                *out = Some((yl, yh, frac));
            }
        }
        if top > bottom {
            return;
        }

        for y in top..=bottom {
            let row = y as usize * self.pitch();
            for (c, state) in columns.iter().zip(clipped.iter_mut()) {
                let Some((yl, yh, frac)) = state else {
                    continue;
                };
                if y < *yl || y > *yh {
                    continue;
                }
                let texel = c.texel(*frac);
                self.put(row + c.x, texel);
                *frac += c.iscale;
            }
        }
    }
}

impl<F: PixelFormat> PlotSpan for DrawBuffer<F> {
    fn plot_span(&mut self, span: &SpanDraw) {
        if span.y >= self.size.height_usize() || span.x1 > span.x2 {
            return;
        }
        let x2 = span.x2.min(self.size.width_usize() - 1);
        let mut xfrac = span.xfrac;
        let mut yfrac = span.yfrac;
        let mut pos = self.get_buf_index(span.x1, span.y);
        for _ in span.x1..=x2 {
            self.put(pos, span.texel(xfrac, yfrac));
            xfrac += span.xstep;
            yfrac += span.ystep;
            pos += 1;
        }
    }
}
