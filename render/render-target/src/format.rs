use std::fmt::Debug;

use wad::WadPalette;

/// How a palette index is stored in a `DrawBuffer`
pub trait PixelFormat {
    type Pixel: Copy + Default + PartialEq + Debug;

    fn from_index(&self, index: u8) -> Self::Pixel;
    /// Colour of a stored pixel as RGBA
    fn to_rgba(&self, pixel: Self::Pixel) -> [u8; 4];
    /// Switch palette, e.g. for damage or pickup tints
    fn set_palette(&mut self, palette: &WadPalette);
}

/// 8 bit pixels, one palette index each. The palette is only applied when
/// reading out.
#[derive(Debug, Clone)]
pub struct Palettized {
    rgba: [[u8; 4]; 256],
}

impl Palettized {
    pub fn new(palette: &WadPalette) -> Self {
        let mut fmt = Self {
            rgba: [[0; 4]; 256],
        };
        fmt.set_palette(palette);
        fmt
    }
}

impl PixelFormat for Palettized {
    type Pixel = u8;

    #[inline(always)]
    fn from_index(&self, index: u8) -> u8 {
        index
    }

    #[inline]
    fn to_rgba(&self, pixel: u8) -> [u8; 4] {
        self.rgba[pixel as usize]
    }

    fn set_palette(&mut self, palette: &WadPalette) {
        for (out, c) in self.rgba.iter_mut().zip(palette.0.iter()) {
            *out = [c.r, c.g, c.b, 255];
        }
    }
}

/// 32 bit RGBA pixels, the palette is applied as each pixel is written
#[derive(Debug, Clone)]
pub struct TrueColour {
    lut: [u32; 256],
}

impl TrueColour {
    pub fn new(palette: &WadPalette) -> Self {
        let mut fmt = Self { lut: [0; 256] };
        fmt.set_palette(palette);
        fmt
    }
}

impl PixelFormat for TrueColour {
    type Pixel = u32;

    #[inline(always)]
    fn from_index(&self, index: u8) -> u32 {
        self.lut[index as usize]
    }

    #[inline]
    fn to_rgba(&self, pixel: u32) -> [u8; 4] {
        pixel.to_le_bytes()
    }

    fn set_palette(&mut self, palette: &WadPalette) {
        for (out, c) in self.lut.iter_mut().zip(palette.0.iter()) {
            *out = c.to_rgba();
        }
    }
}
