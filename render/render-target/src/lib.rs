//! Pixel buffers the software renderer draws in to. A `DrawBuffer` is generic
//! over its `PixelFormat`: `Palettized` keeps the 8 bit palette indices,
//! `TrueColour` resolves them through the palette as they're written.

mod buffers;
mod format;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub use buffers::DrawBuffer;
pub use format::{Palettized, PixelFormat, TrueColour};
use log::info;
use render_trait::PixelBuffer;

/// Write any pixel buffer as a binary PPM (P6)
pub fn write_ppm(buffer: &impl PixelBuffer, out: &mut impl Write) -> io::Result<()> {
    let size = buffer.size();
    write!(out, "P6\n{} {}\n255\n", size.width(), size.height())?;
    let mut row = Vec::with_capacity(size.width_usize() * 3);
    for y in 0..size.height_usize() {
        row.clear();
        for x in 0..size.width_usize() {
            let [r, g, b, _] = buffer.read_pixel(x, y);
            row.extend_from_slice(&[r, g, b]);
        }
        out.write_all(&row)?;
    }
    Ok(())
}

pub fn save_ppm(buffer: &impl PixelBuffer, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_ppm(buffer, &mut out)?;
    out.flush()?;
    info!("Wrote {}", path.display());
    Ok(())
}
