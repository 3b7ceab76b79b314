//! A tiny picture set for renderer tests. Colourmap 0 is the identity so full
//! bright pixels read back as the texture's own palette index.

use pic_data::{PicData, COMPOSITE_CACHE_BYTES};
use wad::{encode_pnames, WadBuilder, WadData, WadPatch, WadTexPatch, WadTexture, FLAT_SIZE};

pub const WALL_TEX: usize = 0;
pub const SKY_TEX: usize = 1;
pub const GRATE_TEX: usize = 2;
/// Two patches side by side, needs compositing
pub const BRICK_TEX: usize = 3;
/// Quarters in four colours, see `band_pixel`
pub const BANDS_TEX: usize = 4;

pub const FLOOR_FLAT: usize = 0;
pub const CEIL_FLAT: usize = 1;

pub const WALL_PIXEL: u8 = 7;
pub const SKY_PIXEL: u8 = 9;
pub const GRATE_PIXEL: u8 = 12;
pub const FLOOR_PIXEL: u8 = 3;
pub const CEIL_PIXEL: u8 = 4;

/// `BANDS_TEX` pixel for texture rows 64 and on (`lower`) and texture
/// columns 32 and on (`right`)
pub fn band_pixel(lower: bool, right: bool) -> u8 {
    20 + 2 * lower as u8 + right as u8
}

fn solid_patch(width: usize, height: usize, pixels: &[u8]) -> Vec<u8> {
    let columns: Vec<Vec<(usize, &[u8])>> =
        (0..width).map(|_| vec![(0, &pixels[..height])]).collect();
    WadPatch::encode(height as u16, 0, 0, &columns)
}

fn bands_patch() -> Vec<u8> {
    let columns: Vec<Vec<u8>> = (0..64)
        .map(|x| (0..128).map(|y| band_pixel(y >= 64, x >= 32)).collect())
        .collect();
    let posts: Vec<Vec<(usize, &[u8])>> =
        columns.iter().map(|c| vec![(0, c.as_slice())]).collect();
    WadPatch::encode(128, 0, 0, &posts)
}

pub fn test_wad() -> WadData {
    let mut playpal = Vec::new();
    for _ in 0..14 {
        for i in 0..=255u8 {
            playpal.extend_from_slice(&[i, i, i]);
        }
    }
    // Identity at full bright, every darker map is one flat colour
    let mut colormap: Vec<u8> = (0..=255u8).collect();
    for level in 1..34u8 {
        colormap.extend(std::iter::repeat_n(200 + level, 256));
    }

    let wall = [WALL_PIXEL; 128];
    let sky = [SKY_PIXEL; 128];
    let grate_pixels = [GRATE_PIXEL; 16];
    // Opaque rows 0..16 and 32..48 only
    let grate_columns: Vec<Vec<(usize, &[u8])>> = (0..64)
        .map(|_| vec![(0, &grate_pixels[..]), (32, &grate_pixels[..])])
        .collect();

    let tex = |name: &str, width: u16, height: u16, patches: Vec<(i16, i16)>| WadTexture {
        name: name.to_owned(),
        width,
        height,
        patches: patches
            .into_iter()
            .map(|(patch_index, origin_x)| WadTexPatch {
                origin_x,
                origin_y: 0,
                patch_index,
            })
            .collect(),
    };
    let textures = vec![
        tex("STARTAN3", 64, 128, vec![(0, 0)]),
        tex("SKY1", 64, 128, vec![(1, 0)]),
        tex("MIDGRATE", 64, 64, vec![(2, 0)]),
        tex("BRICK", 64, 128, vec![(0, 0), (0, 32)]),
        tex("BANDS", 64, 128, vec![(3, 0)]),
    ];

    let bytes = WadBuilder::iwad()
        .lump("PLAYPAL", playpal)
        .lump("COLORMAP", colormap)
        .lump("PNAMES", encode_pnames(&["WALL00", "SKY00", "GRATE00", "BANDS00"]))
        .lump("TEXTURE1", WadTexture::encode_directory(&textures))
        .lump("WALL00", solid_patch(64, 128, &wall))
        .lump("SKY00", solid_patch(64, 128, &sky))
        .lump("GRATE00", WadPatch::encode(64, 0, 0, &grate_columns))
        .lump("BANDS00", bands_patch())
        .marker("F_START")
        .lump("FLOOR0_1", vec![FLOOR_PIXEL; FLAT_SIZE])
        .lump("CEIL1_1", vec![CEIL_PIXEL; FLAT_SIZE])
        .lump("F_SKY1", vec![SKY_PIXEL; FLAT_SIZE])
        .marker("F_END")
        .build();
    WadData::from_bytes(bytes).unwrap()
}

pub fn test_pic_data() -> PicData {
    PicData::init(&test_wad(), COMPOSITE_CACHE_BYTES).unwrap()
}
