//! A small fixed level to look at: a square room with a sky overhead, a flight
//! of steps along the east side leading to a nukage pool, and a grate on the
//! west side. Segs are handed to the renderer nearest first, which for this
//! layout is what a BSP walk from the middle of the room would give.

use glam::Vec2;
use log::warn;
use math::FixedVec2;
use pic_data::PicData;
use render_soft::{LineDefFlags, Sector, Seg, SideDef};
use wad::{encode_pnames, WadBuilder, WadData, WadPatch, WadTexPatch, WadTexture, FLAT_SIZE};

const ROOM: i32 = 512;
/// Where each sector starts along X, the last one runs to the east wall
const STEPS: [i32; 4] = [-ROOM, 128, 192, 256];

pub struct Scene {
    pub sectors: Vec<Sector>,
    segs: Vec<Seg>,
}

impl Scene {
    /// Build the level with whatever the loaded textures and flats are called
    pub fn new(pic_data: &PicData) -> Self {
        let wall = wall_texture(pic_data, "STARTAN3");
        let step = wall_texture(pic_data, "BROWN1");
        let grate = wall_texture(pic_data, "MIDGRATE");
        let floor = flat(pic_data, "FLOOR4_8");
        let ceiling = flat(pic_data, "CEIL3_5");
        let nukage = flat(pic_data, "NUKAGE1");
        let sky = pic_data.sky_num();

        let mut sectors = vec![Sector::new(0, 192, floor, sky, 160)];
        for i in 1..STEPS.len() as i32 {
            let pic = if i == STEPS.len() as i32 - 1 { nukage } else { floor };
            sectors.push(Sector::new(i * 16, 160, pic, ceiling, 160 + i * 24));
        }

        let solid = SideDef {
            midtexture: Some(wall),
            ..SideDef::default()
        };
        let riser = SideDef {
            toptexture: Some(step),
            bottomtexture: Some(step),
            ..SideDef::default()
        };
        let see_through = SideDef {
            midtexture: Some(grate),
            ..SideDef::default()
        };

        let mut segs = Vec::new();
        for (i, x0) in STEPS.iter().copied().enumerate() {
            let x1 = STEPS.get(i + 1).copied().unwrap_or(ROOM);
            // North and south walls of this strip, front sides facing in
            segs.push(Seg::new(point(x0, ROOM), point(x1, ROOM), solid, i, None));
            segs.push(Seg::new(point(x1, -ROOM), point(x0, -ROOM), solid, i, None));
            if i > 0 {
                segs.push(
                    Seg::new(point(x0, ROOM), point(x0, -ROOM), riser, i - 1, Some(i))
                        .with_flags(LineDefFlags::TwoSided as u32),
                );
            }
        }
        segs.push(Seg::new(point(ROOM, ROOM), point(ROOM, -ROOM), solid, STEPS.len() - 1, None));
        segs.push(Seg::new(point(-ROOM, -ROOM), point(-ROOM, ROOM), solid, 0, None));
        segs.push(
            Seg::new(point(-256, -128), point(-256, 128), see_through, 0, Some(0))
                .with_flags(LineDefFlags::TwoSided as u32),
        );

        Self { sectors, segs }
    }

    /// Segs sorted nearest first as seen from `from`
    pub fn ordered_segs(&self, from: Vec2) -> Vec<Seg> {
        let mut segs = self.segs.clone();
        segs.sort_by(|a, b| distance_to(a, from).total_cmp(&distance_to(b, from)));
        segs
    }
}

fn point(x: i32, y: i32) -> FixedVec2 {
    FixedVec2::from_ints(x, y)
}

fn distance_to(seg: &Seg, from: Vec2) -> f32 {
    let v1: Vec2 = seg.v1.into();
    let v2: Vec2 = seg.v2.into();
    let line = v2 - v1;
    let t = ((from - v1).dot(line) / line.length_squared().max(f32::EPSILON)).clamp(0.0, 1.0);
    from.distance(v1 + line * t)
}

fn wall_texture(pic_data: &PicData, name: &str) -> usize {
    pic_data.wallpic_num_for_name(name).unwrap_or_else(|| {
        warn!("No texture named {name}, using the first one");
        0
    })
}

fn flat(pic_data: &PicData, name: &str) -> usize {
    pic_data.flats.flat_num_for_name(name).unwrap_or_else(|| {
        warn!("No flat named {name}, using the first one");
        0
    })
}

const HUES: [[u8; 3]; 8] = [
    [255, 255, 255],
    [190, 130, 70],
    [80, 255, 60],
    [255, 40, 30],
    [60, 80, 255],
    [230, 200, 150],
    [140, 200, 255],
    [255, 230, 50],
];
const SHADES: u8 = 32;
/// Spacing of the sky patches, each is 8 columns wider
const SKY_PART: usize = 64;

const GREY: u8 = 0;
const BROWN: u8 = 1;
const GREEN: u8 = 2;
const TAN: u8 = 5;
const SKY: u8 = 6;

/// Palette index for a hue at a brightness, 31 being the brightest
fn colour(hue: u8, shade: u8) -> u8 {
    hue * SHADES + shade.min(SHADES - 1)
}

/// Eight hues of 32 shades each. Colourmap N takes N shades off, 32 is the
/// grey invulnerability map and 33 is all black.
fn playpal_and_colormap() -> (Vec<u8>, Vec<u8>) {
    let mut palette = Vec::with_capacity(768);
    for rgb in HUES {
        for shade in 0..SHADES as u32 {
            palette.extend(rgb.iter().map(|c| (*c as u32 * (shade + 1) / SHADES as u32) as u8));
        }
    }
    let mut playpal = Vec::with_capacity(768 * 14);
    for _ in 0..14 {
        playpal.extend_from_slice(&palette);
    }

    let mut colormap = Vec::with_capacity(256 * 34);
    for level in 0..32u8 {
        colormap.extend(
            (0..=255u8).map(|i| colour(i / SHADES, (i % SHADES).saturating_sub(level))),
        );
    }
    colormap.extend((0..=255u8).map(|i| colour(GREY, i % SHADES)));
    colormap.extend(std::iter::repeat_n(0, 256));
    (playpal, colormap)
}

/// Encode a patch from a pixel function, `None` being transparent
fn patch(width: usize, height: usize, pixel: impl Fn(usize, usize) -> Option<u8>) -> Vec<u8> {
    let runs: Vec<Vec<(usize, Vec<u8>)>> = (0..width)
        .map(|x| {
            let mut runs = Vec::new();
            let mut y = 0;
            while y < height {
                let top = y;
                let mut run = Vec::new();
                while let Some(p) = (y < height).then(|| pixel(x, y)).flatten() {
                    run.push(p);
                    y += 1;
                }
                if run.is_empty() {
                    y += 1;
                } else {
                    runs.push((top, run));
                }
            }
            runs
        })
        .collect();
    let columns: Vec<Vec<(usize, &[u8])>> = runs
        .iter()
        .map(|col| col.iter().map(|(top, run)| (*top, run.as_slice())).collect())
        .collect();
    WadPatch::encode(height as u16, 0, 0, &columns)
}

fn flat_lump(pixel: impl Fn(usize, usize) -> u8) -> Vec<u8> {
    (0..FLAT_SIZE).map(|i| pixel(i % 64, i / 64)).collect()
}

/// The pictures the scene needs, for when no IWAD is given. The sky is four
/// overlapping patches so its seams go through compositing.
pub fn demo_wad() -> Result<WadData, wad::WadError> {
    let (playpal, colormap) = playpal_and_colormap();

    let bricks = patch(64, 128, |x, y| {
        let offset = if (y / 16) % 2 == 0 { 0 } else { 16 };
        let mortar = y % 16 == 0 || (x + offset) % 32 == 0;
        Some(colour(GREY, if mortar { 12 } else { 26 }))
    });
    let planks = patch(64, 128, |x, y| {
        Some(colour(BROWN, if x % 16 == 0 { 10 } else { 22 + (y % 8) as u8 / 4 }))
    });
    let grate = patch(64, 128, |x, y| {
        (x % 8 < 2 || y % 16 < 2).then(|| colour(TAN, 20))
    });
    let sky: Vec<Vec<u8>> = (0..4)
        .map(|part| {
            patch(SKY_PART + 8, 128, move |x, y| {
                let sx = (part * SKY_PART + x) as f32;
                let hills = 96.0 - 16.0 * (sx / 20.0).sin().abs();
                if (y as f32) < hills {
                    Some(colour(SKY, 31 - (y / 8) as u8))
                } else {
                    Some(colour(BROWN, 6))
                }
            })
        })
        .collect();

    let tex = |name: &str, width: u16, patches: &[(i16, i16)]| WadTexture {
        name: name.to_owned(),
        width,
        height: 128,
        patches: patches
            .iter()
            .map(|&(patch_index, origin_x)| WadTexPatch {
                origin_x,
                origin_y: 0,
                patch_index,
            })
            .collect(),
    };
    let textures = vec![
        tex("AASHITTY", 64, &[(0, 0)]),
        tex("STARTAN3", 64, &[(0, 0)]),
        tex("BROWN1", 64, &[(1, 0)]),
        tex("MIDGRATE", 64, &[(2, 0)]),
        tex("SKY1", 256, &[(3, 0), (4, 64), (5, 128), (6, 192)]),
    ];

    let mut builder = WadBuilder::iwad();
    builder
        .lump("PLAYPAL", playpal)
        .lump("COLORMAP", colormap)
        .lump(
            "PNAMES",
            encode_pnames(&[
                "WALL00_1", "BROWN1", "MIDGRAT", "SKY1_0", "SKY1_1", "SKY1_2", "SKY1_3",
            ]),
        )
        .lump("TEXTURE1", WadTexture::encode_directory(&textures))
        .lump("WALL00_1", bricks)
        .lump("BROWN1", planks)
        .lump("MIDGRAT", grate);
    for (i, part) in sky.into_iter().enumerate() {
        builder.lump(&format!("SKY1_{i}"), part);
    }
    builder
        .marker("F_START")
        .lump(
            "FLOOR4_8",
            flat_lump(|x, y| colour(BROWN, if (x / 16 + y / 16) % 2 == 0 { 18 } else { 24 })),
        )
        .lump(
            "CEIL3_5",
            flat_lump(|x, y| colour(GREY, if x % 32 == 0 || y % 32 == 0 { 8 } else { 20 })),
        )
        .lump("F_SKY1", vec![colour(SKY, 31); FLAT_SIZE]);
    for frame in 0..3u8 {
        builder.lump(
            &format!("NUKAGE{}", frame + 1),
            flat_lump(|x, y| colour(GREEN, 20 + ((x + y) as u8 / 8 + frame * 3) % 10)),
        );
    }
    builder.marker("F_END");
    WadData::from_bytes(builder.build())
}
