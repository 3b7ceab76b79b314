//! All data and functions related to pictures the renderer draws with:
//! - Wall textures, composited from patches
//! - Flats for floors and ceilings
//! - Palettes
//! - Colourmaps and light scaling

mod animations;
mod cache;
mod compositor;
mod error;
mod flats;

pub use animations::*;
pub use compositor::*;
pub use error::TextureError;
pub use flats::*;

use log::{debug, info};
use wad::{WadData, WadError, WadPalette};

pub const LIGHTLEVELS: i32 = 16;
/// Sector light level to light table row
pub const LIGHTSEGSHIFT: i32 = 4;
pub const MAXLIGHTSCALE: usize = 48;
/// Wall scale to light table column
pub const LIGHTSCALESHIFT: i32 = 12;
pub const MAXLIGHTZ: usize = 128;
/// Plane distance to light table column
pub const LIGHTZSHIFT: i32 = 20;
pub const NUMCOLORMAPS: i32 = 32;
const DISTMAP: i32 = 2;

/// Default byte budget for cached composites
pub const COMPOSITE_CACHE_BYTES: usize = 4 * 1024 * 1024;

pub type Colourmap = [u8; 256];

#[derive(Debug)]
pub struct PicData {
    /// Colours for pixels
    palettes: Vec<WadPalette>,
    use_palette: usize,
    /// Usually 34 blocks of 256, each u8 being an index in to the palette
    colourmaps: Vec<Colourmap>,
    /// 16 groups of 48 indexes to colourmaps, for walls
    light_scale: [[usize; MAXLIGHTSCALE]; LIGHTLEVELS as usize],
    /// 16 groups of 128 indexes to colourmaps, for planes
    zlight_scale: [[usize; MAXLIGHTZ]; LIGHTLEVELS as usize],
    fixed_colourmap: Option<usize>,
    pub textures: TextureCompositor,
    /// Used in animations
    wall_translation: Vec<usize>,
    pub flats: FlatProvider,
    /// The flat number that signifies a sky should be drawn
    sky_num: usize,
    /// The texture drawn for sky
    sky_pic: usize,
}

impl PicData {
    /// Load everything picture related from the WAD. Any error here is fatal
    /// for the level.
    pub fn init(wad: &WadData, cache_budget: usize) -> Result<Self, TextureError> {
        let palettes: Vec<WadPalette> = wad.playpal_iter()?.collect();
        if palettes.is_empty() {
            return Err(WadError::LumpTooShort {
                name: "PLAYPAL".into(),
                needed: wad::PALETTE_SIZE,
                len: wad.get_lump("PLAYPAL").map_or(0, |l| l.len()),
            }
            .into());
        }

        let colourmaps: Vec<Colourmap> = wad
            .colourmap_iter()?
            .map(|c| {
                let mut map = [0; 256];
                map.copy_from_slice(c);
                map
            })
            .collect();
        if colourmaps.is_empty() {
            return Err(WadError::LumpTooShort {
                name: "COLORMAP".into(),
                needed: 256,
                len: 0,
            }
            .into());
        }

        let textures = TextureCompositor::load(wad, cache_budget)?;
        let flats = FlatProvider::new(wad.flats_iter().collect());
        info!(
            "Loaded {} textures, {} flats, {} palettes, {} colourmaps",
            textures.num_textures(),
            flats.num_flats(),
            palettes.len(),
            colourmaps.len()
        );
        Ok(Self::new(palettes, colourmaps, textures, flats))
    }

    /// Assemble from already loaded parts. Light tables are set up for a 320
    /// wide view.
    pub fn new(
        palettes: Vec<WadPalette>,
        colourmaps: Vec<Colourmap>,
        textures: TextureCompositor,
        flats: FlatProvider,
    ) -> Self {
        let sky_num = flats.flat_num_for_name("F_SKY1").unwrap_or(usize::MAX);
        let sky_pic = textures.texture_num_for_name("SKY1").unwrap_or(0);
        let wall_translation = (0..textures.num_textures()).collect();
        Self {
            palettes,
            use_palette: 0,
            colourmaps,
            light_scale: Self::init_light_scales(320),
            zlight_scale: Self::init_zlight_scales(),
            fixed_colourmap: None,
            textures,
            wall_translation,
            flats,
            sky_num,
            sky_pic,
        }
    }

    /// Doom function name `R_ExecuteSetViewSize`, light part. The wall light
    /// table depends on how wide the view is.
    pub fn set_view_width(&mut self, width: usize) {
        self.light_scale = Self::init_light_scales(width);
    }

    fn init_light_scales(width: usize) -> [[usize; MAXLIGHTSCALE]; LIGHTLEVELS as usize] {
        let width = width.max(1) as i32;
        let mut tmp = [[0; MAXLIGHTSCALE]; LIGHTLEVELS as usize];
        for i in 0..LIGHTLEVELS {
            let startmap = ((LIGHTLEVELS - 1 - i) * 2) * NUMCOLORMAPS / LIGHTLEVELS;
            for j in 0..MAXLIGHTSCALE as i32 {
                let level = startmap - j * 320 / width / DISTMAP;
                tmp[i as usize][j as usize] = level.clamp(0, NUMCOLORMAPS - 1) as usize;
            }
        }
        tmp
    }

    /// Doom function name `R_InitLightTables`
    fn init_zlight_scales() -> [[usize; MAXLIGHTZ]; LIGHTLEVELS as usize] {
        let mut tmp = [[0; MAXLIGHTZ]; LIGHTLEVELS as usize];
        for i in 0..LIGHTLEVELS {
            let startmap = ((LIGHTLEVELS - 1 - i) * 2) * NUMCOLORMAPS / LIGHTLEVELS;
            for j in 0..MAXLIGHTZ as i32 {
                let scale = 160 / (j + 1);
                let level = startmap - scale / DISTMAP;
                tmp[i as usize][j as usize] = level.clamp(0, NUMCOLORMAPS - 1) as usize;
            }
        }
        tmp
    }

    pub fn palette(&self) -> &WadPalette {
        &self.palettes[self.use_palette]
    }

    pub fn set_palette(&mut self, num: usize) {
        self.use_palette = num.min(self.palettes.len() - 1);
    }

    #[inline]
    pub fn colourmap(&self, index: usize) -> &Colourmap {
        &self.colourmaps[index.min(self.colourmaps.len() - 1)]
    }

    /// A fixed colourmap replaces all light levels, e.g the light amp visor
    pub fn set_fixed_colourmap(&mut self, colourmap: Option<usize>) {
        self.fixed_colourmap = colourmap;
    }

    pub fn fixed_colourmap(&self) -> Option<usize> {
        self.fixed_colourmap
    }

    /// Colourmap for a wall column. `light_level` is the light table row
    /// (sector light `>> LIGHTSEGSHIFT` plus extra light and contrast),
    /// `scale` the column's fixed point scale.
    #[inline]
    pub fn wall_light_colourmap(&self, light_level: i32, scale: i32) -> &Colourmap {
        if let Some(fixed) = self.fixed_colourmap {
            return self.colourmap(fixed);
        }
        let row = light_level.clamp(0, LIGHTLEVELS - 1) as usize;
        let col = (scale >> LIGHTSCALESHIFT).clamp(0, MAXLIGHTSCALE as i32 - 1) as usize;
        self.colourmap(self.light_scale[row][col])
    }

    /// Colourmap for a plane span at fixed point `distance`
    #[inline]
    pub fn flat_light_colourmap(&self, light_level: i32, distance: i32) -> &Colourmap {
        if let Some(fixed) = self.fixed_colourmap {
            return self.colourmap(fixed);
        }
        let row = light_level.clamp(0, LIGHTLEVELS - 1) as usize;
        let col = (distance >> LIGHTZSHIFT).clamp(0, MAXLIGHTZ as i32 - 1) as usize;
        self.colourmap(self.zlight_scale[row][col])
    }

    /// The flat number sectors use to show sky
    pub fn sky_num(&self) -> usize {
        self.sky_num
    }

    /// The texture drawn for sky
    pub fn sky_pic(&self) -> usize {
        self.sky_pic
    }

    pub fn set_sky_pic(&mut self, num: usize) {
        self.sky_pic = num;
    }

    pub fn wallpic_num_for_name(&self, name: &str) -> Option<usize> {
        self.textures.texture_num_for_name(name)
    }

    pub fn num_textures(&self) -> usize {
        self.textures.num_textures()
    }

    #[inline]
    pub fn wall_translation(&self, num: usize) -> usize {
        self.wall_translation.get(num).copied().unwrap_or(num)
    }

    pub fn set_wall_translation(&mut self, num: usize, to: usize) {
        if let Some(t) = self.wall_translation.get_mut(num) {
            *t = to;
        }
    }

    /// Start of a frame, lets the composite cache age out unused entries
    pub fn begin_frame(&mut self) {
        self.textures.begin_frame();
    }

    /// Ready the translated texture for drawing this frame
    pub fn prepare_wall(&mut self, num: usize) {
        let num = self.wall_translation(num);
        self.textures.prepare(num);
    }

    /// Column of the translated texture
    #[inline]
    pub fn wall_column(&self, num: usize, column: i32) -> TextureColumn<'_> {
        self.textures.column(self.wall_translation(num), column)
    }

    #[inline]
    pub fn wall_height(&self, num: usize) -> usize {
        let num = self.wall_translation(num);
        if num < self.textures.num_textures() {
            self.textures.texture(num).height
        } else {
            0
        }
    }

    #[inline]
    pub fn get_flat(&self, num: usize) -> &[u8] {
        self.flats.get_flat(num)
    }

    /// Drop all composites, they are rebuilt on demand
    pub fn invalidate_composites(&mut self) {
        debug!("Invalidating all composites");
        self.textures.invalidate_all();
    }
}
