use log::{info, warn};

use crate::PicData;

/// A run of textures or flats that cycle, e.g `NUKAGE1`..`NUKAGE3`
#[derive(Debug, Default, Clone)]
pub struct PicAnimation {
    is_texture: bool,
    basepic: usize,
    numpics: usize,
    speed: usize,
}

impl PicAnimation {
    /// Doom function name `P_UpdateSpecials`, animation part. Rewrites the
    /// translation tables, the renderer only ever sees the result.
    pub fn update(&self, pic_data: &mut PicData, level_time: usize) {
        for i in self.basepic..self.basepic + self.numpics {
            let pic = self.basepic + ((level_time / self.speed + i) % self.numpics);
            if self.is_texture {
                pic_data.set_wall_translation(i, pic);
            } else {
                pic_data.flats.set_translation(i, pic);
            }
        }
    }

    /// Doom function name `P_InitPicAnims`
    pub fn init(pic_data: &PicData) -> Vec<PicAnimation> {
        Self::init_from(pic_data, &ANIM_DEFS)
    }

    pub fn init_from(pic_data: &PicData, defs: &[AnimationDef]) -> Vec<PicAnimation> {
        let mut anims = Vec::with_capacity(defs.len());

        for def in defs {
            let (start, end) = if def.is_texture {
                (
                    pic_data.wallpic_num_for_name(def.start_name),
                    pic_data.wallpic_num_for_name(def.end_name),
                )
            } else {
                (
                    pic_data.flats.flat_num_for_name(def.start_name),
                    pic_data.flats.flat_num_for_name(def.end_name),
                )
            };
            let (Some(basepic), Some(picnum)) = (start, end) else {
                continue;
            };
            if picnum < basepic + 1 {
                warn!(
                    "Bad animation cycle from {} to {}, skipping",
                    def.start_name, def.end_name
                );
                continue;
            }

            anims.push(PicAnimation {
                is_texture: def.is_texture,
                basepic,
                numpics: picnum - basepic + 1,
                speed: def.speed.max(1),
            });
        }
        info!("Initialised {} animated textures and flats", anims.len());

        anims
    }
}

pub struct AnimationDef {
    is_texture: bool,
    end_name: &'static str,
    start_name: &'static str,
    speed: usize,
}

impl AnimationDef {
    pub const fn new(
        is_texture: bool,
        end_name: &'static str,
        start_name: &'static str,
        speed: usize,
    ) -> Self {
        Self {
            is_texture,
            end_name,
            start_name,
            speed,
        }
    }
}

const ANIM_DEFS: [AnimationDef; 22] = [
    AnimationDef::new(false, "NUKAGE3", "NUKAGE1", 8),
    AnimationDef::new(false, "FWATER4", "FWATER1", 8),
    AnimationDef::new(false, "SWATER4", "SWATER1", 8),
    AnimationDef::new(false, "LAVA4", "LAVA1", 8),
    AnimationDef::new(false, "BLOOD3", "BLOOD1", 8),
    // DOOM II flat animations.
    AnimationDef::new(false, "RROCK08", "RROCK05", 8),
    AnimationDef::new(false, "SLIME04", "SLIME01", 8),
    AnimationDef::new(false, "SLIME08", "SLIME05", 8),
    AnimationDef::new(false, "SLIME12", "SLIME09", 8),
    AnimationDef::new(true, "BLODGR4", "BLODGR1", 8),
    AnimationDef::new(true, "SLADRIP3", "SLADRIP1", 8),
    AnimationDef::new(true, "BLODRIP4", "BLODRIP1", 8),
    AnimationDef::new(true, "FIREWALL", "FIREWALA", 8),
    AnimationDef::new(true, "GSTFONT3", "GSTFONT1", 8),
    AnimationDef::new(true, "FIRELAVA", "FIRELAV3", 8),
    AnimationDef::new(true, "FIREMAG3", "FIREMAG1", 8),
    AnimationDef::new(true, "FIREBLU2", "FIREBLU1", 8),
    AnimationDef::new(true, "ROCKRED3", "ROCKRED1", 8),
    AnimationDef::new(true, "BFALL4", "BFALL1", 8),
    AnimationDef::new(true, "SFALL4", "SFALL1", 8),
    AnimationDef::new(true, "WFALL4", "WFALL1", 8),
    AnimationDef::new(true, "DBRAIN4", "DBRAIN1", 8),
];
