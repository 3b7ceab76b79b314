//! Renders a single frame of a small scene with the software renderer and
//! writes it to a PPM. Textures come from an IWAD when one is given.

mod cli;
mod config;
mod scene;

use cli::*;
use glam::Vec2;
use log::{info, warn};
use math::Bam;
use pic_data::{PicAnimation, PicData};
use render_soft::{FrameStats, RenderConfig, SoftwareRenderer, ViewPoint};
use render_target::{save_ppm, DrawBuffer, Palettized, PixelFormat, TrueColour};
use render_trait::PixelBuffer;
use simplelog::TermLogger;
use std::error::Error;
use std::path::Path;
use wad::WadData;

use crate::config::UserConfig;
use crate::scene::{demo_wad, Scene};

const BASE_DIR: &str = "room4doom-soft/";
/// Eye height above the floor the view stands on
const VIEW_HEIGHT: f32 = 41.0;

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load()?;
    user_config.sync_cli(&mut options);
    user_config.write();

    let wad = if options.iwad.is_empty() {
        info!("No IWAD given, using the built in pictures");
        demo_wad()?
    } else {
        WadData::new(&options.iwad)?
    };

    let render_config = RenderConfig {
        column_batching: options.batch.unwrap_or_default(),
        ..RenderConfig::default()
    };
    let mut pic_data = PicData::init(&wad, render_config.composite_cache_bytes)?;
    if !options.sky.is_empty() {
        match pic_data.wallpic_num_for_name(&options.sky) {
            Some(num) => pic_data.set_sky_pic(num),
            None => warn!("No texture named {}, keeping the default sky", options.sky),
        }
    }

    let animations = PicAnimation::init(&pic_data);
    for tick in 0..options.frames {
        for anim in &animations {
            anim.update(&mut pic_data, tick);
        }
    }

    let width = options.width.max(1) as usize;
    let height = options.height.max(1) as usize;
    let scene = Scene::new(&pic_data);
    let view = ViewPoint::new(Vec2::ZERO, VIEW_HEIGHT, Bam::from_degrees(options.angle));
    let mut renderer = SoftwareRenderer::new(width, height, render_config);

    let output = Path::new(&options.output);
    let stats = if options.true_colour.unwrap_or_default() {
        let format = TrueColour::new(pic_data.palette());
        draw(&mut renderer, &scene, &view, &mut pic_data, format, output)?
    } else {
        let format = Palettized::new(pic_data.palette());
        draw(&mut renderer, &scene, &view, &mut pic_data, format, output)?
    };
    info!(
        "Drew {} of {} segs, {} visplanes, {} masked, {} openings",
        stats.drawsegs, stats.segs, stats.visplanes, stats.masked, stats.openings
    );

    #[cfg(feature = "hprof")]
    coarse_prof::write(&mut std::io::stdout())?;
    Ok(())
}

fn draw<F: PixelFormat>(
    renderer: &mut SoftwareRenderer,
    scene: &Scene,
    view: &ViewPoint,
    pic_data: &mut PicData,
    format: F,
    output: &Path,
) -> Result<FrameStats, Box<dyn Error>> {
    let tables = renderer.tables();
    let mut buffer = DrawBuffer::new(tables.width as usize, tables.height as usize, format);
    buffer.clear();
    let segs = scene.ordered_segs(Vec2::from(view.xy));
    let stats = renderer.render_frame(view, &scene.sectors, &segs, pic_data, &mut buffer);
    save_ppm(&buffer, output)?;
    Ok(stats)
}
