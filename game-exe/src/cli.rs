use argh::FromArgs;
use log::LevelFilter;

/// Render one frame of a small test scene with the software renderer and
/// write it out as a PPM
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<LevelFilter>,
    /// path to an IWAD to take textures and flats from. A built in set is
    /// used when empty
    #[argh(option, default = "Default::default()")]
    pub iwad: String,
    /// resolution width in pixels
    #[argh(option, default = "0")]
    pub width: u32,
    /// resolution height in pixels
    #[argh(option, default = "0")]
    pub height: u32,
    /// resolve pixels through the palette as they are drawn
    #[argh(option)]
    pub true_colour: Option<bool>,
    /// hand wall columns to the buffer four at a time
    #[argh(option)]
    pub batch: Option<bool>,
    /// where to write the frame
    #[argh(option, default = "String::from(\"frame.ppm\")")]
    pub output: String,
    /// view angle in degrees, 0 faces east
    #[argh(option, default = "0.0")]
    pub angle: f32,
    /// texture to draw the sky with, SKY1 when empty
    #[argh(option, default = "Default::default()")]
    pub sky: String,
    /// animation ticks to run before the frame is drawn
    #[argh(option, default = "0")]
    pub frames: usize,
}
