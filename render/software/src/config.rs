use serde::{Deserialize, Serialize};

/// Tunables for the software renderer. The initial sizes only matter for how
/// often the per frame arrays grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Hand wall columns to the target four at a time
    pub column_batching: bool,
    pub initial_visplanes: usize,
    pub initial_drawsegs: usize,
    pub initial_openings: usize,
    /// Byte budget of cached composite textures
    pub composite_cache_bytes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            column_batching: false,
            initial_visplanes: 128,
            initial_drawsegs: 32,
            initial_openings: 16384,
            composite_cache_bytes: pic_data::COMPOSITE_CACHE_BYTES,
        }
    }
}
