//! Wall textures built from patches.
//!
//! Columns covered by a single patch are served straight out of the patch
//! lump when its first post spans the whole texture height. Other single
//! patch columns get a dense copy at load. Columns where patches overlap
//! are drawn in to a composite, with the opacity of every row tracked
//! separately so transparent gaps in a later patch keep whatever an earlier
//! patch put there, then re-encoded as posts.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::{debug, warn};
use wad::{encode_posts, Post, PostIter, WadData, WadPatch, WadTexture, POST_END};

use crate::cache::{Composite, CompositeCache};
use crate::TextureError;

/// Vanilla addresses composite columns with 16 bit offsets
const MAX_COMPOSITE_SIZE: usize = 0x10000;

/// A patch placed in a texture
#[derive(Debug, Clone, Copy)]
pub struct TexPatch {
    /// Index in to the compositor's patch list (the PNAMES order)
    pub patch: usize,
    pub origin_x: i32,
    pub origin_y: i32,
}

/// Where a column's data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnLookup {
    /// Exactly one patch covers this column and its first post fills it
    Patch { patch: usize, column: usize, origin_y: i32 },
    /// One patch with gaps or an offset. Solid pixels are at `offset` in the
    /// texture's dense buffer, posts still come from the patch.
    Dense {
        patch: usize,
        column: usize,
        origin_y: i32,
        offset: u32,
    },
    /// Two or more patches, data is at `offset` in the composite
    Composite { offset: u16 },
}

#[derive(Debug)]
pub struct Texture {
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// Largest `2^n - 1` not over `width - 1`
    pub width_mask: usize,
    pub patches: Vec<TexPatch>,
    columns: Vec<ColumnLookup>,
    /// Full height pixels of the `Dense` columns, gaps left as index 0
    dense: Vec<u8>,
    composite_size: usize,
}

impl Texture {
    /// True if any column needs a composite
    pub fn is_composite(&self) -> bool {
        self.composite_size > 0
    }
}

/// Largest `2^n - 1` that is not over `width - 1`
pub fn width_mask(width: usize) -> usize {
    let mut j = 1;
    while j * 2 <= width {
        j <<= 1;
    }
    j - 1
}

/// One texture column, ready to draw
#[derive(Debug, Clone, Copy)]
pub struct TextureColumn<'a> {
    /// Pixels for solid walls, always the full texture height
    pub pixels: &'a [u8],
    posts: &'a [u8],
    origin_y: i32,
}

impl<'a> TextureColumn<'a> {
    /// The opaque runs of the column, rows relative to the texture top
    pub fn posts(self) -> impl Iterator<Item = Post<'a>> + 'a {
        let origin_y = self.origin_y;
        PostIter::new(self.posts).map(move |p| Post {
            top: p.top + origin_y,
            pixels: p.pixels,
        })
    }
}

static EMPTY_POSTS: [u8; 1] = [POST_END];

pub struct TextureCompositor {
    textures: Vec<Texture>,
    patches: Vec<Option<WadPatch>>,
    cache: CompositeCache,
    /// Zeroed column for anything that can't be resolved
    placeholder: Vec<u8>,
    generated: usize,
}

impl std::fmt::Debug for TextureCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCompositor")
            .field("textures", &self.textures.len())
            .field("patches", &self.patches.len())
            .field("cached", &self.cache.len())
            .field("cached_bytes", &self.cache.bytes())
            .finish()
    }
}

impl TextureCompositor {
    /// Doom function name `R_InitTextures`. Reads PNAMES, the patches it
    /// names, and TEXTURE1/TEXTURE2.
    pub fn load(wad: &WadData, cache_budget: usize) -> Result<Self, TextureError> {
        let mut patches = Vec::new();
        for name in wad.pnames_iter()? {
            match wad.get_patch(&name) {
                Some(patch) => patches.push(Some(patch?)),
                None => {
                    debug!("PNAMES entry {name} has no lump");
                    patches.push(None);
                }
            }
        }

        let mut defs = wad.texture_iter("TEXTURE1")?;
        defs.extend(wad.texture_iter("TEXTURE2")?);
        Self::new(defs, patches, cache_budget)
    }

    /// Build the column lookups for every texture. `patches` is in PNAMES
    /// order, `None` where a name has no lump.
    pub fn new(
        defs: Vec<WadTexture>,
        patches: Vec<Option<WadPatch>>,
        cache_budget: usize,
    ) -> Result<Self, TextureError> {
        let mut textures = Vec::with_capacity(defs.len());
        let mut max_height = 1;
        for def in defs {
            let mut tex_patches = Vec::with_capacity(def.patches.len());
            for p in &def.patches {
                let index = p.patch_index as i32;
                if index < 0 || index as usize >= patches.len() {
                    return Err(TextureError::BadPatchIndex {
                        texture: def.name.clone(),
                        index,
                        count: patches.len(),
                    });
                }
                if patches[index as usize].is_none() {
                    return Err(TextureError::MissingPatch {
                        texture: def.name.clone(),
                        patch: format!("#{index}"),
                    });
                }
                tex_patches.push(TexPatch {
                    patch: index as usize,
                    origin_x: p.origin_x as i32,
                    origin_y: p.origin_y as i32,
                });
            }

            let width = def.width as usize;
            let height = def.height as usize;
            max_height = max_height.max(height);
            let mut texture = Texture {
                name: def.name,
                width,
                height,
                width_mask: width_mask(width),
                patches: tex_patches,
                columns: Vec::new(),
                dense: Vec::new(),
                composite_size: 0,
            };
            generate_lookup(&mut texture, &patches)?;
            textures.push(texture);
        }
        debug!("Initialised {} textures", textures.len());

        Ok(Self {
            textures,
            patches,
            cache: CompositeCache::new(cache_budget),
            placeholder: vec![0; max_height],
            generated: 0,
        })
    }

    pub fn num_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn texture(&self, num: usize) -> &Texture {
        &self.textures[num]
    }

    pub fn texture_num_for_name(&self, name: &str) -> Option<usize> {
        self.textures
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Count of composites built since load, cache misses included
    pub fn composites_generated(&self) -> usize {
        self.generated
    }

    pub fn cached_bytes(&self) -> usize {
        self.cache.bytes()
    }

    /// Start of a frame. Composites unused last frame become evictable.
    pub fn begin_frame(&mut self) {
        self.cache.begin_frame();
    }

    /// Make sure the composite for `num` is resident and pinned for this
    /// frame. Textures without multi-patch columns never build one.
    pub fn prepare(&mut self, num: usize) {
        let Some(texture) = self.textures.get(num) else {
            return;
        };
        if !texture.is_composite() || self.cache.touch(num) {
            return;
        }
        let composite = self.generate_composite(num);
        self.generated += 1;
        self.cache.insert(num, composite);
    }

    /// Drop a composite, it is regenerated on next use
    pub fn invalidate(&mut self, num: usize) {
        self.cache.remove(num);
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Doom function name `R_GetColumn`. `column` is wrapped by the width mask.
    pub fn column(&self, num: usize, column: i32) -> TextureColumn<'_> {
        let Some(texture) = self.textures.get(num) else {
            warn!("No texture {num}, drawing placeholder");
            return self.placeholder_column(1);
        };
        let x = (column as usize) & texture.width_mask;
        match texture.columns[x] {
            ColumnLookup::Patch {
                patch,
                column,
                origin_y,
            } => {
                let Some(patch) = self.patches[patch].as_ref() else {
                    warn!("Texture {} lost patch {patch}", texture.name);
                    return self.placeholder_column(texture.height);
                };
                let posts = patch.column_data(column);
                let pixels = PostIter::new(posts).next().and_then(|p| {
                    let start = (-(p.top + origin_y)).max(0) as usize;
                    p.pixels.get(start..start + texture.height)
                });
                let Some(pixels) = pixels else {
                    warn!("Texture {} column {x} is short", texture.name);
                    return self.placeholder_column(texture.height);
                };
                TextureColumn {
                    pixels,
                    posts,
                    origin_y,
                }
            }
            ColumnLookup::Dense {
                patch,
                column,
                origin_y,
                offset,
            } => {
                let Some(patch) = self.patches[patch].as_ref() else {
                    warn!("Texture {} lost patch {patch}", texture.name);
                    return self.placeholder_column(texture.height);
                };
                let offset = offset as usize;
                TextureColumn {
                    pixels: &texture.dense[offset..offset + texture.height],
                    posts: patch.column_data(column),
                    origin_y,
                }
            }
            ColumnLookup::Composite { offset } => {
                let Some(composite) = self.cache.get(num) else {
                    warn!(
                        "Composite for {} is not resident, drawing placeholder column {x}",
                        texture.name
                    );
                    return self.placeholder_column(texture.height);
                };
                let offset = offset as usize;
                let posts = composite.post_offsets[x] as usize;
                TextureColumn {
                    pixels: &composite.pixels[offset..offset + texture.height],
                    posts: &composite.posts[posts..],
                    origin_y: 0,
                }
            }
        }
    }

    fn placeholder_column(&self, height: usize) -> TextureColumn<'_> {
        TextureColumn {
            pixels: &self.placeholder[..height.clamp(1, self.placeholder.len())],
            posts: &EMPTY_POSTS,
            origin_y: 0,
        }
    }

    /// Doom function name `R_GenerateComposite`
    fn generate_composite(&self, num: usize) -> Composite {
        #[cfg(feature = "hprof")]
        profile!("generate_composite");
        let texture = &self.textures[num];
        let height = texture.height;
        let mut pixels = vec![0u8; texture.composite_size];
        // Per row opacity, separate from whether anything was copied
        let mut marks = vec![false; texture.composite_size];

        for tp in &texture.patches {
            let Some(patch) = self.patches[tp.patch].as_ref() else {
                continue;
            };
            let x1 = tp.origin_x;
            let x2 = (x1 + patch.width as i32).min(texture.width as i32);
            for x in x1.max(0)..x2 {
                let ColumnLookup::Composite { offset } = texture.columns[x as usize] else {
                    continue;
                };
                let offset = offset as usize;
                let col_marks = &mut marks[offset..offset + height];
                paint_posts(
                    &mut pixels[offset..offset + height],
                    patch.posts((x - x1) as usize),
                    tp.origin_y,
                    |row| col_marks[row] = true,
                );
            }
        }

        // Re-encode the marked rows so the gaps are gaps again
        let mut posts = Vec::new();
        let mut post_offsets = vec![0u32; texture.width];
        for (x, lookup) in texture.columns.iter().enumerate() {
            let ColumnLookup::Composite { offset } = *lookup else {
                continue;
            };
            let offset = offset as usize;
            let col_marks = &marks[offset..offset + height];
            let col_pixels = &pixels[offset..offset + height];
            let mut runs = Vec::new();
            let mut row = 0;
            while row < height {
                if !col_marks[row] {
                    row += 1;
                    continue;
                }
                let start = row;
                while row < height && col_marks[row] {
                    row += 1;
                }
                runs.push((start, &col_pixels[start..row]));
            }
            post_offsets[x] = posts.len() as u32;
            posts.extend(encode_posts(runs));
        }

        debug!(
            "Generated composite for {}: {} bytes",
            texture.name,
            pixels.len() + posts.len()
        );
        Composite {
            pixels,
            posts,
            post_offsets,
        }
    }
}

/// Copy the posts of one patch column in to a texture column, calling `mark`
/// for every row written
fn paint_posts<'p>(
    column: &mut [u8],
    posts: impl Iterator<Item = Post<'p>>,
    origin_y: i32,
    mut mark: impl FnMut(usize),
) {
    let height = column.len() as i32;
    for post in posts {
        let top = origin_y + post.top;
        for (i, p) in post.pixels.iter().enumerate() {
            let row = top + i as i32;
            if row < 0 || row >= height {
                continue;
            }
            column[row as usize] = *p;
            mark(row as usize);
        }
    }
}

/// The first post starts at or above the texture top and runs past its
/// bottom
fn fills_column<'p>(
    mut posts: impl Iterator<Item = Post<'p>>,
    origin_y: i32,
    height: usize,
) -> bool {
    posts.next().is_some_and(|p| {
        let top = p.top + origin_y;
        top <= 0 && top + p.pixels.len() as i32 >= height as i32
    })
}

/// Doom function name `R_GenerateLookup`. Counts the patches over each
/// column; one means the column is read from the patch, more means it needs
/// the composite.
fn generate_lookup(
    texture: &mut Texture,
    patches: &[Option<WadPatch>],
) -> Result<(), TextureError> {
    let width = texture.width;
    let mut count = vec![0u16; width];
    let mut single = vec![None; width];

    for tp in &texture.patches {
        let Some(patch) = patches[tp.patch].as_ref() else {
            continue;
        };
        let x1 = tp.origin_x;
        let x2 = (x1 + patch.width as i32).min(width as i32);
        for x in x1.max(0)..x2 {
            let x = x as usize;
            count[x] = count[x].saturating_add(1);
            single[x] = Some(ColumnLookup::Patch {
                patch: tp.patch,
                column: (x as i32 - x1) as usize,
                origin_y: tp.origin_y,
            });
        }
    }

    let height = texture.height;
    let mut columns = Vec::with_capacity(width);
    let mut dense = Vec::new();
    let mut size = 0;
    for x in 0..width {
        match (count[x], single[x]) {
            (
                1,
                Some(
                    lookup @ ColumnLookup::Patch {
                        patch,
                        column,
                        origin_y,
                    },
                ),
            ) => {
                let Some(wad_patch) = patches[patch].as_ref() else {
                    return Err(TextureError::ColumnWithoutPatch {
                        texture: texture.name.clone(),
                        column: x,
                    });
                };
                if fills_column(wad_patch.posts(column), origin_y, height) {
                    columns.push(lookup);
                } else {
                    let offset = dense.len();
                    dense.resize(offset + height, 0);
                    paint_posts(&mut dense[offset..], wad_patch.posts(column), origin_y, |_| {});
                    columns.push(ColumnLookup::Dense {
                        patch,
                        column,
                        origin_y,
                        offset: offset as u32,
                    });
                }
            }
            (0, _) | (_, None) => {
                return Err(TextureError::ColumnWithoutPatch {
                    texture: texture.name.clone(),
                    column: x,
                });
            }
            _ => {
                if size + texture.height > MAX_COMPOSITE_SIZE {
                    return Err(TextureError::CompositeTooLarge {
                        texture: texture.name.clone(),
                        size: size + texture.height,
                    });
                }
                columns.push(ColumnLookup::Composite { offset: size as u16 });
                size += texture.height;
            }
        }
    }
    texture.columns = columns;
    texture.dense = dense;
    texture.composite_size = size;
    Ok(())
}

#[cfg(test)]
mod tests {
    use wad::{WadPatch, WadTexPatch, WadTexture};

    use super::{width_mask, TextureCompositor};
    use crate::TextureError;

    /// A patch `width` wide, every column one post of `colour` from `top` for
    /// `len` rows
    fn patch(
        name: &str,
        width: usize,
        height: u16,
        top: usize,
        len: usize,
        colour: u8,
    ) -> WadPatch {
        let pixels = vec![colour; len];
        let columns: Vec<Vec<(usize, &[u8])>> =
            (0..width).map(|_| vec![(top, &pixels[..])]).collect();
        WadPatch::from_lump(name, WadPatch::encode(height, 0, 0, &columns)).unwrap()
    }

    fn texture(name: &str, width: u16, height: u16, patches: &[(i16, i16, i16)]) -> WadTexture {
        WadTexture {
            name: name.to_owned(),
            width,
            height,
            patches: patches
                .iter()
                .map(|&(origin_x, origin_y, patch_index)| WadTexPatch {
                    origin_x,
                    origin_y,
                    patch_index,
                })
                .collect(),
        }
    }

    /// Paint each patch in order the simple way, tracking opacity per row
    fn reference_column(comp: &TextureCompositor, num: usize, x: usize) -> Vec<Option<u8>> {
        let tex = comp.texture(num);
        let mut out = vec![None; tex.height];
        for tp in &tex.patches {
            let patch = comp.patches[tp.patch].as_ref().unwrap();
            let px = x as i32 - tp.origin_x;
            if px < 0 || px >= patch.width as i32 {
                continue;
            }
            for post in patch.posts(px as usize) {
                for (i, p) in post.pixels.iter().enumerate() {
                    let row = tp.origin_y + post.top + i as i32;
                    if row >= 0 && (row as usize) < tex.height {
                        out[row as usize] = Some(*p);
                    }
                }
            }
        }
        out
    }

    fn column_from_posts(comp: &TextureCompositor, num: usize, x: usize) -> Vec<Option<u8>> {
        let height = comp.texture(num).height;
        let mut out = vec![None; height];
        for post in comp.column(num, x as i32).posts() {
            for (i, p) in post.pixels.iter().enumerate() {
                let row = post.top + i as i32;
                if row >= 0 && (row as usize) < height {
                    out[row as usize] = Some(*p);
                }
            }
        }
        out
    }

    #[test]
    fn width_masks() {
        assert_eq!(width_mask(64), 63);
        assert_eq!(width_mask(96), 63);
        assert_eq!(width_mask(128), 127);
        assert_eq!(width_mask(1), 0);
        assert_eq!(width_mask(255), 127);
    }

    #[test]
    fn single_patch_is_zero_copy() {
        let patches = vec![Some(patch("WALL00", 64, 128, 0, 128, 42))];
        let mut comp =
            TextureCompositor::new(vec![texture("PLAIN", 64, 128, &[(0, 0, 0)])], patches, 1 << 20)
                .unwrap();
        assert!(!comp.texture(0).is_composite());
        comp.begin_frame();
        comp.prepare(0);
        for x in 0..64 {
            let col = comp.column(0, x);
            assert_eq!(col.pixels.len(), 128);
            assert!(col.pixels.iter().all(|p| *p == 42));
            // The column points in to the patch lump itself
            let lump = comp.patches[0].as_ref().unwrap().column_data(x as usize);
            assert!(std::ptr::eq(col.pixels.as_ptr(), lump[3..].as_ptr()));
        }
        assert_eq!(comp.composites_generated(), 0);
        assert_eq!(comp.cached_bytes(), 0);
    }

    #[test]
    fn medusa_gap_shows_first_patch() {
        // Patch 1 solid, patch 2 has only rows 0..8 and 24..32 so 8..24 is a gap
        let solid = patch("BACK", 16, 32, 0, 32, 10);
        let rows_a = [20u8; 8];
        let rows_b = [20u8; 8];
        let cols: Vec<Vec<(usize, &[u8])>> =
            (0..16).map(|_| vec![(0, &rows_a[..]), (24, &rows_b[..])]).collect();
        let holed = WadPatch::from_lump("FRONT", WadPatch::encode(32, 0, 0, &cols)).unwrap();

        let mut comp = TextureCompositor::new(
            vec![texture("MEDUSA", 16, 32, &[(0, 0, 0), (0, 0, 1)])],
            vec![Some(solid), Some(holed)],
            1 << 20,
        )
        .unwrap();
        assert!(comp.texture(0).is_composite());
        comp.begin_frame();
        comp.prepare(0);
        assert_eq!(comp.composites_generated(), 1);

        let col = comp.column(0, 5);
        assert_eq!(col.pixels.len(), 32);
        assert!(col.pixels[..8].iter().all(|p| *p == 20));
        assert!(col.pixels[8..24].iter().all(|p| *p == 10));
        assert!(col.pixels[24..].iter().all(|p| *p == 20));
        // Fully opaque, so one run once re-encoded
        let posts: Vec<_> = col.posts().collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].pixels.len(), 32);
    }

    #[test]
    fn composite_keeps_real_gaps() {
        // Two patches both with a hole over rows 10..20
        let a = [1u8; 10];
        let b = [2u8; 12];
        let cols_a: Vec<Vec<(usize, &[u8])>> = (0..8).map(|_| vec![(0, &a[..])]).collect();
        let cols_b: Vec<Vec<(usize, &[u8])>> = (0..8).map(|_| vec![(20, &b[..])]).collect();
        let pa = WadPatch::from_lump("A", WadPatch::encode(32, 0, 0, &cols_a)).unwrap();
        let pb = WadPatch::from_lump("B", WadPatch::encode(32, 0, 0, &cols_b)).unwrap();
        let mut comp = TextureCompositor::new(
            vec![texture("GRATE", 8, 32, &[(0, 0, 0), (0, 0, 1)])],
            vec![Some(pa), Some(pb)],
            1 << 20,
        )
        .unwrap();
        comp.prepare(0);
        let posts: Vec<_> = comp.column(0, 3).posts().collect();
        assert_eq!(posts.len(), 2);
        assert_eq!((posts[0].top, posts[0].pixels.len()), (0, 10));
        assert_eq!((posts[1].top, posts[1].pixels.len()), (20, 12));
    }

    #[test]
    fn every_column_matches_painting_each_patch() {
        let p0 = patch("P0", 40, 64, 0, 64, 3);
        let p1 = patch("P1", 30, 64, 16, 20, 7);
        let p2 = patch("P2", 20, 64, 4, 8, 9);
        let mut comp = TextureCompositor::new(
            vec![texture(
                "MIX",
                96,
                64,
                &[(0, 0, 0), (30, -4, 1), (40, 0, 0), (80, 40, 2), (70, 0, 2)],
            )],
            vec![Some(p0), Some(p1), Some(p2)],
            1 << 20,
        )
        .unwrap();
        comp.prepare(0);
        let tex = comp.texture(0);
        assert_eq!(tex.width_mask, 63);
        for x in 0..64 {
            assert_eq!(
                column_from_posts(&comp, 0, x),
                reference_column(&comp, 0, x),
                "column {x}"
            );
            let solid: Vec<u8> = reference_column(&comp, 0, x)
                .iter()
                .map(|p| p.unwrap_or(0))
                .collect();
            assert_eq!(comp.column(0, x as i32).pixels, &solid[..], "column {x}");
        }
    }

    #[test]
    fn gapped_single_patch_is_full_height() {
        let top = [1u8; 8];
        let bottom = [2u8; 12];
        let cols: Vec<Vec<(usize, &[u8])>> =
            (0..8).map(|_| vec![(4, &top[..]), (20, &bottom[..])]).collect();
        let holed = WadPatch::from_lump("HOLED", WadPatch::encode(32, 0, 0, &cols)).unwrap();
        let mut comp =
            TextureCompositor::new(vec![texture("BARS", 8, 32, &[(0, 0, 0)])], vec![Some(holed)], 0)
                .unwrap();
        assert!(!comp.texture(0).is_composite());
        comp.prepare(0);
        let col = comp.column(0, 3);
        assert_eq!(col.pixels.len(), 32);
        assert!(col.pixels[..4].iter().all(|p| *p == 0));
        assert!(col.pixels[4..12].iter().all(|p| *p == 1));
        assert!(col.pixels[12..20].iter().all(|p| *p == 0));
        assert!(col.pixels[20..].iter().all(|p| *p == 2));
        assert_eq!(col.posts().count(), 2);
        assert_eq!(comp.composites_generated(), 0);
    }

    #[test]
    fn patch_origin_moves_pixels_down() {
        let patches = vec![Some(patch("LOW", 8, 16, 0, 16, 6))];
        let comp =
            TextureCompositor::new(vec![texture("LOWER", 8, 32, &[(0, 16, 0)])], patches, 0)
                .unwrap();
        let col = comp.column(0, 0);
        assert_eq!(col.pixels.len(), 32);
        assert!(col.pixels[..16].iter().all(|p| *p == 0));
        assert!(col.pixels[16..].iter().all(|p| *p == 6));
        assert_eq!(col.posts().next().map(|p| p.top), Some(16));
    }

    #[test]
    fn raised_patch_is_still_zero_copy() {
        let patches = vec![Some(patch("TALL", 8, 40, 0, 40, 9))];
        let comp =
            TextureCompositor::new(vec![texture("RAISED", 8, 32, &[(0, -8, 0)])], patches, 0)
                .unwrap();
        let col = comp.column(0, 2);
        assert_eq!(col.pixels.len(), 32);
        let lump = comp.patches[0].as_ref().unwrap().column_data(2);
        // Rows above the texture top are skipped
        assert!(std::ptr::eq(col.pixels.as_ptr(), lump[3 + 8..].as_ptr()));
    }

    #[test]
    fn uncovered_column_is_an_error() {
        let patches = vec![Some(patch("NARROW", 32, 16, 0, 16, 1))];
        let err = TextureCompositor::new(vec![texture("WIDE", 64, 16, &[(0, 0, 0)])], patches, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            TextureError::ColumnWithoutPatch { column: 32, .. }
        ));
    }

    #[test]
    fn bad_patch_index() {
        let patches = vec![Some(patch("ONLY", 8, 8, 0, 8, 1))];
        let err = TextureCompositor::new(vec![texture("BAD", 8, 8, &[(0, 0, 3)])], patches, 0)
            .unwrap_err();
        assert!(matches!(err, TextureError::BadPatchIndex { index: 3, count: 1, .. }));

        let err = TextureCompositor::new(vec![texture("GONE", 8, 8, &[(0, 0, 0)])], vec![None], 0)
            .unwrap_err();
        assert!(matches!(err, TextureError::MissingPatch { .. }));
    }

    #[test]
    fn composite_over_64k() {
        let patches = vec![Some(patch("TALL", 600, 128, 0, 128, 1))];
        let err = TextureCompositor::new(
            vec![texture("HUGE", 600, 128, &[(0, 0, 0), (0, 0, 0)])],
            patches,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, TextureError::CompositeTooLarge { .. }));
    }

    #[test]
    fn unprepared_composite_draws_placeholder() {
        let patches = vec![Some(patch("A", 8, 16, 0, 16, 5))];
        let mut comp = TextureCompositor::new(
            vec![texture("TWICE", 8, 16, &[(0, 0, 0), (4, 0, 0)])],
            patches,
            1 << 20,
        )
        .unwrap();
        let col = comp.column(0, 6);
        assert_eq!(col.pixels.len(), 16);
        assert!(col.pixels.iter().all(|p| *p == 0));
        assert_eq!(col.posts().count(), 0);
        // Columns 0..4 only have the first patch
        assert_eq!(comp.column(0, 1).pixels[0], 5);

        comp.prepare(0);
        assert_eq!(comp.column(0, 6).pixels[0], 5);
    }

    #[test]
    fn invalidate_regenerates() {
        let patches = vec![Some(patch("A", 8, 16, 0, 16, 5))];
        let mut comp = TextureCompositor::new(
            vec![texture("TWICE", 8, 16, &[(0, 0, 0), (4, 0, 0)])],
            patches,
            1 << 20,
        )
        .unwrap();
        comp.prepare(0);
        comp.prepare(0);
        assert_eq!(comp.composites_generated(), 1);
        // Still resident in later frames while under budget
        comp.begin_frame();
        comp.prepare(0);
        assert_eq!(comp.composites_generated(), 1);
        comp.invalidate(0);
        assert_eq!(comp.cached_bytes(), 0);
        comp.prepare(0);
        assert_eq!(comp.composites_generated(), 2);
        comp.invalidate_all();
        assert_eq!(comp.cached_bytes(), 0);
        comp.prepare(0);
        assert_eq!(comp.composites_generated(), 3);
    }

    #[test]
    fn evicted_under_budget_pressure() {
        let patches = vec![Some(patch("A", 8, 16, 0, 16, 5))];
        let defs = vec![
            texture("ONE", 8, 16, &[(0, 0, 0), (4, 0, 0)]),
            texture("TWO", 8, 16, &[(0, 0, 0), (2, 0, 0)]),
        ];
        // Room for one composite but not both
        let mut comp = TextureCompositor::new(defs, patches, 300).unwrap();
        comp.begin_frame();
        comp.prepare(0);
        comp.prepare(1);
        // Both pinned for the frame
        assert_eq!(comp.column(0, 5).pixels[0], 5);
        assert_eq!(comp.column(1, 5).pixels[0], 5);

        // ONE was least recently used so it went, TWO stayed
        comp.begin_frame();
        comp.prepare(1);
        assert_eq!(comp.composites_generated(), 2);
        comp.begin_frame();
        comp.prepare(0);
        assert_eq!(comp.composites_generated(), 3);
    }

    #[test]
    fn lookup_by_name() {
        let patches = vec![Some(patch("A", 8, 8, 0, 8, 5))];
        let comp = TextureCompositor::new(
            vec![texture("STARTAN3", 8, 8, &[(0, 0, 0)]), texture("SKY1", 8, 8, &[(0, 0, 0)])],
            patches,
            0,
        )
        .unwrap();
        assert_eq!(comp.texture_num_for_name("sky1"), Some(1));
        assert_eq!(comp.texture_num_for_name("NOPE"), None);
    }
}
