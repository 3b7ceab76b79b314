//! Vertical clipping for windows/portals. Each column keeps the last row
//! covered from the top and the first row covered from the bottom; walls only
//! ever tighten them during a frame.

pub struct ClipState {
    /// Clip values are the solid pixel bounding the range.
    ///  floorclip starts out view height
    ///  ceilingclip starts out -1
    floorclip: Vec<i16>,
    ceilingclip: Vec<i16>,
    view_height: i16,
}

impl ClipState {
    pub fn new(screen_width: usize, view_height: usize) -> Self {
        let view_height = view_height.min(i16::MAX as usize) as i16;
        ClipState {
            floorclip: vec![view_height; screen_width],
            ceilingclip: vec![-1; screen_width],
            view_height,
        }
    }

    /// R_ClearClipSegs part: fully open every column
    pub fn clear(&mut self) {
        self.floorclip.fill(self.view_height);
        self.ceilingclip.fill(-1);
    }

    pub fn view_height(&self) -> i16 {
        self.view_height
    }

    pub fn width(&self) -> usize {
        self.floorclip.len()
    }

    #[inline]
    pub fn ceiling(&self, x: i32) -> i32 {
        self.ceilingclip[x as usize] as i32
    }

    #[inline]
    pub fn floor(&self, x: i32) -> i32 {
        self.floorclip[x as usize] as i32
    }

    /// Lower the ceiling clip to `row`. Never raises it and never passes the
    /// floor clip.
    #[inline]
    pub fn clip_ceiling(&mut self, x: i32, row: i32) {
        let x = x as usize;
        let floor = self.floorclip[x] as i32;
        let ceil = &mut self.ceilingclip[x];
        *ceil = row.clamp(*ceil as i32, floor) as i16;
    }

    /// Raise the floor clip to `row`. Never lowers it and never passes the
    /// ceiling clip.
    #[inline]
    pub fn clip_floor(&mut self, x: i32, row: i32) {
        let x = x as usize;
        let ceil = self.ceilingclip[x] as i32;
        let floor = &mut self.floorclip[x];
        *floor = row.clamp(ceil, *floor as i32) as i16;
    }

    /// A solid wall filled the column. Both clips meet so nothing else draws
    /// here this frame.
    #[inline]
    pub fn close(&mut self, x: i32) {
        let x = x as usize;
        self.ceilingclip[x] = self.floorclip[x];
    }

    /// No rows left between the clips
    #[inline]
    pub fn is_closed(&self, x: i32) -> bool {
        self.ceiling(x) + 1 >= self.floor(x)
    }

    pub fn ceiling_range(&self, x1: i32, x2: i32) -> &[i16] {
        &self.ceilingclip[x1 as usize..=x2 as usize]
    }

    pub fn floor_range(&self, x1: i32, x2: i32) -> &[i16] {
        &self.floorclip[x1 as usize..=x2 as usize]
    }
}
