//! Scratch space for per column values kept past the seg that made them:
//! sprite clip silhouettes and masked texture columns. Ranges are handed out
//! as start indices, so growing the pool never disturbs what was stored.

use log::debug;

pub struct OpeningsPool {
    openings: Vec<i16>,
    last: usize,
}

impl OpeningsPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            openings: vec![0; capacity.max(1)],
            last: 0,
        }
    }

    /// Everything handed out is forgotten
    pub fn clear(&mut self) {
        self.last = 0;
    }

    /// Reserve `len` values, returning the start index
    pub fn alloc(&mut self, len: usize) -> usize {
        let start = self.last;
        let needed = start + len;
        if needed > self.openings.len() {
            let mut size = self.openings.len();
            while size < needed {
                size *= 2;
            }
            self.openings.resize(size, 0);
            debug!("Openings grown to {size}");
        }
        self.last = needed;
        start
    }

    /// Copy `values` in, returning the start index
    pub fn push_slice(&mut self, values: &[i16]) -> usize {
        let start = self.alloc(values.len());
        self.openings[start..start + values.len()].copy_from_slice(values);
        start
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<i16> {
        if index < self.last {
            Some(self.openings[index])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: i16) {
        if index < self.last {
            self.openings[index] = value;
        }
    }

    pub fn slice(&self, start: usize, len: usize) -> &[i16] {
        let end = (start + len).min(self.last);
        &self.openings[start.min(end)..end]
    }

    /// Values handed out this frame
    pub fn len(&self) -> usize {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    pub fn capacity(&self) -> usize {
        self.openings.len()
    }
}
