use log::debug;
use lru::LruCache;

/// A generated multi-patch texture: dense pixel columns plus the same columns
/// re-encoded as posts.
#[derive(Debug)]
pub(crate) struct Composite {
    pub pixels: Vec<u8>,
    pub posts: Vec<u8>,
    /// Start of each texture column's posts in `posts`. Only meaningful for
    /// composite columns.
    pub post_offsets: Vec<u32>,
}

impl Composite {
    pub fn size(&self) -> usize {
        self.pixels.len() + self.posts.len() + self.post_offsets.len() * 4
    }
}

struct Entry {
    composite: Composite,
    last_frame: u64,
}

/// Least recently used composites go first once the byte budget is exceeded.
/// Anything used during the current frame is pinned until the next
/// `begin_frame` so columns handed out earlier in the frame stay valid.
pub(crate) struct CompositeCache {
    entries: LruCache<usize, Entry>,
    bytes: usize,
    budget: usize,
    frame: u64,
}

impl CompositeCache {
    pub fn new(budget: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            bytes: 0,
            budget,
            frame: 0,
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.evict();
    }

    #[inline]
    pub fn get(&self, texture: usize) -> Option<&Composite> {
        self.entries.peek(&texture).map(|e| &e.composite)
    }

    /// Mark as used this frame. Returns false if not resident.
    pub fn touch(&mut self, texture: usize) -> bool {
        let frame = self.frame;
        match self.entries.get_mut(&texture) {
            Some(entry) => {
                entry.last_frame = frame;
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, texture: usize, composite: Composite) {
        self.remove(texture);
        self.bytes += composite.size();
        self.entries.put(
            texture,
            Entry {
                composite,
                last_frame: self.frame,
            },
        );
        self.evict();
    }

    pub fn remove(&mut self, texture: usize) {
        if let Some(entry) = self.entries.pop(&texture) {
            self.bytes -= entry.composite.size();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes = 0;
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn evict(&mut self) {
        while self.bytes > self.budget {
            let pinned = self
                .entries
                .peek_lru()
                .is_none_or(|(_, e)| e.last_frame == self.frame);
            if pinned {
                break;
            }
            if let Some((oldest, entry)) = self.entries.pop_lru() {
                self.bytes -= entry.composite.size();
                debug!("Evicted composite for texture {oldest}, {} bytes cached", self.bytes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Composite, CompositeCache};

    fn composite(size: usize) -> Composite {
        Composite {
            pixels: vec![0; size],
            posts: Vec::new(),
            post_offsets: Vec::new(),
        }
    }

    #[test]
    fn pinned_for_the_frame() {
        let mut cache = CompositeCache::new(100);
        cache.insert(1, composite(80));
        cache.insert(2, composite(80));
        // Both used this frame, over budget but nothing may go
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.bytes(), 160);

        cache.begin_frame();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
    }

    #[test]
    fn least_recent_goes_first() {
        let mut cache = CompositeCache::new(200);
        cache.insert(1, composite(80));
        cache.insert(2, composite(80));
        cache.begin_frame();
        assert!(cache.touch(1));
        cache.insert(3, composite(80));
        assert!(cache.get(2).is_none());
        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_some());
        assert!(!cache.touch(2));
    }

    #[test]
    fn replacing_keeps_the_byte_count() {
        let mut cache = CompositeCache::new(1000);
        cache.insert(1, composite(10));
        cache.insert(2, composite(10));
        cache.insert(1, composite(30));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.bytes(), 40);
        cache.remove(2);
        assert_eq!(cache.bytes(), 30);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.bytes(), 0);
    }

    #[test]
    fn only_touch_counts_as_use() {
        let mut cache = CompositeCache::new(200);
        cache.insert(1, composite(80));
        cache.insert(2, composite(80));
        cache.begin_frame();
        // Reading during drawing must not reorder
        assert!(cache.get(1).is_some());
        assert!(cache.touch(2));
        cache.insert(3, composite(80));
        assert!(cache.get(1).is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.bytes(), 160);
    }
}
