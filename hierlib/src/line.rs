/// A single storage slot of a cache level or auxiliary buffer
///
/// The payload is sized to the block but never read by the simulation; lookups only ever look at
/// the tag and the valid bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub dirty: bool,
    /// `None` while the line has never held a block
    pub tag: Option<u64>,
    pub last_access_time: u64,
    pub data: Box<[u64]>,
}

impl CacheLine {
    /// Creates an empty, invalid line with a payload of `block_size` words
    pub fn new(block_size: u64) -> Self {
        Self {
            valid: false,
            dirty: false,
            tag: None,
            last_access_time: 0,
            data: vec![0; block_size as usize].into_boxed_slice(),
        }
    }

    /// Creates a valid line already holding `tag`, as built by the coordinator for its buffers
    pub fn holding(tag: u64, block_size: u64, dirty: bool) -> Self {
        Self {
            valid: true,
            dirty,
            tag: Some(tag),
            ..Self::new(block_size)
        }
    }

    /// True when this line is valid and holds the block identified by `tag`
    #[inline]
    pub fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == Some(tag)
    }

    /// Overwrites the slot with a freshly installed block
    pub(crate) fn install(&mut self, tag: u64, time: u64, dirty: bool) {
        self.valid = true;
        self.tag = Some(tag);
        self.last_access_time = time;
        self.dirty = dirty;
    }

    /// Marks the line as just used, setting dirty on writes. Never clears dirty
    pub(crate) fn touch(&mut self, time: u64, is_write: bool) {
        self.last_access_time = time;
        if is_write {
            self.dirty = true;
        }
    }
}
