use derive_getters::Getters;
use derive_more::Into;
use eyre::{ensure, Result};

/// DEFLATE compression level, 0 (store) to 9 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Getters, Into)]
pub struct Deflate {
    level: u8,
}

impl Deflate {
    pub const FAST: Deflate = Deflate { level: 1 };
    pub const DEFAULT: Deflate = Deflate { level: 6 };
    pub const BEST: Deflate = Deflate { level: 9 };

    pub fn new(level: u8) -> Result<Self> {
        ensure!(level <= 9, "Invalid DEFLATE compression level: {}", level);
        Ok(Self { level })
    }

    pub(super) fn compression(&self) -> flate2::Compression {
        flate2::Compression::new(self.level as u32)
    }
}

impl Default for Deflate {
    fn default() -> Self {
        Deflate::DEFAULT
    }
}
