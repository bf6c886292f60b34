use derive_getters::Getters;
use eyre::{ensure, Result};
use std::fmt::{Display, Formatter};

/// Position of the cell barcode (CB) and the unique molecular identifier (UMI) inside a read.
///
/// The CB occupies the first `cb_len` bases and the UMI immediately follows it. Anything after
/// the UMI is left untouched.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Getters)]
pub struct BarcodeLayout {
    cb_len: usize,
    umi_len: usize,
}

impl BarcodeLayout {
    pub const DEFAULT_CB_LEN: usize = 17;
    pub const DEFAULT_UMI_LEN: usize = 12;

    pub fn new(cb_len: usize, umi_len: usize) -> Result<Self> {
        ensure!(cb_len > 0, "Cell barcode length must be positive");
        ensure!(umi_len > 0, "UMI length must be positive");
        Ok(Self { cb_len, umi_len })
    }

    /// Minimal sequence length required to carry both the CB and the UMI.
    pub fn min_len(&self) -> usize {
        self.cb_len + self.umi_len
    }

    /// Slice the CB and the UMI out of the sequence. Returns `None` if the sequence is too short.
    pub fn split<'a>(&self, seq: &'a [u8]) -> Option<(&'a [u8], &'a [u8])> {
        if seq.len() < self.min_len() {
            return None;
        }
        let (cb, rest) = seq.split_at(self.cb_len);
        Some((cb, &rest[..self.umi_len]))
    }
}

impl Default for BarcodeLayout {
    fn default() -> Self {
        Self {
            cb_len: Self::DEFAULT_CB_LEN,
            umi_len: Self::DEFAULT_UMI_LEN,
        }
    }
}

impl Display for BarcodeLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CB[{}]+UMI[{}]", self.cb_len, self.umi_len)
    }
}
