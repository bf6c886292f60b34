use eyre::{Result, WrapErr};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// gzip member header (10 bytes) + XLEN (2 bytes) + the BGZF "BC" subfield id
const SIGNATURE_LEN: u64 = 14;
const FEXTRA: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Config {
    #[default]
    Plain,
    Gzip,
    Bgzf,
}

impl Config {
    /// Pick the decoder from the leading bytes of a stream. Gzip members carrying the BGZF extra
    /// subfield are decoded as BGZF, any other gzip data as multi-member gzip.
    pub fn infer_from_signature(bytes: &[u8]) -> Self {
        if !infer::archive::is_gz(bytes) {
            return Config::Plain;
        }
        let bgzf = bytes.len() >= SIGNATURE_LEN as usize
            && bytes[3] & FEXTRA != 0
            && &bytes[12..14] == b"BC";
        if bgzf {
            Config::Bgzf
        } else {
            Config::Gzip
        }
    }

    /// Inspect the file signature. The extension is ignored: a plain file named `*.gz` is read
    /// as-is.
    pub fn infer_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut signature = Vec::with_capacity(SIGNATURE_LEN as usize);
        File::open(path)
            .and_then(|file| file.take(SIGNATURE_LEN).read_to_end(&mut signature))
            .wrap_err_with(|| format!("Failed to inspect {}", path.display()))?;
        Ok(Self::infer_from_signature(&signature))
    }
}
