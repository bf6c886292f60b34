use ahash::AHashSet;
use cbumi_io_rs::compression::decode;
use eyre::{ensure, Result, WrapErr};
use itertools::Itertools;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The set of cell barcodes accepted in a run. Immutable once loaded, so a single instance can be
/// shared by reference between concurrent runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Whitelist {
    barcodes: AHashSet<Vec<u8>>,
}

impl Whitelist {
    /// Build the whitelist from text lines. Surrounding whitespace is trimmed and empty lines are
    /// ignored. Fails if no barcode is left.
    pub fn from_lines<T: AsRef<str>>(lines: impl IntoIterator<Item = T>) -> Result<Self> {
        let barcodes: AHashSet<Vec<u8>> = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim();
                (!line.is_empty()).then(|| line.as_bytes().to_vec())
            })
            .collect();
        ensure!(!barcodes.is_empty(), "Whitelist doesn't contain any barcodes");
        Ok(Self { barcodes })
    }

    /// Load the whitelist from a plain or gzip-compressed text file, one barcode per line.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = decode::infer_from_path(path)?;
        let lines: Vec<String> = BufReader::new(stream)
            .lines()
            .collect::<std::io::Result<_>>()
            .wrap_err_with(|| format!("Failed to read the whitelist {}", path.display()))?;

        let whitelist = Self::from_lines(lines)
            .wrap_err_with(|| format!("Invalid whitelist {}", path.display()))?;
        log::info!(
            "Loaded {} whitelisted barcodes from {}",
            whitelist.len(),
            path.display()
        );
        Ok(whitelist)
    }

    pub fn contains(&self, barcode: &[u8]) -> bool {
        self.barcodes.contains(barcode)
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    /// Distinct barcode lengths present in the whitelist, in ascending order.
    pub fn lengths(&self) -> Vec<usize> {
        self.barcodes.iter().map(|x| x.len()).unique().sorted().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_lines() -> Result<()> {
        let whitelist = Whitelist::from_lines(["AAAA", "", "  CCCC  ", "AAAA", "GG\r"])?;
        assert_eq!(whitelist.len(), 3);
        assert!(whitelist.contains(b"AAAA"));
        assert!(whitelist.contains(b"CCCC"));
        assert!(whitelist.contains(b"GG"));
        assert!(!whitelist.contains(b"TTTT"));
        assert_eq!(whitelist.lengths(), [2, 4]);
        Ok(())
    }

    #[test]
    fn test_empty_whitelist_is_an_error() {
        assert!(Whitelist::from_lines(Vec::<String>::new()).is_err());
        assert!(Whitelist::from_lines(["", "  ", "\t"]).is_err());
    }

    #[test]
    fn test_from_path() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let plain = dir.path().join("whitelist.txt");
        std::fs::write(&plain, "AAAA\nCCCC\n\n")?;
        assert_eq!(Whitelist::from_path(&plain)?.len(), 2);

        let gzipped = dir.path().join("whitelist.txt.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(std::fs::File::create(&gzipped)?, Default::default());
        encoder.write_all(b"AAAA\nCCCC\nGGGG")?;
        encoder.finish()?;
        assert_eq!(Whitelist::from_path(&gzipped)?.len(), 3);

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "\n\n")?;
        assert!(Whitelist::from_path(&empty).is_err());

        assert!(Whitelist::from_path(dir.path().join("missing.txt")).is_err());
        Ok(())
    }
}
