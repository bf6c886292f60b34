use ahash::AHashMap;
use eyre::{Result, WrapErr};
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Number of accepted mate-1 reads per whitelisted cell barcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarcodeCounts {
    counts: AHashMap<Vec<u8>, u64>,
}

impl BarcodeCounts {
    pub fn add(&mut self, barcode: &[u8]) {
        match self.counts.get_mut(barcode) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(barcode.to_vec(), 1);
            }
        }
    }

    pub fn get(&self, barcode: &[u8]) -> u64 {
        self.counts.get(barcode).copied().unwrap_or(0)
    }

    /// Number of distinct barcodes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Barcodes ordered by descending count; ties are ordered by ascending barcode.
    pub fn sorted(&self) -> Vec<(&[u8], u64)> {
        self.counts
            .iter()
            .map(|(barcode, count)| (barcode.as_slice(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .collect()
    }

    /// Write the table as `barcode<TAB>count` lines without a header.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> Result<()> {
        for (barcode, count) in self.sorted() {
            writer.write_all(barcode)?;
            writeln!(writer, "\t{count}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
        self.write_tsv(BufWriter::new(file))
            .wrap_err_with(|| format!("Failed to write the barcode table {}", path.display()))
    }
}
