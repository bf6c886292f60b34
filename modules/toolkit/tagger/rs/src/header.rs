use ahash::AHashMap;
use cbumi_core_rs::ngs::Mate;
use derive_more::{Display, Into};
use eyre::{ensure, Result};

/// Rewritten FASTQ title for a read whose barcode passed the whitelist:
/// `{id}_{CB}_{UMI} 1:N:0:{UMI}`. The leading '@' is added by the FASTQ writer.
///
/// Only the mate marker (the character right after the first space) differs between mates, so a
/// single instance is rendered for both of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Into)]
#[display("{text}")]
pub struct EncodedHeader {
    text: Box<str>,
}

impl EncodedHeader {
    pub fn new(id: &str, cb: &[u8], umi: &[u8]) -> Result<Self> {
        ensure!(!id.is_empty(), "Read identity must not be empty");
        let cb = std::str::from_utf8(cb)?;
        let umi = std::str::from_utf8(umi)?;
        let text = format!("{id}_{cb}_{umi} {}:N:0:{umi}", Mate::First.symbol());
        Ok(Self {
            text: text.into_boxed_str(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Title for the given mate.
    pub fn for_mate(&self, mate: Mate) -> String {
        match mate {
            Mate::First => self.text.to_string(),
            Mate::Second => {
                // The text always has a space followed by the marker, see `new`.
                let marker = self.text.find(' ').map_or(self.text.len(), |x| x + 1);
                let mut result = String::with_capacity(self.text.len());
                result.push_str(&self.text[..marker]);
                result.push_str(mate.symbol());
                result.push_str(self.text.get(marker + 1..).unwrap_or_default());
                result
            }
        }
    }

    fn heap_size(&self) -> usize {
        self.text.len()
    }
}

/// Mapping from mate-1 read identity to its encoded header, built while filtering mate 1 and
/// consumed while synchronizing mate 2.
///
/// The index is memory-resident. Its approximate footprint is tracked and a warning is logged
/// once when it crosses the soft limit; the run itself is never aborted because of it.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    entries: AHashMap<Box<str>, EncodedHeader>,
    bytes: usize,
    soft_limit: usize,
    warned: bool,
}

impl HeaderIndex {
    /// Default soft memory limit for the index, in bytes.
    pub const DEFAULT_SOFT_LIMIT: usize = 4 * 1024 * 1024 * 1024;

    // Rough per-entry cost of the hash table slot and two boxed strings
    const ENTRY_OVERHEAD: usize = 48;

    pub fn new(soft_limit: usize) -> Self {
        Self {
            entries: AHashMap::new(),
            bytes: 0,
            soft_limit,
            warned: false,
        }
    }

    /// Insert the header for the given identity. An existing entry is replaced, in which case the
    /// previous header is returned.
    pub fn insert(&mut self, id: &str, header: EncodedHeader) -> Option<EncodedHeader> {
        let added = header.heap_size();
        let previous = match self.entries.get_mut(id) {
            Some(slot) => Some(std::mem::replace(slot, header)),
            None => {
                self.bytes += id.len() + Self::ENTRY_OVERHEAD;
                self.entries.insert(id.into(), header);
                None
            }
        };
        self.bytes += added;
        if let Some(previous) = &previous {
            self.bytes -= previous.heap_size();
        }

        if !self.warned && self.bytes > self.soft_limit {
            self.warned = true;
            log::warn!(
                "Identity index exceeds the soft memory limit: ~{} bytes used for {} reads (limit: {} bytes)",
                self.bytes,
                self.entries.len(),
                self.soft_limit
            );
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&EncodedHeader> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate memory footprint of the index, in bytes.
    pub fn approx_bytes(&self) -> usize {
        self.bytes
    }

    pub fn exceeded_soft_limit(&self) -> bool {
        self.warned
    }
}

impl Default for HeaderIndex {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SOFT_LIMIT)
    }
}
