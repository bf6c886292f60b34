use super::validate;
use derive_getters::{Dissolve, Getters};
use eyre::Result;
use std::error::Error;

/// A single FASTQ record with the following guarantees:
/// - The title (`name`) is a non-empty UTF-8 string without newlines that starts with the read
///   identity, i.e. the identity is never empty.
/// - The sequence contains only ASCII letters (or '.' for no-calls) and may be empty.
/// - Quality scores are stored as numeric Phred values, one per base.
///
/// The textual encoding of the quality scores is a property of the reader/writer, not the record.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Dissolve, Getters)]
pub struct Record {
    name: String,
    seq: Vec<u8>,
    qual: Vec<u8>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            name: "Default ID".to_string(),
            seq: b"ACGT".to_vec(),
            qual: vec![40; 4],
        }
    }
}

impl<NAME, SEQ, QUAL> TryFrom<(NAME, SEQ, QUAL)> for Record
where
    NAME: TryInto<String, Error: Error + Send + Sync + 'static>,
    SEQ: TryInto<Vec<u8>, Error: Error + Send + Sync + 'static>,
    QUAL: TryInto<Vec<u8>, Error: Error + Send + Sync + 'static>,
{
    type Error = eyre::Report;

    fn try_from(value: (NAME, SEQ, QUAL)) -> Result<Self> {
        Self::new(value.0.try_into()?, value.1.try_into()?, value.2.try_into()?)
    }
}

impl Record {
    /// Creates a new FASTQ record from the title, the sequence, and numeric quality scores.
    pub fn new(name: String, seq: Vec<u8>, qual: Vec<u8>) -> Result<Self> {
        Self::validate(&name, &seq, &qual)?;
        Ok(Self { name, seq, qual })
    }

    pub fn validate(name: &str, seq: &[u8], qual: &[u8]) -> Result<()> {
        validate::name(name)?;
        validate::seq(seq)?;
        validate::qual(seq, qual)
    }

    /// Read identity: the title up to the first space or tab.
    pub fn id(&self) -> &str {
        match memchr::memchr2(b' ', b'\t', self.name.as_bytes()) {
            Some(pos) => &self.name[..pos],
            None => &self.name,
        }
    }

    /// Optional description following the read identity, if any.
    pub fn description(&self) -> Option<&str> {
        let id = self.id().len();
        self.name.get(id + 1..).filter(|x| !x.is_empty())
    }

    /// Replace the title, keeping the sequence and the qualities as is.
    pub fn set_name(&mut self, name: String) -> Result<()> {
        validate::name(&name)?;
        self.name = name;
        Ok(())
    }

    /// # Safety
    /// The caller must ensure that all fields remain valid after modification.
    pub unsafe fn raw(&mut self) -> (&mut String, &mut Vec<u8>, &mut Vec<u8>) {
        (&mut self.name, &mut self.seq, &mut self.qual)
    }
}
