use super::{phred::Phred, record::Record};
use crate::compression::encode;
use crate::traits::WriteRecord;
use derive_getters::Dissolve;
use eyre::{Result, WrapErr};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub type FileWriter = Writer<BufWriter<encode::Stream<File>>>;

/// FASTQ writer producing single-line 4-line records with an empty '+' separator line.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Dissolve)]
pub struct Writer<W> {
    writer: W,
    phred: Phred,
    buffer: Vec<u8>,
}

impl<W> Writer<W> {
    pub fn new(writer: W, phred: Phred) -> Self {
        Self {
            writer,
            phred,
            buffer: Vec::new(),
        }
    }
}

impl Writer<()> {
    /// Create (or truncate) the file at the given path. The compression is inferred from the
    /// extension.
    pub fn from_path(path: impl AsRef<Path>, phred: Phred) -> Result<FileWriter> {
        let stream = encode::infer_from_path(path)?;
        Ok(Writer::new(BufWriter::new(stream), phred))
    }
}

impl FileWriter {
    /// Flush all buffered records and write the compression trailer. Must be called once all
    /// records are written, otherwise the output is incomplete.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer
            .get_mut()
            .try_finish()
            .wrap_err("Failed to finalize the FASTQ output")?;
        Ok(())
    }
}

impl<W: Write> WriteRecord for Writer<W> {
    type Record = Record;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        self.buffer.clear();
        self.phred.encode_into(record.qual(), &mut self.buffer)?;

        self.writer.write_all(b"@")?;
        self.writer.write_all(record.name().as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.write_all(record.seq())?;
        self.writer.write_all(b"\n+\n")?;
        self.writer.write_all(&self.buffer)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
