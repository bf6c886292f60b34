use super::{phred::Phred, record::Record, validate};
use crate::compression::decode;
use crate::traits::ReadRecord;
use derive_getters::Dissolve;
use eyre::{ensure, Result, WrapErr};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub type FileReader = Reader<BufReader<decode::Stream<File>>>;

/// A strict FASTQ reader that parses a single 4-line record at a time. Ignores:
/// - Carriage return characters at the end of all lines (to support Windows line endings)
/// - A missing newline after the last quality line
///
/// Returns an error if there are:
/// - Errors while reading from the underlying reader (including truncated compressed streams)
/// - Extra characters before the first record, between records, or after the last record
/// - A separator line that doesn't start with '+' or repeats a different title
/// - Invalid characters in the sequence or quality symbols outside the encoding range
/// - Sequence and quality lines of different lengths
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Dissolve)]
pub struct Reader<R> {
    reader: R,
    phred: Phred,
    line: Vec<u8>,
}

impl Reader<()> {
    /// Create a new FASTQ reader from the given file path.
    /// The compression is detected from the file signature.
    pub fn from_path(path: impl AsRef<Path>, phred: Phred) -> Result<FileReader> {
        let path = path.as_ref();
        let stream = decode::infer_from_path(path)?;
        Reader::new(BufReader::new(stream), phred)
            .wrap_err_with(|| format!("Failed to open FASTQ file {}", path.display()))
    }
}

fn trim_newline(line: &mut Vec<u8>) -> bool {
    let terminated = line.last() == Some(&b'\n');
    if terminated {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    terminated
}

impl<R: BufRead> Reader<R> {
    pub fn new(mut reader: R, phred: Phred) -> Result<Self> {
        // Check that there are no extra characters before the first record
        let buffer = reader.fill_buf()?;
        ensure!(
            buffer.first().map(|x| *x == b'@').unwrap_or(true),
            "Expected '@' at the start of the FASTQ file"
        );
        Ok(Self {
            reader,
            phred,
            line: Vec::new(),
        })
    }

    pub fn phred(&self) -> Phred {
        self.phred
    }

    #[inline(always)]
    fn read_parts(&mut self, record: &mut Record) -> Result<bool> {
        // Ensure that the next symbol is '@' and consume it
        let buffer = self.reader.fill_buf()?;
        if buffer.is_empty() {
            return Ok(false);
        }
        ensure!(
            buffer[0] == b'@',
            "Expected '@' at the start of the FASTQ record, found {:?}",
            buffer[0] as char
        );
        self.reader.consume(1);

        // SAFETY: All fields are validated below before the record is handed back to the caller
        let (name, seq, qual) = unsafe { record.raw() };

        // Title line
        name.clear();
        let read = self.reader.read_line(name)?;
        ensure!(read > 0, "Unexpected EOF after '@'");
        ensure!(
            name.ends_with('\n'),
            "FASTQ title line is truncated: {name}"
        );
        name.pop();
        if name.ends_with('\r') {
            name.pop();
        }
        validate::name(name)?;

        // Sequence line
        seq.clear();
        self.reader.read_until(b'\n', seq)?;
        ensure!(
            trim_newline(seq),
            "Truncated FASTQ record (sequence line) for {name}"
        );
        validate::seq(seq)?;

        // Separator line
        self.line.clear();
        self.reader.read_until(b'\n', &mut self.line)?;
        ensure!(
            trim_newline(&mut self.line),
            "Truncated FASTQ record (separator line) for {name}"
        );
        ensure!(
            self.line.first() == Some(&b'+'),
            "Expected '+' separator line for {name}"
        );
        ensure!(
            self.line.len() == 1 || &self.line[1..] == name.as_bytes(),
            "Separator line doesn't match the title for {name}"
        );

        // Quality line, the trailing newline is optional for the last record
        qual.clear();
        self.reader.read_until(b'\n', qual)?;
        trim_newline(qual);
        validate::qual(seq, qual).wrap_err_with(|| format!("Malformed FASTQ record {name}"))?;
        self.phred
            .decode(qual)
            .wrap_err_with(|| format!("Malformed FASTQ record {name}"))?;

        Ok(true)
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Record;

    /// Parse the next FASTQ record into the given [Record] buffer.
    /// Returns false if there are no more records to read.
    ///
    /// On error, the buffer is left in an unspecified state and the stream can't be resumed.
    fn read_record(&mut self, buf: &mut Self::Record) -> Result<bool> {
        self.read_parts(buf)
    }

    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize> {
        let mut total = 0;

        // Read into the existing buffer
        for record in into.iter_mut() {
            if !self.read_record(record)? {
                return Ok(total);
            }
            total += 1;
        }

        // Append to the buffer
        loop {
            let mut record = Record::default();
            if !self.read_record(&mut record)? {
                return Ok(total);
            }
            into.push(record);
            total += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Report;
    use std::io::{Cursor, Write};

    fn read_all(content: &str, phred: Phred) -> Result<Vec<Record>> {
        let mut reader = Reader::new(Cursor::new(content), phred)?;
        let mut records = Vec::new();
        reader.read_to_end(&mut records)?;
        Ok(records)
    }

    #[test]
    fn test_empty_fastq() -> Result<()> {
        assert!(read_all("", Phred::Sanger)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_valid_fastq() -> Result<()> {
        for content in [
            "@r1 1:N:0:1\nACGT\n+\n!+5I\n@r2\nNN\n+r2\n##\n",
            "@r1 1:N:0:1\r\nACGT\r\n+\r\n!+5I\r\n@r2\r\nNN\r\n+\r\n##",
            "@r1 1:N:0:1\nACGT\n+r1 1:N:0:1\n!+5I\n@r2\nNN\n+\n##\n",
        ] {
            let records = read_all(content, Phred::Sanger)?;
            assert_eq!(
                records,
                vec![
                    ("r1 1:N:0:1", "ACGT", vec![0, 10, 20, 40]).try_into()?,
                    ("r2", "NN", vec![2, 2]).try_into()?,
                ],
                "Content: {:?}",
                content
            );
            assert_eq!(records[0].id(), "r1");
        }
        Ok(())
    }

    #[test]
    fn test_invalid_fastq() {
        for content in [
            " ",
            "@",
            "@r1",
            "@r1\nACGT",
            "@r1\nACGT\n",
            "@r1\nACGT\n+\n",
            "@r1\nACGT\n+\nIII\n",
            "@r1\nACGT\n-\nIIII\n",
            "@r1\nACGT\n+r2\nIIII\n",
            "@r1\nAC GT\n+\nIIIII\n",
            "@r1\nACGT\n+\nIIII\n\n",
            "@r1\nACGT\n+\nIIII\nr2\nACGT\n+\nIIII\n",
            "@ r1\nACGT\n+\nIIII\n",
        ] {
            let result = Reader::new(Cursor::new(content), Phred::Sanger).and_then(|mut x| {
                let mut record = Record::default();
                while x.read_record(&mut record)? {}
                Ok::<(), Report>(())
            });
            assert!(result.is_err(), "Content: {:?}", content);
        }
    }

    #[test]
    fn test_phred_offset_is_respected() -> Result<()> {
        let content = "@r1\nACGT\n+\n@AJh\n";
        let records = read_all(content, Phred::Illumina13)?;
        assert_eq!(records[0].qual(), &[0, 1, 10, 40]);

        // '@' is a valid Sanger symbol too, but yields different scores
        let records = read_all(content, Phred::Sanger)?;
        assert_eq!(records[0].qual(), &[31, 32, 41, 71]);

        // Sanger low qualities are invalid for Illumina 1.3
        assert!(read_all("@r1\nA\n+\n!\n", Phred::Illumina13).is_err());
        Ok(())
    }

    #[test]
    fn test_from_gzipped_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reads.fastq.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(std::fs::File::create(&path)?, Default::default());
        encoder.write_all(b"@r1\nACGT\n+\nIIII\n@r2\nTT\n+\n##\n")?;
        encoder.finish()?;

        let mut reader = Reader::from_path(&path, Phred::Sanger)?;
        let mut records = Vec::new();
        assert_eq!(reader.read_to_end(&mut records)?, 2);
        assert_eq!(records[1].id(), "r2");
        Ok(())
    }

    #[test]
    fn test_truncated_gzip_is_an_error() -> Result<()> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), Default::default());
        encoder.write_all(&b"@r1\nACGT\n+\nIIII\n".repeat(1000))?;
        let mut compressed = encoder.finish()?;
        compressed.truncate(compressed.len() / 2);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("truncated.fastq.gz");
        std::fs::write(&path, compressed)?;

        let mut reader = Reader::from_path(&path, Phred::Sanger)?;
        let mut records = Vec::new();
        assert!(reader.read_to_end(&mut records).is_err());
        Ok(())
    }
}
