use super::format::Format;
use crate::compression::decode;
use crate::traits::ReadRecord;
use eyre::{Result, WrapErr};
use noodles::sam::alignment::RecordBuf;
use noodles::{bam, bgzf, sam};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

enum Inner {
    Bam(bam::io::Reader<bgzf::io::Reader<File>>),
    Sam(sam::io::Reader<BufReader<decode::Stream<File>>>),
}

/// Sequential reader over a SAM or BAM container. The header is parsed once when the reader is
/// opened; records are then decoded one by one in file order.
pub struct Reader {
    inner: Inner,
    header: sam::Header,
}

impl Reader {
    /// Open the container, picking the format from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::open(path, Format::infer_from_path(path))
            .wrap_err_with(|| format!("Failed to open alignment file {}", path.display()))
    }

    fn open(path: &Path, format: Format) -> Result<Self> {
        let (inner, header) = match format {
            Format::Bam => {
                let mut reader = bam::io::Reader::new(File::open(path)?);
                let header = reader.read_header()?;
                (Inner::Bam(reader), header)
            }
            Format::Sam => {
                let stream = decode::infer_from_path(path)?;
                let mut reader = sam::io::Reader::new(BufReader::new(stream));
                let header = reader.read_header()?;
                (Inner::Sam(reader), header)
            }
        };
        Ok(Self { inner, header })
    }

    pub fn header(&self) -> &sam::Header {
        &self.header
    }

    /// Textual representation of the header block.
    pub fn header_text(&self) -> Result<String> {
        super::header_text(&self.header)
    }

    pub fn into_header(self) -> sam::Header {
        self.header
    }
}

impl ReadRecord for Reader {
    type Record = RecordBuf;

    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool> {
        let read = match &mut self.inner {
            Inner::Bam(reader) => reader.read_record_buf(&self.header, into)?,
            Inner::Sam(reader) => reader.read_record_buf(&self.header, into)?,
        };
        Ok(read > 0)
    }

    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize> {
        let mut total = 0;
        loop {
            let mut record = RecordBuf::default();
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
    use crate::alignment::Writer;
    use std::sync::Arc;

    const HEADER: &str = "@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:chr1\tLN:100\n@CO\tsplit by barcode\n";

    #[test]
    fn test_header_text() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let header: sam::Header = HEADER.parse()?;
        let header = Arc::new(header);

        for fname in ["x.sam", "x.bam"] {
            let path = dir.path().join(fname);
            Writer::create(&path, Format::infer_from_path(&path), header.clone())?.finish()?;

            let reader = Reader::from_path(&path)?;
            assert_eq!(reader.header(), header.as_ref(), "File: {}", fname);
            assert_eq!(reader.header_text()?, HEADER, "File: {}", fname);
            assert_eq!(crate::alignment::header_text(&reader.into_header())?, HEADER);
        }

        let plain = std::fs::read_to_string(dir.path().join("x.sam"))?;
        assert_eq!(plain, HEADER);
        Ok(())
    }
}
