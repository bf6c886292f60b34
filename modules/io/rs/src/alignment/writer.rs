use super::format::Format;
use crate::compression::encode;
use crate::traits::WriteRecord;
use eyre::{ensure, Result, WrapErr};
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::RecordBuf;
use noodles::{bam, bgzf, sam};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

enum Inner {
    Sam(sam::io::Writer<BufWriter<encode::Stream<File>>>),
    Bam(bam::io::Writer<bgzf::io::Writer<File>>),
}

/// SAM/BAM writer bound to a shared header. The header is shared between writers to keep many
/// simultaneously open outputs cheap.
pub struct Writer {
    inner: Inner,
    header: Arc<sam::Header>,
}

impl Writer {
    /// Create (or truncate) the output and write the header block before anything else.
    pub fn create(path: impl AsRef<Path>, format: Format, header: Arc<sam::Header>) -> Result<Self> {
        let path = path.as_ref();
        let inner = match format {
            Format::Sam => {
                let stream = encode::infer_from_path(path)?;
                let mut writer = sam::io::Writer::new(BufWriter::new(stream));
                writer.write_header(&header)?;
                Inner::Sam(writer)
            }
            Format::Bam => {
                let file = File::create(path)
                    .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
                let mut writer = bam::io::Writer::new(file);
                writer.write_header(&header)?;
                Inner::Bam(writer)
            }
        };
        Ok(Self { inner, header })
    }

    /// Open an existing plain SAM output for appending records. No header is written: the file is
    /// expected to be created earlier by [`Writer::create`].
    pub fn append(path: impl AsRef<Path>, header: Arc<sam::Header>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            encode::Config::infer_from_path(path) == encode::Config::Plain,
            "Only uncompressed SAM outputs can be appended to: {}",
            path.display()
        );
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Failed to reopen {}", path.display()))?;
        let stream = encode::Stream::new(file, encode::Config::Plain);
        let writer = sam::io::Writer::new(BufWriter::new(stream));
        Ok(Self {
            inner: Inner::Sam(writer),
            header,
        })
    }

    pub fn header(&self) -> &sam::Header {
        &self.header
    }

    /// Flush buffered records and terminate the container (BGZF EOF marker for BAM).
    pub fn finish(mut self) -> Result<()> {
        match &mut self.inner {
            Inner::Sam(writer) => {
                writer.get_mut().flush()?;
                writer.get_mut().get_mut().try_finish()?;
            }
            Inner::Bam(writer) => {
                writer.get_mut().try_finish()?;
            }
        }
        Ok(())
    }
}

impl WriteRecord for Writer {
    type Record = RecordBuf;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        match &mut self.inner {
            Inner::Sam(writer) => writer.write_alignment_record(&self.header, record)?,
            Inner::Bam(writer) => writer.write_alignment_record(&self.header, record)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match &mut self.inner {
            Inner::Sam(writer) => writer.get_mut().flush()?,
            Inner::Bam(writer) => writer.get_mut().flush()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Reader;
    use crate::ReadRecord;
    use bstr::BString;

    fn records(names: &[&str]) -> Vec<RecordBuf> {
        names
            .iter()
            .map(|x| RecordBuf::builder().set_name(BString::from(*x)).build())
            .collect()
    }

    fn names(records: &[RecordBuf]) -> Vec<String> {
        records
            .iter()
            .map(|x| x.name().map(|n| n.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_alignment_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let header = Arc::new(sam::Header::default());
        let expected = records(&["AAAA_UMI_1_R1", "CCCC_UMI_2_R2"]);

        for (fname, format) in [
            ("out.sam", Format::Sam),
            ("out.sam.gz", Format::Sam),
            ("out.bam", Format::Bam),
        ] {
            let path = dir.path().join(fname);
            let mut writer = Writer::create(&path, format, header.clone())?;
            writer.write_records(&expected)?;
            writer.finish()?;

            let mut parsed = Vec::new();
            Reader::from_path(&path)?.read_to_end(&mut parsed)?;
            assert_eq!(names(&parsed), names(&expected), "File: {}", fname);
        }
        Ok(())
    }

    #[test]
    fn test_append_keeps_single_header() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("partition.sam");
        let header: sam::Header = "@HD\tVN:1.6\tSO:unsorted\n".parse()?;
        let header = Arc::new(header);

        let mut writer = Writer::create(&path, Format::Sam, header.clone())?;
        writer.write_records(&records(&["r1"]))?;
        writer.finish()?;

        for name in ["r2", "r3"] {
            let mut writer = Writer::append(&path, header.clone())?;
            writer.write_records(&records(&[name]))?;
            writer.finish()?;
        }

        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with("@HD\tVN:1.6\tSO:unsorted\n"));
        assert_eq!(content.matches("@HD").count(), 1);

        let mut parsed = Vec::new();
        Reader::from_path(&path)?.read_to_end(&mut parsed)?;
        assert_eq!(names(&parsed), ["r1", "r2", "r3"]);

        // Compressed or binary outputs can't be reopened
        assert!(Writer::append(dir.path().join("x.sam.gz"), header.clone()).is_err());
        Ok(())
    }
}
