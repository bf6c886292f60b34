use crate::header::HeaderIndex;
use cbumi_core_rs::ngs::Mate;
use cbumi_io_rs::fastq::Record;
use cbumi_io_rs::{ReadRecord, WriteRecord};
use derive_getters::Getters;
use eyre::{Result, WrapErr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct Mate2Stats {
    seen: u64,
    accepted: u64,
    missing_mate: u64,
}

/// Tag mate-2 reads using the index built from their mates.
///
/// Reads are processed in input order, independently of the mate-1 order. Reads whose identity is
/// absent from the index are dropped and counted. The index is consumed and released when the
/// pass completes.
pub fn synchronize<R, W>(reader: &mut R, writer: &mut W, index: HeaderIndex) -> Result<Mate2Stats>
where
    R: ReadRecord<Record = Record> + ?Sized,
    W: WriteRecord<Record = Record> + ?Sized,
{
    let mut stats = Mate2Stats::default();
    let mut record = Record::default();

    while reader
        .read_record(&mut record)
        .wrap_err("Failed to read a mate-2 record")?
    {
        stats.seen += 1;
        let Some(header) = index.get(record.id()) else {
            log::debug!("No mate-1 entry for {}", record.id());
            stats.missing_mate += 1;
            continue;
        };

        record.set_name(header.for_mate(Mate::Second))?;
        writer
            .write_record(&record)
            .wrap_err("Failed to write a mate-2 record")?;
        stats.accepted += 1;
    }
    writer.flush()?;

    debug_assert_eq!(stats.accepted + stats.missing_mate, stats.seen);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::EncodedHeader;
    use cbumi_io_rs::fastq::{Phred, Reader, Writer};
    use std::io::Cursor;

    fn index(entries: &[(&str, &str, &str)]) -> Result<HeaderIndex> {
        let mut index = HeaderIndex::default();
        for (id, cb, umi) in entries {
            index.insert(id, EncodedHeader::new(id, cb.as_bytes(), umi.as_bytes())?);
        }
        Ok(index)
    }

    fn run(input: &str, index: HeaderIndex) -> Result<(String, Mate2Stats)> {
        let mut reader = Reader::new(Cursor::new(input.as_bytes()), Phred::Sanger)?;
        let mut writer = Writer::new(Vec::new(), Phred::Sanger);
        let stats = synchronize(&mut reader, &mut writer, index)?;
        let (output, _, _) = writer.dissolve();
        Ok((String::from_utf8(output)?, stats))
    }

    #[test]
    fn test_missing_mate_is_dropped() -> Result<()> {
        let index = index(&[("read1", "AAAA", "TT")])?;
        let input = "@read7 2:N:0:ACGT\nGGGG\n+\nIIII\n\
                     @read1 2:N:0:ACGT\nCCCC\n+\nI#I#\n";
        let (output, stats) = run(input, index)?;

        assert_eq!(output, "@read1_AAAA_TT 2:N:0:TT\nCCCC\n+\nI#I#\n");
        assert!(!output.contains("read7"));
        assert_eq!(*stats.seen(), 2);
        assert_eq!(*stats.accepted(), 1);
        assert_eq!(*stats.missing_mate(), 1);
        Ok(())
    }

    #[test]
    fn test_mate2_order_is_kept() -> Result<()> {
        let index = index(&[("a", "AAAA", "TT"), ("b", "CCCC", "GG"), ("c", "GGGG", "AA")])?;
        let input = "@c\nA\n+\nI\n@x\nA\n+\nI\n@a\nA\n+\nI\n@b\nA\n+\nI\n@y\nA\n+\nI\n";
        let (output, stats) = run(input, index)?;

        let titles: Vec<&str> = output.lines().filter(|x| x.starts_with('@')).collect();
        assert_eq!(
            titles,
            [
                "@c_GGGG_AA 2:N:0:AA",
                "@a_AAAA_TT 2:N:0:TT",
                "@b_CCCC_GG 2:N:0:GG"
            ]
        );
        assert_eq!(stats.accepted() + stats.missing_mate(), *stats.seen());
        assert_eq!(*stats.missing_mate(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_index() -> Result<()> {
        let (output, stats) = run("@a\nA\n+\nI\n", HeaderIndex::default())?;
        assert!(output.is_empty());
        assert_eq!(*stats.missing_mate(), 1);
        Ok(())
    }
}
