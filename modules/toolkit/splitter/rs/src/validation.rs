use crate::aggregate::TagCounts;
use crate::router::Routing;
use cbumi_io_rs::alignment::{self, Format};
use cbumi_io_rs::compression::decode;
use eyre::{ensure, Result, WrapErr};
use noodles::sam;
use std::io::Read;
use std::path::Path;

/// Leading bytes of a partition, as many as the expected header text has.
fn leading_text(path: &Path, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len);
    decode::infer_from_path(path)?
        .take(len as u64)
        .read_to_end(&mut buf)
        .wrap_err_with(|| format!("Failed to read partition {}", path.display()))?;
    Ok(buf)
}

/// Re-read every partition and check that it carries the source header and exactly the records
/// the router wrote to it. The header is compared as serialized text: SAM partitions must start
/// with it byte for byte, and the header block of BAM partitions must render to the same text.
pub fn validate_partitions(routing: &Routing, header: &sam::Header) -> Result<()> {
    let expected = alignment::header_text(header)?;
    let mut total = 0;
    for partition in routing.partitions() {
        let path = partition.path();
        let mut reader = alignment::Reader::from_path(path)?;
        let matches = match Format::infer_from_path(path) {
            Format::Sam => leading_text(path, expected.len())? == expected.as_bytes(),
            Format::Bam => reader.header_text()? == expected,
        };
        ensure!(
            matches,
            "Partition {} doesn't start with the source header",
            path.display()
        );

        let counts = TagCounts::from_reader(&mut reader)
            .wrap_err_with(|| format!("Failed to read partition {}", path.display()))?;
        ensure!(
            counts.total() == *partition.records(),
            "Partition {} holds {} records, expected {}",
            path.display(),
            counts.total(),
            partition.records()
        );
        total += counts.total();
    }

    ensure!(
        total == *routing.routed(),
        "Partitions hold {} records in total, expected {}",
        total,
        routing.routed()
    );
    ensure!(
        routing.routed() + routing.unroutable() == *routing.seen(),
        "Routed and unroutable reads don't add up to the number of input reads"
    );
    log::info!(
        "Validated {} partitions with {} records",
        routing.partitions().len(),
        total
    );
    Ok(())
}
