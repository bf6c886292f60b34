use crate::counts::BarcodeCounts;
use crate::header::{EncodedHeader, HeaderIndex};
use crate::whitelist::Whitelist;
use cbumi_core_rs::ngs::{BarcodeLayout, Mate};
use cbumi_io_rs::fastq::Record;
use cbumi_io_rs::{ReadRecord, WriteRecord};
use derive_getters::{Dissolve, Getters};
use eyre::{Result, WrapErr};

const PROGRESS_EVERY: u64 = 10_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct Mate1Stats {
    seen: u64,
    accepted: u64,
    too_short: u64,
    not_whitelisted: u64,
    duplicate_ids: u64,
}

impl Mate1Stats {
    /// Total number of rejected reads, regardless of the reason.
    pub fn rejected(&self) -> u64 {
        self.too_short + self.not_whitelisted
    }
}

/// Everything the mate-1 pass hands over to the rest of the run.
#[derive(Debug, Dissolve, Getters)]
pub struct Mate1Outcome {
    index: HeaderIndex,
    counts: BarcodeCounts,
    stats: Mate1Stats,
}

/// Filters mate-1 reads by their cell barcode and rewrites the titles of the accepted ones.
#[derive(Debug, Clone, Copy)]
pub struct WhitelistFilter<'a> {
    whitelist: &'a Whitelist,
    layout: BarcodeLayout,
    index_soft_limit: usize,
}

impl<'a> WhitelistFilter<'a> {
    pub fn new(whitelist: &'a Whitelist, layout: BarcodeLayout) -> Self {
        Self {
            whitelist,
            layout,
            index_soft_limit: HeaderIndex::DEFAULT_SOFT_LIMIT,
        }
    }

    pub fn set_index_soft_limit(&mut self, bytes: usize) -> &mut Self {
        self.index_soft_limit = bytes;
        self
    }

    /// Single forward pass over the mate-1 stream.
    ///
    /// A read is accepted if its sequence is long enough to carry the CB and the UMI and its CB is
    /// whitelisted. Accepted reads are written with the encoded header and unchanged
    /// sequence/qualities, and their identity is recorded in the returned index. If an identity
    /// occurs more than once, the last occurrence wins in the index while the barcode table counts
    /// every occurrence.
    pub fn run<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<Mate1Outcome>
    where
        R: ReadRecord<Record = Record> + ?Sized,
        W: WriteRecord<Record = Record> + ?Sized,
    {
        let mut index = HeaderIndex::new(self.index_soft_limit);
        let mut counts = BarcodeCounts::default();
        let mut stats = Mate1Stats::default();

        let mut record = Record::default();
        while reader
            .read_record(&mut record)
            .wrap_err("Failed to read a mate-1 record")?
        {
            stats.seen += 1;
            if stats.seen % PROGRESS_EVERY == 0 {
                log::info!(
                    "Processed {} mate-1 reads, {} accepted",
                    stats.seen,
                    stats.accepted
                );
            }

            let Some((cb, umi)) = self.layout.split(record.seq()) else {
                stats.too_short += 1;
                continue;
            };
            if !self.whitelist.contains(cb) {
                stats.not_whitelisted += 1;
                continue;
            }

            let id = record.id().to_owned();
            let header = EncodedHeader::new(&id, cb, umi)?;
            counts.add(cb);

            record.set_name(header.for_mate(Mate::First))?;
            writer
                .write_record(&record)
                .wrap_err("Failed to write a mate-1 record")?;
            stats.accepted += 1;

            if index.insert(&id, header).is_some() {
                if stats.duplicate_ids == 0 {
                    log::warn!(
                        "Read identity {id} occurs more than once in the mate-1 input; \
                         the last occurrence is used to tag its mate"
                    );
                }
                stats.duplicate_ids += 1;
            }
        }
        writer.flush()?;

        log::debug!(
            "Identity index holds {} reads (~{} bytes)",
            index.len(),
            index.approx_bytes()
        );
        Ok(Mate1Outcome {
            index,
            counts,
            stats,
        })
    }
}
