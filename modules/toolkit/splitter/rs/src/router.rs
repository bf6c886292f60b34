use ahash::AHashMap;
use bstr::ByteSlice;
use cbumi_io_rs::alignment::{self, Format};
use cbumi_io_rs::{ReadRecord, WriteRecord};
use derive_getters::Getters;
use eyre::{bail, ensure, eyre, Result, WrapErr};
use itertools::Itertools;
use noodles::sam;
use noodles::sam::alignment::RecordBuf;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Minimal number of `_`-separated fields in a routable read name: `<CB>_<UMI>_<ordinal>_<mate>`.
pub const MIN_NAME_FIELDS: usize = 4;

/// How the router manages per-barcode output handles.
///
/// `KeepOpen` keeps one writer per barcode for the whole run and closes them all at the end. It is
/// the fast option and the natural one when the barcode cardinality is bounded by a whitelist. An
/// optional cap turns descriptor exhaustion into a clean error.
///
/// `Reopen` opens, appends and closes the partition for every record. Any number of barcodes can
/// be routed with a single descriptor, at the cost of throughput. Only plain SAM partitions can be
/// reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlePolicy {
    KeepOpen { max_open: Option<NonZeroUsize> },
    Reopen,
}

impl Default for HandlePolicy {
    fn default() -> Self {
        HandlePolicy::KeepOpen { max_open: None }
    }
}

/// Extract the cell barcode (first field) from a read name. Returns `None` for names with too few
/// fields or for barcodes that can't be used as a file name component.
pub fn parse_barcode(name: &[u8]) -> Option<&str> {
    let mut fields = name.split_str("_");
    let cb = fields.next()?;
    if fields.take(MIN_NAME_FIELDS - 1).count() < MIN_NAME_FIELDS - 1 {
        return None;
    }

    let cb = std::str::from_utf8(cb).ok()?;
    if cb.is_empty() || cb == "." || cb == ".." || cb.contains(['/', '\\']) {
        return None;
    }
    Some(cb)
}

/// A single per-barcode output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct Partition {
    barcode: String,
    path: PathBuf,
    records: u64,
}

/// Outcome of a routing run. Partitions are sorted by barcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Routing {
    seen: u64,
    routed: u64,
    unroutable: u64,
    partitions: Vec<Partition>,
}

struct Slot {
    partition: Partition,
    writer: Option<alignment::Writer>,
}

/// Routes aligned records into per-barcode partitions `<outdir>/<stem>_<CB>.<ext>`.
///
/// Every partition starts with the source header, written once when the partition is created.
/// Partitions are never truncated after creation. Writers are closed in [`Router::finish`]; a
/// router dropped without finishing leaves its partitions incomplete.
pub struct Router {
    outdir: PathBuf,
    stem: String,
    format: Format,
    policy: HandlePolicy,
    header: Arc<sam::Header>,
    slots: AHashMap<String, Slot>,
    open: usize,
    seen: u64,
    routed: u64,
    unroutable: u64,
}

impl Router {
    pub fn new(
        outdir: impl Into<PathBuf>,
        stem: impl Into<String>,
        format: Format,
        policy: HandlePolicy,
        header: Arc<sam::Header>,
    ) -> Result<Self> {
        ensure!(
            policy != HandlePolicy::Reopen || format == Format::Sam,
            "Partitions can be reopened for appending only in the SAM format"
        );

        let outdir = outdir.into();
        std::fs::create_dir_all(&outdir)
            .wrap_err_with(|| format!("Failed to create output directory {}", outdir.display()))?;

        Ok(Self {
            outdir,
            stem: stem.into(),
            format,
            policy,
            header,
            slots: AHashMap::new(),
            open: 0,
            seen: 0,
            routed: 0,
            unroutable: 0,
        })
    }

    pub fn partition_path(&self, barcode: &str) -> PathBuf {
        self.outdir
            .join(format!("{}_{}.{}", self.stem, barcode, self.format.extension()))
    }

    /// Route a single record. Returns `false` if the record was unroutable and skipped.
    pub fn route(&mut self, record: &RecordBuf) -> Result<bool> {
        self.seen += 1;
        let name = record.name().map(|x| x.as_bytes()).unwrap_or_default();
        let Some(barcode) = parse_barcode(name) else {
            if self.unroutable == 0 {
                log::warn!(
                    "Skipping read {:?}: expected at least {} '_'-separated fields starting with a cell barcode",
                    name.as_bstr(),
                    MIN_NAME_FIELDS
                );
            } else {
                log::debug!("Skipping unroutable read {:?}", name.as_bstr());
            }
            self.unroutable += 1;
            return Ok(false);
        };

        match self.slots.get_mut(barcode) {
            Some(slot) => Self::append(slot, &self.header, record)?,
            None => {
                let slot = self.create(barcode, record)?;
                self.slots.insert(barcode.to_owned(), slot);
            }
        }
        self.routed += 1;
        Ok(true)
    }

    fn create(&mut self, barcode: &str, record: &RecordBuf) -> Result<Slot> {
        if let HandlePolicy::KeepOpen {
            max_open: Some(max_open),
        } = self.policy
        {
            if self.open >= max_open.get() {
                bail!(
                    "Reached the limit of {} simultaneously open partitions at barcode {}; \
                     rerun with a higher limit or reopen partitions per record",
                    max_open,
                    barcode
                );
            }
        }

        let path = self.partition_path(barcode);
        log::debug!("New partition {}", path.display());
        let mut writer = alignment::Writer::create(&path, self.format, self.header.clone())
            .wrap_err_with(|| format!("Failed to create partition {}", path.display()))?;
        writer.write_record(record)?;

        let writer = match self.policy {
            HandlePolicy::KeepOpen { .. } => {
                self.open += 1;
                Some(writer)
            }
            HandlePolicy::Reopen => {
                writer.finish()?;
                None
            }
        };

        Ok(Slot {
            partition: Partition {
                barcode: barcode.to_owned(),
                path,
                records: 1,
            },
            writer,
        })
    }

    fn append(slot: &mut Slot, header: &Arc<sam::Header>, record: &RecordBuf) -> Result<()> {
        match &mut slot.writer {
            Some(writer) => writer.write_record(record)?,
            None => {
                let path = &slot.partition.path;
                let mut writer = alignment::Writer::append(path, header.clone())?;
                writer.write_record(record)?;
                writer
                    .finish()
                    .wrap_err_with(|| format!("Failed to append to {}", path.display()))?;
            }
        }
        slot.partition.records += 1;
        Ok(())
    }

    /// Number of distinct barcodes routed so far.
    pub fn partitions(&self) -> usize {
        self.slots.len()
    }

    /// Close every partition and report the routing counters.
    pub fn finish(self) -> Result<Routing> {
        let mut partitions = Vec::with_capacity(self.slots.len());
        for (_, slot) in self.slots.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            if let Some(writer) = slot.writer {
                writer.finish().wrap_err_with(|| {
                    format!("Failed to finalize partition {}", slot.partition.path.display())
                })?;
            }
            partitions.push(slot.partition);
        }

        Ok(Routing {
            seen: self.seen,
            routed: self.routed,
            unroutable: self.unroutable,
            partitions,
        })
    }
}

/// Split an alignment file into per-barcode partitions inside `outdir`.
pub fn split_file(
    input: impl AsRef<Path>,
    outdir: impl AsRef<Path>,
    format: Format,
    policy: HandlePolicy,
) -> Result<Routing> {
    let input = input.as_ref();
    ensure!(input.is_file(), "Input file {} doesn't exist", input.display());
    let stem = Format::stem(input)
        .ok_or_else(|| eyre!("Can't derive the partition prefix from {}", input.display()))?;

    let mut reader = alignment::Reader::from_path(input)?;
    let header = Arc::new(reader.header().clone());
    let mut router = Router::new(outdir.as_ref(), stem, format, policy, header)?;

    let mut record = RecordBuf::default();
    while reader
        .read_record(&mut record)
        .wrap_err_with(|| format!("Failed to read {}", input.display()))?
    {
        router.route(&record)?;
    }

    let routing = router.finish()?;
    log::info!(
        "Routed {} of {} reads from {} into {} partitions ({} unroutable)",
        routing.routed,
        routing.seen,
        input.display(),
        routing.partitions.len(),
        routing.unroutable
    );
    Ok(routing)
}
