//! Per-container read tag counting.
//!
//! The tag of a read is the last `_`-separated field of its name. Counts are never merged across
//! containers.

use ahash::AHashMap;
use bstr::ByteSlice;
use cbumi_io_rs::alignment;
use cbumi_io_rs::ReadRecord;
use derive_getters::Getters;
use eyre::{ensure, Result, WrapErr};
use itertools::Itertools;
use noodles::sam::alignment::RecordBuf;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Tag used for records without a name.
pub const MISSING_NAME_TAG: &[u8] = b"*";

/// Last `_`-separated field of a read name.
pub fn tag_of(name: &[u8]) -> &[u8] {
    match memchr::memrchr(b'_', name) {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    counts: AHashMap<Vec<u8>, u64>,
    total: u64,
}

impl TagCounts {
    pub fn add(&mut self, name: Option<&[u8]>) {
        let tag = name.map_or(MISSING_NAME_TAG, tag_of);
        match self.counts.get_mut(tag) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(tag.to_vec(), 1);
            }
        }
        self.total += 1;
    }

    /// Count the tags of all records in the stream.
    pub fn from_reader<R>(reader: &mut R) -> Result<Self>
    where
        R: ReadRecord<Record = RecordBuf> + ?Sized,
    {
        let mut counts = Self::default();
        let mut record = RecordBuf::default();
        while reader.read_record(&mut record)? {
            counts.add(record.name().map(|x| x.as_bytes()));
        }
        Ok(counts)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = alignment::Reader::from_path(path)?;
        Self::from_reader(&mut reader)
            .wrap_err_with(|| format!("Failed to count read tags in {}", path.display()))
    }

    pub fn get(&self, tag: &[u8]) -> u64 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Number of distinct tags.
    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    /// Number of counted records.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Tags ordered by descending count, then by tag.
    pub fn sorted(&self) -> Vec<(&[u8], u64)> {
        self.counts
            .iter()
            .map(|(tag, count)| (tag.as_slice(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .collect()
    }

    /// `tag<TAB>count` table with a header row.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "tag\tcount")?;
        for (tag, count) in self.sorted() {
            writer.write_all(tag)?;
            writeln!(writer, "\t{count}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Files in `dir` (not recursive) whose name ends with `suffix`, in sorted order.
pub fn discover(dir: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    ensure!(dir.is_dir(), "Directory {} doesn't exist", dir.display());

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .wrap_err_with(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|x| x.to_str())
            .is_some_and(|x| x.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sample label taken from the text between two markers in the file name, e.g. with the default
/// markers `x_cc3_srtn_AAAA.deduplicated.srt.bam` is labeled `AAAA`. Names without the markers are
/// labeled with the file name minus its last extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct MarkerLabel {
    start: String,
    end: String,
}

impl Default for MarkerLabel {
    fn default() -> Self {
        Self::new("_cc3_srtn_", ".deduplicated")
    }
}

impl MarkerLabel {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn label(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|x| x.to_string_lossy())
            .unwrap_or_default();

        let between = name.find(&self.start).and_then(|start| {
            let rest = &name[start + self.start.len()..];
            rest.find(&self.end).map(|end| &rest[..end])
        });
        match between {
            Some(label) => label.to_string(),
            None => path
                .file_stem()
                .map(|x| x.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.into_owned()),
        }
    }
}

/// Counting results for a single container.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ContainerSummary {
    path: PathBuf,
    label: String,
    counts: TagCounts,
}

/// Counts read tags in independent containers on a thread pool.
pub struct Aggregator<L> {
    pool: ThreadPool,
    labeler: L,
    detail_dir: Option<PathBuf>,
}

impl<L> Aggregator<L>
where
    L: Fn(&Path) -> String + Sync,
{
    pub fn new(pool: ThreadPool, labeler: L) -> Self {
        Self {
            pool,
            labeler,
            detail_dir: None,
        }
    }

    /// Write detail tables into this directory instead of next to each container.
    pub fn set_detail_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.detail_dir = Some(dir.into());
        self
    }

    /// `<container file name>.reads.info.txt`
    pub fn detail_path(&self, container: &Path) -> PathBuf {
        let mut name = container
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".reads.info.txt");

        match &self.detail_dir {
            Some(dir) => dir.join(name),
            None => container.with_file_name(name),
        }
    }

    /// Count every container and write its detail table. Results follow the input order.
    pub fn run(&self, containers: &[PathBuf]) -> Result<Vec<ContainerSummary>> {
        if let Some(dir) = &self.detail_dir {
            std::fs::create_dir_all(dir)
                .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
        }
        self.pool.install(|| {
            containers
                .par_iter()
                .map(|path| self.process(path))
                .collect()
        })
    }

    fn process(&self, path: &Path) -> Result<ContainerSummary> {
        let counts = TagCounts::from_path(path)?;

        let detail = self.detail_path(path);
        let file = File::create(&detail)
            .wrap_err_with(|| format!("Failed to create {}", detail.display()))?;
        counts
            .write_tsv(BufWriter::new(file))
            .wrap_err_with(|| format!("Failed to write {}", detail.display()))?;

        let label = (self.labeler)(path);
        log::info!(
            "{}: {} reads, {} unique tags",
            label,
            counts.total(),
            counts.unique()
        );
        Ok(ContainerSummary {
            path: path.to_path_buf(),
            label,
            counts,
        })
    }
}

/// Corpus summary: `label<TAB>unique_tag_count<TAB>total_read_count` with a header row.
pub fn write_summary<W: Write>(mut writer: W, summaries: &[ContainerSummary]) -> Result<()> {
    writeln!(writer, "label\tunique_tag_count\ttotal_read_count")?;
    for summary in summaries {
        writeln!(
            writer,
            "{}\t{}\t{}",
            summary.label,
            summary.counts.unique(),
            summary.counts.total()
        )?;
    }
    writer.flush()?;
    Ok(())
}
