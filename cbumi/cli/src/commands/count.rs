use cbumi_core_rs::parallelism;
use cbumi_splitter_rs::{discover, write_summary, Aggregator, MarkerLabel};
use clap::Parser;
use eyre::{Result, WrapErr};
use rayon::ThreadPoolBuilder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Count read tags (the last `_`-separated field of read names) in every matching file of a
/// directory.
///
/// Writes a `<file>.reads.info.txt` tag table per file and a summary with one row per file.
#[derive(Parser, Debug)]
pub struct Count {
    /// Directory with the alignment files
    dir: PathBuf,

    /// Summary table
    output: PathBuf,

    /// Only files whose name ends with this suffix are counted
    #[arg(long, default_value = "srt.bam")]
    suffix: String,

    /// The sample label starts after this marker in the file name
    #[arg(long, default_value = "_cc3_srtn_")]
    label_start: String,

    /// The sample label ends before this marker in the file name
    #[arg(long, default_value = ".deduplicated")]
    label_end: String,

    /// Write the per-file tag tables here instead of next to each file
    #[arg(long)]
    detail_dir: Option<PathBuf>,

    /// Worker threads; negative values mean all cores but |N| - 1
    #[arg(short = 't', long, default_value_t = -1, allow_negative_numbers = true)]
    threads: isize,
}

impl Count {
    pub fn execute(&self) -> Result<()> {
        let containers = discover(&self.dir, &self.suffix)?;
        if containers.is_empty() {
            log::warn!(
                "No files ending with '{}' found in {}",
                self.suffix,
                self.dir.display()
            );
            return Ok(());
        }
        log::info!("Counting read tags in {} files", containers.len());

        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism::available(self.threads)?.get())
            .build()?;
        let labeler = MarkerLabel::new(&self.label_start, &self.label_end);
        let mut aggregator = Aggregator::new(pool, |path: &Path| labeler.label(path));
        if let Some(dir) = &self.detail_dir {
            aggregator.set_detail_dir(dir);
        }
        let summaries = aggregator.run(&containers)?;

        let file = File::create(&self.output)
            .wrap_err_with(|| format!("Failed to create {}", self.output.display()))?;
        write_summary(BufWriter::new(file), &summaries)?;
        log::info!("Summary written to {}", self.output.display());
        Ok(())
    }
}
