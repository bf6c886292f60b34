use cbumi_io_rs::alignment::{self, Format};
use cbumi_splitter_rs::{split_file, validate_partitions, HandlePolicy};
use clap::Parser;
use eyre::{ensure, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Split aligned reads into one file per cell barcode.
///
/// Read names must look like `<CB>_<UMI>_<ordinal>_<mate>`; the CB picks the partition
/// `<outdir>/<input stem>_<CB>.<sam|bam>`. Every partition starts with the input header. Reads
/// with malformed names are counted and skipped.
///
/// The header is parsed and written back out, so its lines come out grouped in the order
/// `@HD`, `@SQ`, `@RG`, `@PG`, `@CO`. A header that interleaves them differently will not be
/// reproduced byte for byte, although every line is kept.
#[derive(Parser, Debug)]
pub struct Split {
    /// Input SAM/BAM file
    input: PathBuf,

    /// Output directory for the partitions
    #[arg(short = 'o', long = "outdir", default_value = "split_bam_files_sam")]
    outdir: PathBuf,

    /// Partition format
    #[arg(long, default_value = "sam")]
    format: Format,

    /// Open, append to and close the partition for every read instead of keeping all partitions
    /// open. Slow, but works for any number of barcodes. SAM only.
    #[arg(long, conflicts_with = "max_open")]
    reopen: bool,

    /// Abort if more than this many partitions would be open at the same time
    #[arg(long)]
    max_open: Option<NonZeroUsize>,

    /// Re-read all partitions after splitting and check their headers and record counts
    #[arg(long)]
    validate: bool,
}

impl Split {
    fn policy(&self) -> HandlePolicy {
        if self.reopen {
            HandlePolicy::Reopen
        } else {
            HandlePolicy::KeepOpen {
                max_open: self.max_open,
            }
        }
    }

    pub fn execute(&self) -> Result<()> {
        ensure!(
            self.input.is_file(),
            "Input file {} doesn't exist",
            self.input.display()
        );
        ensure!(
            !self.reopen || self.format == Format::Sam,
            "--reopen requires the SAM partition format"
        );

        let routing = split_file(&self.input, &self.outdir, self.format, self.policy())?;
        if routing.partitions().is_empty() {
            log::warn!(
                "No routable reads in {}, nothing was written",
                self.input.display()
            );
        }

        if self.validate {
            let header = alignment::Reader::from_path(&self.input)?.into_header();
            validate_partitions(&routing, &header)?;
        }
        Ok(())
    }
}
