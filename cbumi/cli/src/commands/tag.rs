use cbumi_core_rs::ngs::BarcodeLayout;
use cbumi_io_rs::fastq::Phred;
use cbumi_tagger_rs::{HeaderIndex, PairedPaths, Tagger, Whitelist};
use clap::Parser;
use eyre::Result;
use std::path::PathBuf;

/// Move the CB and UMI from mate-1 sequences into the read names of both mates.
///
/// Mate-1 reads whose cell barcode is not whitelisted (or that are too short to carry the CB and
/// the UMI) are dropped together with their mates. Accepted pairs are renamed to
/// `<id>_<CB>_<UMI> <mate>:N:0:<UMI>`.
#[derive(Parser, Debug)]
pub struct Tag {
    /// Mate-1 FASTQ, plain or gzip-compressed
    #[arg(short = 'i', long = "r1-in")]
    r1_in: PathBuf,

    /// Mate-2 FASTQ, plain or gzip-compressed
    #[arg(short = 'I', long = "r2-in")]
    r2_in: PathBuf,

    /// Tagged mate-1 output; compressed when the name ends with .gz or .bgz
    #[arg(short = 'o', long = "r1-out")]
    r1_out: PathBuf,

    /// Tagged mate-2 output; compressed when the name ends with .gz or .bgz
    #[arg(short = 'O', long = "r2-out")]
    r2_out: PathBuf,

    /// Cell barcode whitelist, one barcode per line
    #[arg(long = "cb")]
    whitelist: PathBuf,

    /// Prefix of the per-barcode read count table (<prefix>_cell_barcode_info.txt)
    #[arg(short = 'p', long = "prefix")]
    prefix: PathBuf,

    /// Cell barcode length
    #[arg(long, default_value_t = BarcodeLayout::DEFAULT_CB_LEN)]
    cb_len: usize,

    /// UMI length
    #[arg(long, default_value_t = BarcodeLayout::DEFAULT_UMI_LEN)]
    umi_len: usize,

    /// Quality encoding offset (33 or 64)
    #[arg(long, default_value = "33")]
    phred: Phred,

    /// Warn when the in-memory identity index grows beyond this many bytes
    #[arg(long, default_value_t = HeaderIndex::DEFAULT_SOFT_LIMIT)]
    index_soft_limit: usize,
}

impl Tag {
    pub fn execute(&self) -> Result<()> {
        let layout = BarcodeLayout::new(self.cb_len, self.umi_len)?;
        let paths = PairedPaths::new(
            &self.r1_in,
            &self.r2_in,
            &self.r1_out,
            &self.r2_out,
            &self.prefix,
        );
        paths.validate()?;
        let whitelist = Whitelist::from_path(&self.whitelist)?;

        let mut tagger = Tagger::new(layout);
        tagger
            .set_phred(self.phred)
            .set_index_soft_limit(self.index_soft_limit);
        tagger.run(&paths, &whitelist)?;
        Ok(())
    }
}
