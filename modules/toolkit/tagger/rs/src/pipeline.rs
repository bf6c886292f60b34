use crate::mate1::WhitelistFilter;
use crate::mate2::synchronize;
use crate::summary::Summary;
use crate::whitelist::Whitelist;
use cbumi_core_rs::ngs::BarcodeLayout;
use cbumi_io_rs::fastq::{self, Phred};
use derive_getters::Getters;
use eyre::{ensure, Result, WrapErr};
use std::ffi::OsString;
use std::path::PathBuf;

/// Inputs and outputs of a single tagging run.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PairedPaths {
    mate1: PathBuf,
    mate2: PathBuf,
    out1: PathBuf,
    out2: PathBuf,
    prefix: PathBuf,
}

impl PairedPaths {
    pub fn new(
        mate1: impl Into<PathBuf>,
        mate2: impl Into<PathBuf>,
        out1: impl Into<PathBuf>,
        out2: impl Into<PathBuf>,
        prefix: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mate1: mate1.into(),
            mate2: mate2.into(),
            out1: out1.into(),
            out2: out2.into(),
            prefix: prefix.into(),
        }
    }

    /// `<prefix>_cell_barcode_info.txt`
    pub fn barcode_table(&self) -> PathBuf {
        let mut name = OsString::from(self.prefix.as_os_str());
        name.push("_cell_barcode_info.txt");
        PathBuf::from(name)
    }

    /// Check that both inputs exist and that no output overwrites an input.
    pub fn validate(&self) -> Result<()> {
        for input in [&self.mate1, &self.mate2] {
            ensure!(input.is_file(), "Input file {} doesn't exist", input.display());
        }
        ensure!(
            self.mate1 != self.mate2,
            "Mate-1 and mate-2 inputs must be different files"
        );
        ensure!(
            self.out1 != self.out2,
            "Mate-1 and mate-2 outputs must be different files"
        );
        for output in [&self.out1, &self.out2] {
            ensure!(
                output != &self.mate1 && output != &self.mate2,
                "Output {} would overwrite an input file",
                output.display()
            );
        }
        Ok(())
    }
}

/// Paired-end tagging run: whitelist filtering of mate 1 followed by mate-2 synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Tagger {
    layout: BarcodeLayout,
    phred: Phred,
    index_soft_limit: usize,
}

impl Default for Tagger {
    fn default() -> Self {
        Self::new(BarcodeLayout::default())
    }
}

impl Tagger {
    pub fn new(layout: BarcodeLayout) -> Self {
        Self {
            layout,
            phred: Phred::default(),
            index_soft_limit: crate::HeaderIndex::DEFAULT_SOFT_LIMIT,
        }
    }

    pub fn set_phred(&mut self, phred: Phred) -> &mut Self {
        self.phred = phred;
        self
    }

    pub fn set_index_soft_limit(&mut self, bytes: usize) -> &mut Self {
        self.index_soft_limit = bytes;
        self
    }

    pub fn run(&self, paths: &PairedPaths, whitelist: &Whitelist) -> Result<Summary> {
        paths.validate()?;
        if !whitelist.lengths().contains(self.layout.cb_len()) {
            log::warn!(
                "No whitelisted barcode has the expected length {} (found lengths: {:?})",
                self.layout.cb_len(),
                whitelist.lengths()
            );
        }

        log::info!(
            "Tagging {} with layout {} ({})",
            paths.mate1().display(),
            self.layout,
            self.phred
        );
        let mut reader = fastq::Reader::from_path(paths.mate1(), self.phred)?;
        let mut writer = fastq::Writer::from_path(paths.out1(), self.phred)?;
        let (index, counts, mate1) = WhitelistFilter::new(whitelist, self.layout)
            .set_index_soft_limit(self.index_soft_limit)
            .run(&mut reader, &mut writer)
            .wrap_err_with(|| format!("Failed to process {}", paths.mate1().display()))?
            .dissolve();
        writer.finish()?;
        drop(reader);

        let table = paths.barcode_table();
        counts.write_to_path(&table)?;
        log::info!(
            "Wrote {} cell barcodes to {}",
            counts.len(),
            table.display()
        );

        log::info!("Synchronizing {}", paths.mate2().display());
        let mut reader = fastq::Reader::from_path(paths.mate2(), self.phred)?;
        let mut writer = fastq::Writer::from_path(paths.out2(), self.phred)?;
        let mate2 = synchronize(&mut reader, &mut writer, index)
            .wrap_err_with(|| format!("Failed to process {}", paths.mate2().display()))?;
        writer.finish()?;

        let summary = Summary::new(mate1, mate2, counts.len());
        summary.log();
        Ok(summary)
    }
}
