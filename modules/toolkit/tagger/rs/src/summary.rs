use crate::mate1::Mate1Stats;
use crate::mate2::Mate2Stats;
use derive_getters::Getters;
use std::fmt::{Display, Formatter};

/// Final report of a tagging run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct Summary {
    mate1: Mate1Stats,
    mate2: Mate2Stats,
    barcodes: usize,
}

impl Summary {
    pub fn new(mate1: Mate1Stats, mate2: Mate2Stats, barcodes: usize) -> Self {
        Self {
            mate1,
            mate2,
            barcodes,
        }
    }

    /// Fraction of mate-1 reads that passed the whitelist. Zero if no reads were seen.
    pub fn acceptance_ratio(&self) -> f64 {
        crate::ratio(*self.mate1.accepted(), *self.mate1.seen())
    }

    /// Fraction of mate-2 reads that found their mate. Zero if no reads were seen.
    pub fn pairing_ratio(&self) -> f64 {
        crate::ratio(*self.mate2.accepted(), *self.mate2.seen())
    }

    pub fn log(&self) {
        for line in self.to_string().lines() {
            log::info!("{line}");
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let m1 = &self.mate1;
        let m2 = &self.mate2;
        let seen = *m1.seen();
        writeln!(f, "Mate-1 reads seen: {seen}")?;
        writeln!(
            f,
            "Mate-1 reads accepted: {} ({:.2}%)",
            m1.accepted(),
            self.acceptance_ratio() * 100.0
        )?;
        writeln!(
            f,
            "Mate-1 reads rejected: {} ({:.2}%)",
            m1.rejected(),
            crate::ratio(m1.rejected(), seen) * 100.0
        )?;
        writeln!(
            f,
            "  too short for CB+UMI: {} ({:.2}%)",
            m1.too_short(),
            crate::ratio(*m1.too_short(), seen) * 100.0
        )?;
        writeln!(
            f,
            "  barcode not whitelisted: {} ({:.2}%)",
            m1.not_whitelisted(),
            crate::ratio(*m1.not_whitelisted(), seen) * 100.0
        )?;
        writeln!(f, "Duplicated mate-1 identities: {}", m1.duplicate_ids())?;
        writeln!(f, "Mate-2 reads seen: {}", m2.seen())?;
        writeln!(
            f,
            "Mate-2 reads accepted: {} ({:.2}%)",
            m2.accepted(),
            self.pairing_ratio() * 100.0
        )?;
        writeln!(
            f,
            "Mate-2 reads without a mate: {} ({:.2}%)",
            m2.missing_mate(),
            crate::ratio(*m2.missing_mate(), *m2.seen()) * 100.0
        )?;
        write!(f, "Distinct cell barcodes: {}", self.barcodes)
    }
}
