use std::fmt::Display;

/// Which end of a paired-end fragment a read was sequenced from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum Mate {
    #[default]
    First = 1,
    Second = 2,
}

impl Mate {
    /// Returns the Illumina-style read number used in FASTQ comments ("1" or "2").
    pub fn symbol(&self) -> &'static str {
        match self {
            Mate::First => "1",
            Mate::Second => "2",
        }
    }

    pub fn other(&self) -> Mate {
        match self {
            Mate::First => Mate::Second,
            Mate::Second => Mate::First,
        }
    }
}

impl Display for Mate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
