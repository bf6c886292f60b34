use eyre::{bail, ensure, Error, Result};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// ASCII offset used to store Phred quality scores in a FASTQ file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phred {
    /// Sanger / Illumina 1.8+ encoding, '!' == Q0
    #[default]
    Sanger,
    /// Illumina 1.3-1.7 encoding, '@' == Q0
    Illumina13,
}

impl Phred {
    // Highest printable ASCII character that may appear in the quality line
    const MAX_SYMBOL: u8 = b'~';

    pub fn offset(&self) -> u8 {
        match self {
            Phred::Sanger => 33,
            Phred::Illumina13 => 64,
        }
    }

    /// Highest score representable under this encoding.
    pub fn max_score(&self) -> u8 {
        Self::MAX_SYMBOL - self.offset()
    }

    /// Decode ASCII quality symbols into numeric scores in place.
    pub fn decode(&self, symbols: &mut [u8]) -> Result<()> {
        let offset = self.offset();
        for (i, x) in symbols.iter_mut().enumerate() {
            ensure!(
                (offset..=Self::MAX_SYMBOL).contains(x),
                "Quality symbol {:?} at index {i} is outside of the Phred+{offset} range",
                *x as char
            );
            *x -= offset;
        }
        Ok(())
    }

    /// Encode numeric scores into ASCII symbols, appending them to the buffer.
    pub fn encode_into(&self, scores: &[u8], into: &mut Vec<u8>) -> Result<()> {
        let offset = self.offset();
        let max = self.max_score();
        into.reserve(scores.len());
        for (i, &x) in scores.iter().enumerate() {
            ensure!(
                x <= max,
                "Quality score {x} at index {i} can't be stored with Phred+{offset}"
            );
            into.push(x + offset);
        }
        Ok(())
    }
}

impl FromStr for Phred {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "33" | "sanger" => Ok(Phred::Sanger),
            "64" | "illumina13" => Ok(Phred::Illumina13),
            _ => bail!("Unknown quality encoding: {s}. Expected 33 or 64"),
        }
    }
}

impl Display for Phred {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phred+{}", self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_strings_survive_decoding() -> Result<()> {
        for (phred, symbols) in [
            (Phred::Sanger, "!\"#IIIJ~5?"),
            (Phred::Sanger, ""),
            (Phred::Illumina13, "@ABhhh~"),
        ] {
            let mut scores = symbols.as_bytes().to_vec();
            phred.decode(&mut scores)?;

            let mut encoded = Vec::new();
            phred.encode_into(&scores, &mut encoded)?;
            assert_eq!(encoded, symbols.as_bytes());
        }
        Ok(())
    }

    #[test]
    fn test_decoded_values() -> Result<()> {
        let mut scores = b"!+5?I".to_vec();
        Phred::Sanger.decode(&mut scores)?;
        assert_eq!(scores, [0, 10, 20, 30, 40]);

        let mut scores = b"@J".to_vec();
        Phred::Illumina13.decode(&mut scores)?;
        assert_eq!(scores, [0, 10]);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        // Sanger-encoded Q0 is below the Illumina 1.3 offset
        assert!(Phred::Illumina13.decode(&mut b"!".to_vec()).is_err());
        assert!(Phred::Sanger.decode(&mut b" ".to_vec()).is_err());
        assert!(Phred::Sanger.decode(&mut vec![127]).is_err());

        let mut buffer = Vec::new();
        assert!(Phred::Illumina13.encode_into(&[63], &mut buffer).is_err());
        assert!(Phred::Sanger.encode_into(&[93], &mut buffer).is_ok());
        assert!(Phred::Sanger.encode_into(&[94], &mut buffer).is_err());
    }

    #[test]
    fn test_parse() -> Result<()> {
        assert_eq!("33".parse::<Phred>()?, Phred::Sanger);
        assert_eq!("64".parse::<Phred>()?, Phred::Illumina13);
        assert!("42".parse::<Phred>().is_err());
        Ok(())
    }
}
