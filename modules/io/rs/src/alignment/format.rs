use eyre::{bail, Error, Result};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Format {
    /// Plain text SAM, optionally gzip-compressed
    #[default]
    Sam,
    /// BGZF-compressed binary BAM
    Bam,
}

impl Format {
    pub fn infer_from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|x| x.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bam") => Format::Bam,
            _ => Format::Sam,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Sam => "sam",
            Format::Bam => "bam",
        }
    }

    /// File name without the alignment extension(s): `x.bam` -> `x`, `x.sam.gz` -> `x`.
    pub fn stem(path: impl AsRef<Path>) -> Option<String> {
        let name = path.as_ref().file_name()?.to_str()?;
        let stem = [".sam.gz", ".bam", ".sam"]
            .iter()
            .find_map(|ext| name.strip_suffix(ext))
            .unwrap_or(name);
        Some(stem.to_string())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sam" => Ok(Format::Sam),
            "bam" => Ok(Format::Bam),
            _ => bail!("Unknown alignment format: {}", s),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
