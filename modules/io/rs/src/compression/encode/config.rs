use super::params;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Config {
    #[default]
    Plain,
    Gzip(params::Deflate),
    Bgzf,
}

impl Config {
    /// `.gz`/`.gzip` -> gzip, `.bgz`/`.bgzf` -> BGZF, anything else is written uncompressed.
    pub fn infer_from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("gz" | "gzip") => Config::Gzip(params::Deflate::default()),
            Some("bgz" | "bgzf") => Config::Bgzf,
            _ => Config::Plain,
        }
    }
}
