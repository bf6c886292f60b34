mod config;
mod stream;

pub use config::Config;
pub use stream::Stream;

use eyre::{Result, WrapErr};
use std::fs::File;
use std::path::Path;

/// Open the file and wrap it into a decoder chosen by sniffing its content.
pub fn infer_from_path(path: impl AsRef<Path>) -> Result<Stream<File>> {
    let path = path.as_ref();
    let config = Config::infer_from_file(path)?;
    let file =
        File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    Ok(Stream::new(file, config))
}
