mod config;
pub mod params;
mod stream;

pub use config::Config;
pub use stream::Stream;

use eyre::{Result, WrapErr};
use std::fs::File;
use std::path::Path;

/// Create (or truncate) the file and wrap it into an encoder chosen by the path extension.
pub fn infer_from_path(path: impl AsRef<Path>) -> Result<Stream<File>> {
    let path = path.as_ref();
    let file =
        File::create(path).wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    Ok(Stream::new(file, Config::infer_from_path(path)))
}
