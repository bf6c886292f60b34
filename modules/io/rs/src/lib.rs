pub mod alignment;
pub mod compression;
pub mod fastq;
mod traits;

pub use traits::{ReadRecord, WriteRecord};
