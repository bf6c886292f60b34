// Format: https://en.wikipedia.org/wiki/FASTQ_format
// Each record spans exactly 4 lines:
// 1. '@' followed by the title; the read identity is the title up to the first whitespace
// 2. sequence
// 3. '+' optionally followed by a copy of the title
// 4. ASCII-encoded quality scores, one character per base

mod phred;
mod reader;
mod record;
pub mod validate;
mod writer;

pub use phred::Phred;
pub use reader::{FileReader, Reader};
pub use record::Record;
pub use writer::{FileWriter, Writer};
