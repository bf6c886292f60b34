//! SAM/BAM containers exposed as plain record streams. Records are decoded into
//! [`RecordBuf`](noodles::sam::alignment::RecordBuf) so that BAM and SAM inputs look the same
//! to downstream code.

mod format;
mod reader;
mod writer;

pub use format::Format;
pub use reader::Reader;
pub use writer::Writer;

use noodles::sam;

/// Serialize the header into its textual SAM representation (the `@HD`/`@SQ`/... block).
pub fn header_text(header: &sam::Header) -> eyre::Result<String> {
    let mut writer = sam::io::Writer::new(Vec::new());
    writer.write_header(header)?;
    Ok(String::from_utf8(writer.into_inner())?)
}
