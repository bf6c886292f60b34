pub use counts::BarcodeCounts;
pub use header::{EncodedHeader, HeaderIndex};
pub use mate1::{Mate1Outcome, Mate1Stats, WhitelistFilter};
pub use mate2::{synchronize, Mate2Stats};
pub use pipeline::{PairedPaths, Tagger};
pub use summary::Summary;
pub use whitelist::Whitelist;

mod counts;
mod header;
mod mate1;
mod mate2;
mod pipeline;
mod summary;
mod whitelist;

pub(crate) fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
