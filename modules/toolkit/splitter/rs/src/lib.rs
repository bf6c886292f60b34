pub use aggregate::{
    discover, tag_of, write_summary, Aggregator, ContainerSummary, MarkerLabel, TagCounts,
    MISSING_NAME_TAG,
};
pub use router::{parse_barcode, split_file, HandlePolicy, Partition, Router, Routing};
pub use validation::validate_partitions;

mod aggregate;
mod router;
mod validation;
