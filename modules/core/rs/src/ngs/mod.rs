pub use barcode_layout::BarcodeLayout;
pub use mate::Mate;

mod barcode_layout;
mod mate;
