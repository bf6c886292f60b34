pub mod ngs;
pub mod parallelism;
