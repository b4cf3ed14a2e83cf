pub mod checkpoint;
pub mod dataset;
