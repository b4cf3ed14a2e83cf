pub mod index;
pub mod review;
