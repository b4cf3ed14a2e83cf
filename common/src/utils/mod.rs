pub mod config;
pub mod embedding;
pub mod template_engine;
