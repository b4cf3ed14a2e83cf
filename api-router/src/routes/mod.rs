pub mod analyze;
pub mod liveness;
pub mod models;
pub mod readiness;
