pub mod speeds;
pub mod stats;
