pub mod classify;
pub mod pool;
pub mod stats;
