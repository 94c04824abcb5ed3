pub mod dedup_middleware;
pub mod logger_middleware;

pub use dedup_middleware::{DedupLayer, DedupMiddleware};
pub use logger_middleware::{LoggingLayer, LoggingMiddleware};
