pub mod consumer;
pub mod fetcher;
pub mod models;
pub mod notification;
pub mod outcome;
pub mod sender;
pub mod signal;
pub mod store;

pub use signal::{ShutdownKind, SignalHandler};
