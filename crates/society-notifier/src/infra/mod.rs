pub mod config;
pub mod consumer;
pub mod fetchers;
pub mod logging;
pub mod senders;
pub mod signal;
pub mod stores;

pub use config::Config;
pub use fetchers::ChangeFeedFetcher;
pub use logging::LogGuard;
pub use senders::FcmSender;
pub use signal::UnixSignalHandler;
pub use stores::FirestoreProfileStore;
