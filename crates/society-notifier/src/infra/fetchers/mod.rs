pub mod change_feed_adapter;

pub use change_feed_adapter::ChangeFeedFetcher;
