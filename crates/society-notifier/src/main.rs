mod core;
mod domain;
mod infra;
#[cfg(test)]
mod test_utils;

use core::App;
use std::sync::Arc;

use firebase_sdk::TokenManager;
use infra::{
    ChangeFeedFetcher, Config, FcmSender, FirestoreProfileStore, LogGuard, UnixSignalHandler,
};
use tracing::info;

use crate::infra::consumer::{
    Consumer,
    router::{
        handlers::society_router,
        middleware::{DedupLayer, LoggingLayer},
        traits::Layer,
    },
};

const DEFAULT_DEDUP_CAPACITY: usize = 1024;
const DEFAULT_CONSUMER_CONCURRENCY: usize = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_config()?;

    let config = Config::new();
    let log_guard = LogGuard::init(config.optional("SOCIETY_LOG_DIR"))?;

    let token_manager = Arc::new(TokenManager::new(
        config.require("SOCIETY_CLIENT_ID")?.to_string(),
        config.require("SOCIETY_CLIENT_SECRET")?.to_string(),
        config.require("SOCIETY_REFRESH_TOKEN")?.to_string(),
    ));
    let _bg_handle = token_manager.clone().start_background_loop();

    let sender = Arc::new(FcmSender::new(&config, token_manager.clone())?);
    let store = Arc::new(FirestoreProfileStore::new(&config, token_manager.clone())?);

    let router = society_router(store, sender);
    let fetcher = ChangeFeedFetcher::new(&config, token_manager, router.collections())?;

    let dedup_capacity = config.parsed_or("SOCIETY_DEDUP_CAPACITY", DEFAULT_DEDUP_CAPACITY)?;
    let concurrency =
        config.parsed_or("SOCIETY_CONSUMER_CONCURRENCY", DEFAULT_CONSUMER_CONCURRENCY)?;

    let service = LoggingLayer.layer(DedupLayer::new(dedup_capacity).layer(router));
    let consumer = Consumer::new(service).with_concurrency(concurrency);

    info!(dedup_capacity, concurrency, "society notifier starting");

    let app = App::new(Some(log_guard), UnixSignalHandler::new(), fetcher, consumer);
    app.run().await
}

/// Loads `./config` into the environment when present.
fn load_config() -> anyhow::Result<()> {
    match dotenv::from_path("./config") {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
