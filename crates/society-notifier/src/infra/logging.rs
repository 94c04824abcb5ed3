use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "society_notifier=debug,firebase_sdk=info";
const LOG_FILE_PREFIX: &str = "society-notifier.log";

#[must_use = "LogGuard must be held to keep logging active"]
#[non_exhaustive]
pub struct LogGuard {
    _guard: WorkerGuard,
}

impl LogGuard {
    /// Installs the global subscriber. Logs go to stdout unless `log_dir` is
    /// given, in which case they roll daily inside that directory.
    pub fn init(log_dir: Option<&str>) -> anyhow::Result<Self> {
        let (non_blocking_writer, guard) = match log_dir.filter(|d| !d.is_empty()) {
            Some(dir) => {
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
            }
            None => tracing_appender::non_blocking(std::io::stdout()),
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(non_blocking_writer))
            .try_init()
            .context("failed to init tracing")?;

        Ok(Self { _guard: guard })
    }
}
