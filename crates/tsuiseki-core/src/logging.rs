use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{AppConfig, LoggingConfig};

/// Install the global subscriber: stderr always, plus a daily file when enabled.
///
/// `RUST_LOG` overrides `config.filter`. Keep the returned guard alive for the
/// life of the process or buffered file output is lost.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("tsuiseki=info"));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(true);
    let registry = tracing_subscriber::registry().with(filter).with(stderr);

    if !config.file {
        registry.init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "tsuiseki.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Some(guard)
}
