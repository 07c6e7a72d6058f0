use anyhow::Result;
use std::str::FromStr;
use tracing_error::ErrorLayer;
use time::format_description::BorrowedFormatItem;
use time::error::InvalidFormatDescription;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(test)]
#[path = "./logging.tests.rs"]
mod logging_tests;

const TIMESTAMP_FORMAT: &str =
    "[year]-[month padding:zero]-[day padding:zero]T[hour]:[minute]:[second].[subsecond digits:3]";

/// Output format of the log lines.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "logfmt" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected 'text' or 'json'")),
        }
    }
}

/// Initializes logging to the standard output and returns worker guard that will flush logs on drop.\
/// **Note** that `RUST_LOG` takes precedence over the `level` argument.
pub fn initialize(app_name: &str, level: &str, format: LogFormat) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(std::io::stdout());

    let timer = timestamp_format()?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(time_offset, timer);

    let crate_name = app_name.replace('-', "_");
    let env = format!("warn,{crate_name}={level},ksm_common={level},ksm_config={level},ksm_kube={level},ksm_store={level}");
    let env_filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(env));

    let stdout_subscriber = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_timer(timer)
            .with_ansi(false)
            .with_writer(non_blocking_appender)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_timer(timer)
            .with_writer(non_blocking_appender)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(stdout_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(guard)
}

fn timestamp_format() -> Result<Vec<BorrowedFormatItem<'static>>, InvalidFormatDescription> {
    time::format_description::parse_borrowed::<2>(TIMESTAMP_FORMAT)
}
