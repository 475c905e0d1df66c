use std::fs;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::CONFIG;

const LOGS_DIR: &str = "logs";

pub struct LoggingGuards {
    _file_guard: WorkerGuard,
    _timing_guard: WorkerGuard,
}

fn parse_log_level(value: &str) -> LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "warning" => LevelFilter::WARN,
        other => other.parse().unwrap_or(LevelFilter::INFO),
    }
}

fn rolling_writer(file_name: &str) -> (NonBlocking, WorkerGuard) {
    tracing_appender::non_blocking(tracing_appender::rolling::daily(LOGS_DIR, file_name))
}

pub fn init_logging() -> LoggingGuards {
    if let Err(err) = fs::create_dir_all(LOGS_DIR) {
        eprintln!("Failed to create {LOGS_DIR} directory: {err}");
    }

    let (file_writer, file_guard) = rolling_writer("bot.log");
    let (timing_writer, timing_guard) = rolling_writer("timing.log");

    let general_filter = Targets::new()
        .with_default(parse_log_level(&CONFIG.log_level))
        .with_target("bot.timing", LevelFilter::OFF)
        .with_target("hyper", LevelFilter::WARN)
        .with_target("hyper_util", LevelFilter::WARN)
        .with_target("reqwest", LevelFilter::WARN);
    let timing_filter = Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("bot.timing", LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(general_filter.clone()),
        )
        .with(tracing_subscriber::fmt::layer().with_filter(general_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(timing_writer)
                .with_ansi(false)
                .with_filter(timing_filter),
        )
        .init();

    LoggingGuards {
        _file_guard: file_guard,
        _timing_guard: timing_guard,
    }
}
