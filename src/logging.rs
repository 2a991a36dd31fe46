use anyhow::Context;
use chrono::Utc;
use serde_json::Value;
use std::fs;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Target for events that also go to the rolling admin action log
pub const ACTION_LOG_TARGET: &str = "save_to_log_file";

pub fn setup_logging(log_dir: &str) -> Result<(), anyhow::Error> {
    fs::create_dir_all(log_dir).context("Failed to create logs directory")?;

    // Daily rotating file appender
    let file_appender = rolling::daily(log_dir, "admin-actions.log");

    // Only admin action events end up in the file
    let target_filter = Targets::new().with_target(ACTION_LOG_TARGET, LevelFilter::TRACE);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(target_filter);

    // Stdout layer logs everything at RUST_LOG level (info by default)
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(stdout_filter);

    let subscriber = Registry::default().with(stdout_layer).with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    Ok(())
}

/// Records a mutating admin request in the action log
pub fn log_to_file(method: &str, path: &str, body: Option<&Value>) {
    let timestamp = Utc::now().to_rfc3339();

    match body {
        Some(b) => {
            info!(
                target: "save_to_log_file",
                method = method,
                uri = path,
                body = %b,
                "{} {} {} {}", timestamp, method, path, b
            );
        }
        None => {
            info!(
                target: "save_to_log_file",
                method = method,
                uri = path,
                "{} {} {}", timestamp, method, path
            );
        }
    }
}
