// src/main.rs

use std::io::Read;
use std::sync::Arc;

use dotenvy::dotenv;
use schedule_form::catalog::OptionCatalog;
use schedule_form::config::Config;
use schedule_form::error::AppError;
use schedule_form::script::{parse_script, replay};
use schedule_form::view::HeadlessView;
use schedule_form::{FormSession, HttpBackend};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Replays a scripted form session against the configured scheduling service.
///
/// Usage: `schedule-form [script.json]` (reads stdin when no path is given).
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "schedule-form.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let script = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let steps = parse_script(&script)?;
    tracing::info!("Loaded {} step(s)", steps.len());

    let backend = HttpBackend::new(&config)?;
    tracing::info!("Scheduling service at {}", backend.base_url());

    let catalog = Arc::new(OptionCatalog::standard());
    let mut session = FormSession::new(catalog, HeadlessView::new(), config.reenable_delay());

    replay(&mut session, &steps, &backend).await?;

    let view = session.into_view();
    let summary = serde_json::to_string_pretty(&view)?;
    tracing::info!("Final form state:\n{}", summary);

    Ok(())
}
