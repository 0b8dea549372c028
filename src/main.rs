//! Cabbage News binary entrypoint.
//! Starts the background ingest loop and serves the read-only feed.

use cabbage_news::{metrics::Metrics, AppConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `LOG_FORMAT=json` switches to JSON lines; otherwise compact text.
/// The runtime may already have installed a subscriber, hence `try_init`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cabbage_news=info,ingest=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    tracing::info!(
        api_base = %cfg.api_base,
        db = %cfg.database_path.display(),
        blocked = cfg.blocked_keywords.len(),
        "starting"
    );

    // Install the recorder before the first cycle describes its series.
    let metrics = Metrics::init()
        .map_err(|e| tracing::warn!(error = ?e, "metrics disabled"))
        .ok();

    // The scheduler handle is dropped on purpose: the loop lives until process exit.
    let (router, _scheduler) = cabbage_news::app(&cfg).await?;
    let router = match metrics {
        Some(m) => router.merge(m.router()),
        None => router,
    };

    Ok(router.into())
}
