use farm_advisor::api::http_client::build_http_client;
use farm_advisor::config::{Config, ConnectionPurpose};
use farm_advisor::db;
use farm_advisor::service::advisor::{CropAdvisor, GeminiAdvisor};
use farm_advisor::service::weather::{StaticWeather, WeatherApiProvider, WeatherProvider};
use farm_advisor::{AdvisorState, advisor_router};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        port = cfg.basic.port,
        loglevel = %cfg.basic.loglevel,
        model = %cfg.gemini.model,
        gemini_key = cfg.gemini.api_key.is_some(),
        weather_key = cfg.weather.api_key.is_some(),
        proxy = %cfg.basic.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        "configuration loaded"
    );
    if cfg.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; every assessment will use fallback recommendations");
    }

    let store = db::connect(&cfg.database, ConnectionPurpose::Serve).await?;
    store.init_schema().await?;

    let client = build_http_client(&cfg)?;
    let advisor: Arc<dyn CropAdvisor> = Arc::new(GeminiAdvisor::new(
        client.clone(),
        cfg.gemini.base_url.clone(),
        cfg.gemini.model.clone(),
        cfg.gemini.api_key.clone(),
        cfg.gemini.structured_output,
    ));
    let weather: Arc<dyn WeatherProvider> = match cfg.weather.api_key.clone() {
        Some(key) => Arc::new(WeatherApiProvider::new(
            client,
            cfg.weather.base_url.clone(),
            key,
            cfg.weather.forecast_days,
        )),
        None => Arc::new(StaticWeather),
    };

    let state = AdvisorState::new(store, advisor, weather);
    let app = advisor_router(state);

    let addr = format!("{}:{}", cfg.basic.listen_addr, cfg.basic.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
