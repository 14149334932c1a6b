use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum_prometheus::PrometheusMetricLayer;
use dissolution::api::HttpDissolutionApi;
use dissolution::config::{AppConfig, SessionConfig};
use dissolution::error::AppError;
use dissolution::session::{InMemorySessionStore, SessionStore};
use dissolution::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::app_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let addr = config.server.socket_addr()?;
    let environment = config.environment;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let api = Arc::new(HttpDissolutionApi::new(&config.web.dissolutions_api_url)?);
    let sessions = session_store(&config.session).await?;

    let state = AppState::new(config, api, sessions)?.with_metrics(prometheus_handle);
    let readiness = state.readiness.clone();

    let app = app_router(state).layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(?environment, %addr, "close-a-company front-end ready");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "redis")]
async fn session_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>, AppError> {
    use dissolution::session::RedisSessionStore;

    match config.cache_server.as_deref() {
        Some(cache_server) => {
            let store = RedisSessionStore::connect(cache_server).await?;
            info!("sessions backed by shared cache");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("CACHE_SERVER is not set; sessions from the accounts service are unavailable");
            Ok(Arc::new(InMemorySessionStore::default()))
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn session_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>, AppError> {
    match config.cache_server {
        Some(_) => Err(AppError::Startup {
            component: "session store",
            source: "CACHE_SERVER is set but this build has no redis support".into(),
        }),
        None => Ok(Arc::new(InMemorySessionStore::default())),
    }
}
