use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use dissolution::api::DissolutionApi;
use dissolution::config::AppConfig;
use dissolution::error::AppError;
use dissolution::session::{CookieSigner, SessionStore};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::views::Views;

/// Shared wiring handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn DissolutionApi>,
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: CookieSigner,
    pub views: Arc<Views>,
    pub readiness: Arc<AtomicBool>,
    pub metrics: Option<Arc<PrometheusHandle>>,
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        api: Arc<dyn DissolutionApi>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AppError> {
        let views = Views::new(&config.web).map_err(|source| AppError::Startup {
            component: "templates",
            source: Box::new(source),
        })?;
        let cookies = CookieSigner::new(&config.session.cookie_secret).map_err(|source| {
            AppError::Startup {
                component: "cookie signer",
                source: Box::new(source),
            }
        })?;

        Ok(Self {
            config: Arc::new(config),
            api,
            sessions,
            cookies,
            views: Arc::new(views),
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: None,
            today: local_today,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(Arc::new(handle));
        self
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
