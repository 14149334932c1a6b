use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use dissolution::paths::{
    ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI, HEALTHCHECK_URI, METRICS_URI,
    NOT_SELECTED_SIGNATORY_URI, READINESS_URI, REDIRECT_GATE_URI, SEARCH_COMPANY_URI,
    WAIT_FOR_OTHERS_TO_SIGN_URI,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    endorse, not_selected_signatory, redirect, search_company, wait_for_others,
};
use crate::infra::AppState;
use crate::middleware::{
    load_session, render_error_pages, require_company_authorisation, require_sign_in,
    security_headers, ContentSecurityPolicy,
};

/// Full application: probes, workflow pages and the middleware stack around them.
pub fn app_router(state: AppState) -> Router {
    let policy = Arc::new(ContentSecurityPolicy::new(&state.config.web));

    let company_pages = Router::new()
        .route(REDIRECT_GATE_URI, get(redirect::redirect_gate))
        .route(
            ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI,
            get(endorse::get).post(endorse::post),
        )
        .route(NOT_SELECTED_SIGNATORY_URI, get(not_selected_signatory::get))
        .route(WAIT_FOR_OTHERS_TO_SIGN_URI, get(wait_for_others::get))
        .route_layer(from_fn_with_state(
            state.clone(),
            require_company_authorisation,
        ));

    let workflow_pages = Router::new()
        .route(
            SEARCH_COMPANY_URI,
            get(search_company::get).post(search_company::post),
        )
        .merge(company_pages)
        .route_layer(from_fn_with_state(state.clone(), require_sign_in))
        .route_layer(from_fn_with_state(state.clone(), load_session));

    Router::new()
        .route(HEALTHCHECK_URI, get(healthcheck))
        .route(READINESS_URI, get(readiness_endpoint))
        .route(METRICS_URI, get(metrics_endpoint))
        .merge(workflow_pages)
        .layer(from_fn_with_state(state.clone(), render_error_pages))
        .layer(from_fn_with_state(policy, security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.as_ref() {
        Some(metrics) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            metrics.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled").into_response(),
    }
}
