use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use dissolution::company_number::sanitize_company_number;
use dissolution::paths::REDIRECT_GATE_URI;
use dissolution::session::{DissolutionSession, Session};
use serde::Deserialize;
use tera::Context;
use tracing::info;

use crate::error::WebError;
use crate::infra::AppState;
use crate::middleware::CspNonce;

const TEMPLATE: &str = "search-company.html";

#[derive(Debug, Default, Deserialize)]
pub struct SearchCompanyForm {
    #[serde(default, rename = "companyNumber")]
    pub company_number: Option<String>,
}

pub async fn get(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
) -> Result<Response, WebError> {
    Ok(state
        .views
        .render(TEMPLATE, &nonce, Context::new())?
        .into_response())
}

/// Start a dissolution session for the sanitised company number.
pub async fn post(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
    Extension(mut session): Extension<Session>,
    Form(form): Form<SearchCompanyForm>,
) -> Result<Response, WebError> {
    let company_number = match sanitize_company_number(form.company_number.as_deref()) {
        Ok(company_number) => company_number,
        Err(err) => {
            let mut context = Context::new();
            context.insert("error", &err.to_string());
            context.insert("company_number", &form.company_number);
            return Ok(state
                .views
                .render(TEMPLATE, &nonce, context)?
                .into_response());
        }
    };

    info!(%company_number, "dissolution session started");
    session.dissolution = Some(DissolutionSession::new(company_number));
    state.sessions.save(&session).await?;

    Ok(Redirect::to(REDIRECT_GATE_URI).into_response())
}
