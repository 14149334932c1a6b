use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use dissolution::paths::REDIRECT_GATE_URI;
use dissolution::session::{DissolutionApproval, Session};
use serde::Deserialize;
use tera::Context;
use tracing::info;

use super::WorkflowContext;
use crate::error::WebError;
use crate::infra::AppState;
use crate::middleware::CspNonce;

const TEMPLATE: &str = "endorse-company-closure-certificate.html";
pub const CONFIRMATION_REQUIRED: &str =
    "Confirm that you have read the statement and approve the application";

#[derive(Debug, Default, Deserialize)]
pub struct EndorseForm {
    #[serde(default)]
    pub confirmation: Option<String>,
}

fn stored_approval(session: &Session) -> Option<DissolutionApproval> {
    session
        .dissolution
        .as_ref()
        .and_then(|dissolution| dissolution.approval.clone())
}

fn render(
    state: &AppState,
    nonce: &CspNonce,
    approval: &DissolutionApproval,
    error: Option<&str>,
) -> Result<Response, WebError> {
    let mut context = Context::new();
    context.insert("approval", approval);
    if let Some(error) = error {
        context.insert("error", error);
    }
    Ok(state.views.render(TEMPLATE, nonce, context)?.into_response())
}

/// Show the approval prepared by the redirect gate.
pub async fn get(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    match stored_approval(&session) {
        Some(approval) => render(&state, &nonce, &approval, None),
        None => Ok(Redirect::to(REDIRECT_GATE_URI).into_response()),
    }
}

/// Record the director's signature, then let the gate pick the next page.
pub async fn post(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
    Extension(mut session): Extension<Session>,
    Form(form): Form<EndorseForm>,
) -> Result<Response, WebError> {
    let Some(approval) = stored_approval(&session) else {
        return Ok(Redirect::to(REDIRECT_GATE_URI).into_response());
    };

    let confirmed = form
        .confirmation
        .as_deref()
        .is_some_and(|value| !value.trim().is_empty());
    if !confirmed {
        return render(&state, &nonce, &approval, Some(CONFIRMATION_REQUIRED));
    }

    let context = WorkflowContext::from_session(&session)?;
    state
        .api
        .approve(&context.token, &context.company_number, &approval.officer_id)
        .await?;

    info!(
        company_number = %context.company_number,
        officer_id = %approval.officer_id,
        "director approved dissolution"
    );

    if let Some(dissolution) = session.dissolution.as_mut() {
        dissolution.approval = None;
    }
    state.sessions.save(&session).await?;

    Ok(Redirect::to(REDIRECT_GATE_URI).into_response())
}
