use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use dissolution::paths::{REDIRECT_GATE_URI, SELECT_DIRECTOR_URI};
use dissolution::session::Session;
use dissolution::workflows::map_to_view_model;
use tera::Context;

use super::WorkflowContext;
use crate::error::WebError;
use crate::infra::AppState;
use crate::middleware::CspNonce;

/// Explain that the signed-in e-mail is not one of the requested signatories.
pub async fn get(
    State(state): State<AppState>,
    Extension(nonce): Extension<CspNonce>,
    Extension(session): Extension<Session>,
) -> Result<Response, WebError> {
    let workflow = WorkflowContext::from_session(&session)?;

    let Some(dissolution) = state
        .api
        .get_dissolution(&workflow.token, &workflow.company_number)
        .await?
    else {
        return Ok(Redirect::to(REDIRECT_GATE_URI).into_response());
    };

    let mut context = Context::new();
    context.insert("company_name", &dissolution.company_name);
    context.insert("user_email", &workflow.user_email);
    context.insert("status", &map_to_view_model(&dissolution, false));
    context.insert("change_uri", SELECT_DIRECTOR_URI);

    Ok(state
        .views
        .render("not-selected-signatory.html", &nonce, context)?
        .into_response())
}
