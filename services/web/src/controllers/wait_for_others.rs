use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use dissolution::api::ApplicationStatus;
use dissolution::paths::{REDIRECT_GATE_URI, SELECT_DIRECTOR_URI};
use dissolution::session::Session;
use dissolution::workflows::map_to_view_model;
use tera::Context;

use super::WorkflowContext;
use crate::error::WebError;
use crate::infra::AppState;
use crate::middleware::CspNonce;

fn heading(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::PendingApproval => "Waiting for other directors to sign",
        ApplicationStatus::PendingPayment => "All directors have signed",
        ApplicationStatus::Paid => "The application has been submitted",
    }
}

/// Application status page shown while signatures or payment are outstanding.
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

    let is_applicant = dissolution.created_by == workflow.user_email;

    let mut context = Context::new();
    context.insert("company_name", &dissolution.company_name);
    context.insert("company_number", &dissolution.company_number);
    context.insert("application_reference", &dissolution.application_reference);
    context.insert("heading", heading(dissolution.application_status));
    context.insert("status", &map_to_view_model(&dissolution, is_applicant));
    context.insert("change_uri", SELECT_DIRECTOR_URI);

    Ok(state
        .views
        .render("wait-for-others-to-sign.html", &nonce, context)?
        .into_response())
}
