use axum::extract::State;
use axum::response::Redirect;
use axum::Extension;
use dissolution::session::Session;
use dissolution::workflows::decide;
use tracing::info;

use super::WorkflowContext;
use crate::error::WebError;
use crate::infra::AppState;

/// The redirect gate: send the user to the page their application state calls for.
pub async fn redirect_gate(
    State(state): State<AppState>,
    Extension(mut session): Extension<Session>,
) -> Result<Redirect, WebError> {
    let context = WorkflowContext::from_session(&session)?;

    let dissolution = state
        .api
        .get_dissolution(&context.token, &context.company_number)
        .await?;

    let decision = decide(dissolution.as_ref(), &context.user_email, (state.today)());

    info!(
        company_number = %context.company_number,
        status = dissolution
            .as_ref()
            .map_or("none", |dissolution| dissolution.application_status.label()),
        step = ?decision.step,
        "redirect gate resolved next step"
    );

    // Approval data only lives while the user still owes a signature.
    if let Some(dissolution_session) = session.dissolution.as_mut() {
        if dissolution_session.approval != decision.approval {
            dissolution_session.approval = decision.approval.clone();
            state.sessions.save(&session).await?;
        }
    }

    Ok(Redirect::to(decision.path()))
}
