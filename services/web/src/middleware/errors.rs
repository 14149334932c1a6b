use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tera::Context;
use tracing::error;

use super::headers::CspNonce;
use crate::error::ErrorPage;
use crate::infra::AppState;

/// Replace bodies of failed requests with the rendered `error` page.
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .cloned()
        .unwrap_or_else(CspNonce::generate);

    let response = next.run(request).await;
    if response.extensions().get::<ErrorPage>().is_none() {
        return response;
    }

    let status = response.status();
    match state.views.render("error.html", &nonce, Context::new()) {
        Ok(page) => (status, page).into_response(),
        Err(err) => {
            error!(%err, "error page failed to render");
            (status, "Sorry, there is a problem with the service").into_response()
        }
    }
}
