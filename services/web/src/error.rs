use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dissolution::api::ApiError;
use dissolution::session::SessionError;
use tracing::error;

/// Failures raised while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("request reached a workflow page without {0} in the session")]
    IncompleteSession(&'static str),
}

impl WebError {
    pub fn kind(&self) -> &'static str {
        match self {
            WebError::Api(_) => "ApiError",
            WebError::Session(_) => "SessionError",
            WebError::Template(_) => "TemplateError",
            WebError::IncompleteSession(_) => "IncompleteSessionError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Api(_) => StatusCode::BAD_GATEWAY,
            WebError::Session(_) | WebError::Template(_) | WebError::IncompleteSession(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Marker telling the error page layer to render the `error` template.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage;

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!("{} - {}", self.kind(), self);

        let mut response = self.status().into_response();
        response.extensions_mut().insert(ErrorPage);
        response
    }
}
