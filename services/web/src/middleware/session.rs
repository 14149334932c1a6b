//! Session loading plus the sign-in and company authorisation gates.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use dissolution::config::AuthConfig;
use dissolution::paths::{ROOT_URI, SEARCH_COMPANY_URI};
use dissolution::session::Session;
use tracing::debug;
use url::form_urlencoded;

use crate::error::WebError;
use crate::infra::AppState;

const COMPANY_SCOPE_PREFIX: &str = "https://api.companieshouse.gov.uk/company/";

/// Find a cookie by name across every `Cookie` header.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Attach the stored session to the request when the cookie verifies.
pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let session_id = find_cookie(request.headers(), &state.config.session.cookie_name)
        .and_then(|value| state.cookies.verify(&value));

    if let Some(id) = session_id {
        match state.sessions.load(&id).await? {
            Some(session) => {
                request.extensions_mut().insert(session);
            }
            None => debug!("session cookie did not match a stored session"),
        }
    }

    Ok(next.run(request).await)
}

/// Send anonymous users to the accounts sign-in page, returning here afterwards.
pub async fn require_sign_in(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let signed_in = request
        .extensions()
        .get::<Session>()
        .is_some_and(Session::is_signed_in);

    if signed_in {
        return next.run(request).await;
    }

    let return_to = request
        .uri()
        .path_and_query()
        .map(|value| value.as_str())
        .unwrap_or(ROOT_URI);

    Redirect::to(&sign_in_url(&state.config.web.chs_url, return_to)).into_response()
}

/// Require a company in the session that the user has been authorised for.
pub async fn require_company_authorisation(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session) = request.extensions().get::<Session>() else {
        return Redirect::to(SEARCH_COMPANY_URI).into_response();
    };

    let Some(company_number) = session.company_number().map(str::to_string) else {
        return Redirect::to(SEARCH_COMPANY_URI).into_response();
    };

    if session.is_authorised_for(&company_number) {
        return next.run(request).await;
    }

    debug!(%company_number, "company not yet authorised for user");
    let state_nonce = uuid::Uuid::new_v4().to_string();
    Redirect::to(&authorise_url(&state.config.auth, &company_number, &state_nonce))
        .into_response()
}

pub fn sign_in_url(chs_url: &str, return_to: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("return_to", return_to)
        .finish();
    format!("{}/signin?{query}", chs_url.trim_end_matches('/'))
}

pub fn authorise_url(auth: &AuthConfig, company_number: &str, state_nonce: &str) -> String {
    let redirect_uri = format!("{}/oauth2/user/callback", auth.chs_url.trim_end_matches('/'));
    let scope = format!("{COMPANY_SCOPE_PREFIX}{company_number}");
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &auth.account_client_id)
        .append_pair("redirect_uri", &redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scope)
        .append_pair("state", state_nonce)
        .finish();
    format!(
        "{}/oauth2/authorise?{query}",
        auth.account_url.trim_end_matches('/')
    )
}
