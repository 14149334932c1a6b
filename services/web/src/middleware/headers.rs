//! Cache suppression and security headers applied to every response.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use dissolution::config::WebConfig;
use tracing::warn;

/// Script hash of the inline GOV.UK template bootstrap.
const GOVUK_TEMPLATE_SCRIPT_HASH: &str = "'sha256-+6WnXIl4mbFTCARd8N3COQmT3bJJmo32N8q8ZSQAIcU='";
const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Per-request nonce allow-listing inline scripts rendered by our templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(String);

impl CspNonce {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CspNonce {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ContentSecurityPolicy {
    cdn_host: String,
    piwik_host: Option<String>,
}

impl ContentSecurityPolicy {
    pub fn new(web: &WebConfig) -> Self {
        Self {
            cdn_host: web.cdn_host.clone(),
            piwik_host: web.piwik.as_ref().map(|piwik| piwik.host().to_string()),
        }
    }

    pub fn header_value(&self, nonce: &CspNonce) -> String {
        let cdn = self.cdn_host.as_str();
        let nonce_source = format!("'nonce-{}'", nonce.as_str());

        let mut script_src = vec!["'self'", "code.jquery.com", cdn, nonce_source.as_str()];
        let mut img_src = vec!["'self'", cdn];
        if let Some(piwik) = self.piwik_host.as_deref() {
            script_src.push(piwik);
            img_src.push(piwik);
        }
        script_src.push(GOVUK_TEMPLATE_SCRIPT_HASH);

        let directives: [(&str, Vec<&str>); 9] = [
            ("default-src", vec!["'self'"]),
            ("script-src", script_src),
            ("object-src", vec!["'none'"]),
            ("font-src", vec!["'self'", cdn]),
            ("style-src", vec!["'self'", cdn]),
            ("img-src", img_src),
            ("base-uri", vec!["'self'"]),
            ("form-action", vec!["'self'"]),
            ("frame-ancestors", vec!["'self'"]),
        ];

        directives
            .iter()
            .map(|(name, sources)| format!("{name} {}", sources.join(" ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub async fn security_headers(
    State(policy): State<Arc<ContentSecurityPolicy>>,
    mut request: Request,
    next: Next,
) -> Response {
    let nonce = CspNonce::generate();
    request.extensions_mut().insert(nonce.clone());

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        HeaderName::from_static("surrogate-control"),
        HeaderValue::from_static("no-store"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(HSTS),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        header::X_DNS_PREFETCH_CONTROL,
        HeaderValue::from_static("off"),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    match HeaderValue::from_str(&policy.header_value(&nonce)) {
        Ok(value) => {
            headers.insert(header::CONTENT_SECURITY_POLICY, value);
        }
        Err(err) => warn!(%err, "content security policy is not a valid header value"),
    }

    response
}
