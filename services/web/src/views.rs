use axum::response::Html;
use dissolution::config::{PiwikConfig, WebConfig};
use serde_json::json;
use tera::{Context, Tera};

use crate::middleware::headers::CspNonce;

const TEMPLATES: [(&str, &str); 7] = [
    ("layout.html", include_str!("../templates/layout.html")),
    (
        "_application_status.html",
        include_str!("../templates/_application_status.html"),
    ),
    (
        "search-company.html",
        include_str!("../templates/search-company.html"),
    ),
    (
        "endorse-company-closure-certificate.html",
        include_str!("../templates/endorse-company-closure-certificate.html"),
    ),
    (
        "not-selected-signatory.html",
        include_str!("../templates/not-selected-signatory.html"),
    ),
    (
        "wait-for-others-to-sign.html",
        include_str!("../templates/wait-for-others-to-sign.html"),
    ),
    ("error.html", include_str!("../templates/error.html")),
];

/// Template engine plus the values every page layout needs.
pub struct Views {
    tera: Tera,
    cdn_host: String,
    piwik: Option<PiwikConfig>,
}

impl Views {
    pub fn new(web: &WebConfig) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;

        Ok(Self {
            tera,
            cdn_host: web.cdn_host.clone(),
            piwik: web.piwik.clone(),
        })
    }

    pub fn render(
        &self,
        template: &str,
        nonce: &CspNonce,
        page: Context,
    ) -> Result<Html<String>, tera::Error> {
        let mut context = Context::new();
        context.insert("cdn_host", &self.cdn_host);
        context.insert("nonce", nonce.as_str());
        context.insert(
            "piwik",
            &self
                .piwik
                .as_ref()
                .map(|piwik| json!({ "url": piwik.url, "site_id": piwik.site_id })),
        );
        context.extend(page);

        self.tera.render(template, &context).map(Html)
    }
}

impl std::fmt::Debug for Views {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Views")
            .field("cdn_host", &self.cdn_host)
            .field("piwik", &self.piwik)
            .finish_non_exhaustive()
    }
}
