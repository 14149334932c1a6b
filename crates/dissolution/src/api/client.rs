use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::dto::{DissolutionApprovalRequest, DissolutionGetResponse};

/// Errors raised while talking to the dissolution API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("dissolution API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dissolution API responded with {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("dissolution API base URL '{0}' cannot carry a request path")]
    InvalidBaseUrl(String),
}

/// Operations the web front-end needs from the dissolution API.
#[async_trait]
pub trait DissolutionApi: Send + Sync {
    /// Fetch the application for a company, `None` when no application exists.
    async fn get_dissolution(
        &self,
        token: &str,
        company_number: &str,
    ) -> Result<Option<DissolutionGetResponse>, ApiError>;

    /// Record the signing director's approval.
    async fn approve(
        &self,
        token: &str,
        company_number: &str,
        officer_id: &str,
    ) -> Result<(), ApiError>;
}

/// `reqwest` backed client for the dissolution API.
#[derive(Debug, Clone)]
pub struct HttpDissolutionApi {
    client: Client,
    base_url: Url,
}

impl HttpDissolutionApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// `{base}/dissolution-request/{company_number}[/{suffix}]` with each segment percent-encoded.
    fn dissolution_url(&self, company_number: &str, suffix: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .push("dissolution-request")
                .push(company_number);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl DissolutionApi for HttpDissolutionApi {
    async fn get_dissolution(
        &self,
        token: &str,
        company_number: &str,
    ) -> Result<Option<DissolutionGetResponse>, ApiError> {
        let response = self
            .client
            .get(self.dissolution_url(company_number, None)?)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => {
                debug!(%company_number, "no dissolution application found");
                Ok(None)
            }
            status => Err(unexpected(status, response).await),
        }
    }

    async fn approve(
        &self,
        token: &str,
        company_number: &str,
        officer_id: &str,
    ) -> Result<(), ApiError> {
        let body = DissolutionApprovalRequest {
            officer_id: officer_id.to_string(),
        };

        let response = self
            .client
            .post(self.dissolution_url(company_number, Some("approval"))?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(()),
            status => Err(unexpected(status, response).await),
        }
    }
}

async fn unexpected(status: StatusCode, response: reqwest::Response) -> ApiError {
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "unexpected dissolution API response");
    ApiError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    }
}
