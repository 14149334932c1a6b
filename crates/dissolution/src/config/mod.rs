use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the close-a-company front-end.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub web: WebConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load `.env` (when present) and read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvVars { lookup };

        let environment = AppEnvironment::from_str(&vars.get_or_default("APP_ENV", "development"));

        let host = vars.get_or_default("APP_HOST", "127.0.0.1");
        let port = vars
            .get_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = vars.get_or_default("APP_LOG_LEVEL", "info");

        let piwik = match (vars.get("PIWIK_URL"), vars.get("PIWIK_SITE_ID")) {
            (Some(url), Some(site_id)) => Some(PiwikConfig::new(url, site_id)?),
            (None, None) => None,
            _ => return Err(ConfigError::IncompletePiwik),
        };

        let chs_url = vars.get_or_throw("CHS_URL")?;

        let web = WebConfig {
            cdn_host: vars.get_or_throw("CDN_HOST")?,
            chs_url: chs_url.clone(),
            company_profile_api_url: vars.get_or_throw("CHS_COMPANY_PROFILE_API_LOCAL_URL")?,
            dissolutions_api_url: vars.get_or_throw("DISSOLUTIONS_API_URL")?,
            piwik,
        };

        let session = SessionConfig {
            cookie_name: vars.get_or_throw("COOKIE_NAME")?,
            cookie_secret: vars.get_or_throw("COOKIE_SECRET")?,
            cookie_domain: vars.get_or_throw("COOKIE_DOMAIN")?,
            cache_server: vars.get("CACHE_SERVER"),
        };

        let auth = AuthConfig {
            account_url: vars.get_or_throw("ACCOUNT_URL")?,
            account_request_key: vars.get_or_throw("OAUTH2_REQUEST_KEY")?,
            account_client_id: vars.get_or_throw("OAUTH2_CLIENT_ID")?,
            chs_url,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            web,
            session,
            auth,
        })
    }
}

struct EnvVars<F> {
    lookup: F,
}

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn get_or_default(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn get_or_throw(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Hosts and upstream services the pages depend on.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub cdn_host: String,
    pub chs_url: String,
    pub company_profile_api_url: String,
    pub dissolutions_api_url: String,
    pub piwik: Option<PiwikConfig>,
}

/// Analytics endpoint; its host is allow-listed in the content security policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiwikConfig {
    pub url: String,
    pub site_id: String,
    host: String,
}

impl PiwikConfig {
    pub fn new(url: String, site_id: String) -> Result<Self, ConfigError> {
        let host = url::Url::parse(&url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .ok_or_else(|| ConfigError::InvalidUrl {
                name: "PIWIK_URL",
                value: url.clone(),
            })?;

        Ok(Self { url, site_id, host })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Session cookie settings shared with the accounts service.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secret: String,
    pub cookie_domain: String,
    pub cache_server: Option<String>,
}

/// OAuth2 settings used when the user must authorise a company.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub account_url: String,
    pub account_request_key: String,
    pub account_client_id: String,
    pub chs_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidUrl { name: &'static str, value: String },
    IncompletePiwik,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{name} must be set"),
            ConfigError::InvalidPort => write!(f, "PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUrl { name, value } => {
                write!(f, "{name} must be an absolute URL with a host (found '{value}')")
            }
            ConfigError::IncompletePiwik => {
                write!(f, "PIWIK_URL and PIWIK_SITE_ID must be set together")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
