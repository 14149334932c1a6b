use crate::api::ApiError;
use crate::company_number::CompanyNumberError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Failures that stop the service from starting or a CLI command from completing.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Session(SessionError),
    Api(ApiError),
    CompanyNumber(CompanyNumberError),
    Io(std::io::Error),
    Startup {
        component: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Session(err) => write!(f, "session store error: {}", err),
            AppError::Api(err) => write!(f, "api client error: {}", err),
            AppError::CompanyNumber(err) => write!(f, "invalid company number: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Startup { component, source } => {
                write!(f, "failed to initialise {}: {}", component, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Api(err) => Some(err),
            AppError::CompanyNumber(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Startup { source, .. } => Some(&**source),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<ApiError> for AppError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<CompanyNumberError> for AppError {
    fn from(value: CompanyNumberError) -> Self {
        Self::CompanyNumber(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
