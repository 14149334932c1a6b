pub mod api;
pub mod company_number;
pub mod config;
pub mod error;
pub mod paths;
pub mod session;
pub mod telemetry;
pub mod workflows;
