//! Access to the upstream dissolution API, which owns the application record.

pub mod client;
pub mod dto;

pub use client::{ApiError, DissolutionApi, HttpDissolutionApi};
pub use dto::{
    ApplicationStatus, DissolutionApprovalRequest, DissolutionGetDirector, DissolutionGetResponse,
};
