use serde::{Deserialize, Serialize};

/// Workflow stage of a dissolution application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    PendingApproval,
    PendingPayment,
    Paid,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::PendingApproval => "pending-approval",
            ApplicationStatus::PendingPayment => "pending-payment",
            ApplicationStatus::Paid => "paid",
        }
    }
}

/// A director who must sign the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolutionGetDirector {
    pub officer_id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
}

impl DissolutionGetDirector {
    pub fn has_approved(&self) -> bool {
        self.approved_at.is_some()
    }
}

/// Application record as returned by `GET /dissolution-request/{company_number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolutionGetResponse {
    pub etag: String,
    pub kind: String,
    pub application_status: ApplicationStatus,
    pub application_reference: String,
    pub application_type: String,
    pub company_number: String,
    pub company_name: String,
    pub created_at: String,
    /// E-mail address of the applicant.
    pub created_by: String,
    #[serde(default)]
    pub directors: Vec<DissolutionGetDirector>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolutionApprovalRequest {
    pub officer_id: String,
}
