//! Decision table behind the redirect gate.
//!
//! The gate fetches the company's dissolution application and sends the browser
//! to the page matching the application status and the current user's relation
//! to it. Everything here is pure so the table can be tested without HTTP.

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::{ApplicationStatus, DissolutionGetDirector, DissolutionGetResponse};
use crate::paths;
use crate::session::DissolutionApproval;

/// Format used for the approval date shown on the endorse page, e.g. `05 March 2021`.
pub const APPROVAL_DATE_FORMAT: &str = "%d %B %Y";

/// How the signed-in user relates to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Created the application (may also be a director).
    Applicant,
    /// Listed as a director who must sign.
    Signatory,
    Unrelated,
}

/// Whether the user still owes a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    NotRequired,
}

/// Page the gate redirects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    SelectDirector,
    EndorseCertificate,
    WaitForOthersToSign,
    NotSelectedSignatory,
    Payment,
    ViewFinalConfirmation,
}

impl NextStep {
    pub const fn path(self) -> &'static str {
        match self {
            NextStep::SelectDirector => paths::SELECT_DIRECTOR_URI,
            NextStep::EndorseCertificate => paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI,
            NextStep::WaitForOthersToSign => paths::WAIT_FOR_OTHERS_TO_SIGN_URI,
            NextStep::NotSelectedSignatory => paths::NOT_SELECTED_SIGNATORY_URI,
            NextStep::Payment => paths::PAYMENT_URI,
            NextStep::ViewFinalConfirmation => paths::VIEW_FINAL_CONFIRMATION_URI,
        }
    }
}

/// Outcome of the gate: where to go, plus approval data to store for the endorse page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    pub step: NextStep,
    pub approval: Option<DissolutionApproval>,
}

impl RedirectDecision {
    pub fn path(&self) -> &'static str {
        self.step.path()
    }
}

/// Work out the user's role and outstanding signature on an application.
pub fn classify(dissolution: &DissolutionGetResponse, user_email: &str) -> (UserRole, ApprovalState) {
    let mut matching = dissolution
        .directors
        .iter()
        .filter(|director| director.email == user_email)
        .peekable();

    let is_director = matching.peek().is_some();
    let approval = if !is_director {
        ApprovalState::NotRequired
    } else if matching.any(|director| !director.has_approved()) {
        ApprovalState::Pending
    } else {
        ApprovalState::Approved
    };

    let role = if dissolution.created_by == user_email {
        UserRole::Applicant
    } else if is_director {
        UserRole::Signatory
    } else {
        UserRole::Unrelated
    };

    (role, approval)
}

/// The redirect table for an existing application.
pub fn next_step(status: ApplicationStatus, role: UserRole, approval: ApprovalState) -> NextStep {
    use ApplicationStatus::*;

    match (status, role, approval) {
        (_, UserRole::Unrelated, _) => NextStep::NotSelectedSignatory,
        (PendingApproval, _, ApprovalState::Pending) => NextStep::EndorseCertificate,
        (PendingApproval, _, _) => NextStep::WaitForOthersToSign,
        (PendingPayment, UserRole::Applicant, _) => NextStep::Payment,
        (PendingPayment, UserRole::Signatory, _) => NextStep::WaitForOthersToSign,
        (Paid, _, _) => NextStep::ViewFinalConfirmation,
    }
}

/// Apply the table to an optional application, preparing endorse data when needed.
pub fn decide(
    dissolution: Option<&DissolutionGetResponse>,
    user_email: &str,
    today: NaiveDate,
) -> RedirectDecision {
    let Some(dissolution) = dissolution else {
        return RedirectDecision {
            step: NextStep::SelectDirector,
            approval: None,
        };
    };

    let (role, approval_state) = classify(dissolution, user_email);
    let step = next_step(dissolution.application_status, role, approval_state);

    let approval = match step {
        NextStep::EndorseCertificate => pending_signature(dissolution, user_email)
            .map(|director| prepare_approval_data(dissolution, director, today)),
        _ => None,
    };

    RedirectDecision { step, approval }
}

/// First director with the user's e-mail who has not yet signed.
pub fn pending_signature<'a>(
    dissolution: &'a DissolutionGetResponse,
    user_email: &str,
) -> Option<&'a DissolutionGetDirector> {
    dissolution
        .directors
        .iter()
        .find(|director| director.email == user_email && !director.has_approved())
}

pub fn prepare_approval_data(
    dissolution: &DissolutionGetResponse,
    signing_director: &DissolutionGetDirector,
    today: NaiveDate,
) -> DissolutionApproval {
    DissolutionApproval {
        company_name: dissolution.company_name.clone(),
        company_number: dissolution.company_number.clone(),
        applicant: signing_director.name.clone(),
        officer_id: signing_director.officer_id.clone(),
        date: today.format(APPROVAL_DATE_FORMAT).to_string(),
    }
}
