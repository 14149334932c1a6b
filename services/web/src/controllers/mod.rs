//! Page handlers for the close-a-company workflow.

pub mod endorse;
pub mod not_selected_signatory;
pub mod redirect;
pub mod search_company;
pub mod wait_for_others;

use dissolution::session::Session;

use crate::error::WebError;

/// Credentials and company every workflow page needs, copied out of the session.
#[derive(Debug, Clone)]
pub(crate) struct WorkflowContext {
    pub(crate) token: String,
    pub(crate) user_email: String,
    pub(crate) company_number: String,
}

impl WorkflowContext {
    pub(crate) fn from_session(session: &Session) -> Result<Self, WebError> {
        let token = session
            .access_token()
            .ok_or(WebError::IncompleteSession("an access token"))?;
        let user_email = session
            .user_email()
            .ok_or(WebError::IncompleteSession("a user email"))?;
        let company_number = session
            .company_number()
            .ok_or(WebError::IncompleteSession("a company number"))?;

        Ok(Self {
            token: token.to_string(),
            user_email: user_email.to_string(),
            company_number: company_number.to_string(),
        })
    }
}
