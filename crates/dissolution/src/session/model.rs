use serde::{Deserialize, Serialize};

/// Opaque session identifier carried in the signed cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sign-in details written by the accounts service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInInfo {
    pub signed_in: bool,
    pub access_token: String,
    pub user_email: String,
    /// Company the user has been authorised to act for, if any.
    #[serde(default)]
    pub company_number: Option<String>,
}

/// Data the signing director confirms on the endorse page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolutionApproval {
    pub company_name: String,
    pub company_number: String,
    pub applicant: String,
    pub officer_id: String,
    pub date: String,
}

/// Workflow state for the company being closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolutionSession {
    pub company_number: String,
    #[serde(default)]
    pub approval: Option<DissolutionApproval>,
}

impl DissolutionSession {
    pub fn new(company_number: impl Into<String>) -> Self {
        Self {
            company_number: company_number.into(),
            approval: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    #[serde(default)]
    pub sign_in: Option<SignInInfo>,
    #[serde(default)]
    pub dissolution: Option<DissolutionSession>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            sign_in: None,
            dissolution: None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.sign_in.as_ref().is_some_and(|info| info.signed_in)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.signed_in_info().map(|info| info.access_token.as_str())
    }

    pub fn user_email(&self) -> Option<&str> {
        self.signed_in_info().map(|info| info.user_email.as_str())
    }

    pub fn company_number(&self) -> Option<&str> {
        self.dissolution
            .as_ref()
            .map(|dissolution| dissolution.company_number.as_str())
    }

    pub fn is_authorised_for(&self, company_number: &str) -> bool {
        self.signed_in_info()
            .and_then(|info| info.company_number.as_deref())
            .is_some_and(|authorised| authorised == company_number)
    }

    fn signed_in_info(&self) -> Option<&SignInInfo> {
        self.sign_in.as_ref().filter(|info| info.signed_in)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
