//! Route paths shared by the redirect gate, middleware and controllers.

pub const ROOT_URI: &str = "/close-a-company";
pub const SEARCH_COMPANY_URI: &str = "/close-a-company/search-company";
pub const REDIRECT_GATE_URI: &str = "/close-a-company/redirect";
pub const SELECT_DIRECTOR_URI: &str = "/close-a-company/select-director";
pub const ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI: &str =
    "/close-a-company/endorse-company-closure-certificate";
pub const NOT_SELECTED_SIGNATORY_URI: &str = "/close-a-company/not-selected-signatory";
pub const WAIT_FOR_OTHERS_TO_SIGN_URI: &str = "/close-a-company/wait-for-others-to-sign";
pub const PAYMENT_URI: &str = "/close-a-company/payment";
pub const VIEW_FINAL_CONFIRMATION_URI: &str = "/close-a-company/view-final-confirmation";

pub const HEALTHCHECK_URI: &str = "/health";
pub const READINESS_URI: &str = "/ready";
pub const METRICS_URI: &str = "/metrics";
