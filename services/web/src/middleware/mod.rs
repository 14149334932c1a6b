pub mod errors;
pub mod headers;
pub mod session;

pub use errors::render_error_pages;
pub use headers::{security_headers, ContentSecurityPolicy, CspNonce};
pub use session::{load_session, require_company_authorisation, require_sign_in};
