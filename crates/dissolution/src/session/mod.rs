//! Browser sessions shared with the accounts service.

pub mod cookie;
pub mod model;
pub mod store;

pub use cookie::CookieSigner;
pub use model::{DissolutionApproval, DissolutionSession, Session, SessionId, SignInInfo};
#[cfg(feature = "redis")]
pub use store::RedisSessionStore;
pub use store::{InMemorySessionStore, SessionError, SessionStore};
