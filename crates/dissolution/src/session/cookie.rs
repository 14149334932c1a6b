use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::model::SessionId;

type CookieMac = Hmac<Sha256>;

/// Signs session ids so cookies cannot be forged without the shared secret.
#[derive(Clone)]
pub struct CookieSigner {
    mac: CookieMac,
}

impl CookieSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: CookieMac::new_from_slice(secret.as_ref())?,
        })
    }

    /// Cookie value in the form `{session_id}.{hex hmac-sha256}`.
    pub fn sign(&self, id: &SessionId) -> String {
        format!("{}.{}", id.as_str(), self.signature(id.as_str()))
    }

    /// Returns the session id when the value carries a valid signature.
    pub fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, signature) = value.split_once('.')?;
        if id.is_empty() {
            return None;
        }

        let expected = self.signature(id);
        let matches: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
        matches.then(|| SessionId(id.to_string()))
    }

    fn signature(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}
