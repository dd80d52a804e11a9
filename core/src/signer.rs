//! Request signing for the minion protocol.
//!
//! The canonical string is `"<name>:<value>\n"` for each entry of
//! `CANONICAL_HEADERS`, in order, followed by the raw body. Its HMAC-SHA256
//! under the shared secret, hex encoded, travels in `X-PARA-AUTH-REQUEST`.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ClientError;
use crate::headers::{CANONICAL_HEADERS, HEADER_AUTH_REQUEST};
use crate::http::HttpRequest;

type HmacSha256 = Hmac<Sha256>;

/// Shared secret between minion and server. Never leaves the process.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.0.len())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for SecretKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Build the canonical string from a header lookup and the serialized body.
///
/// Headers the lookup does not know contribute an empty value, which is how
/// an unset `X-PARA-QUERY` is signed.
pub fn canonical_string<'a, F>(lookup: F, body: &str) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut canonical = String::new();
    for name in CANONICAL_HEADERS {
        canonical.push_str(name);
        canonical.push(':');
        canonical.push_str(lookup(name).unwrap_or_default());
        canonical.push('\n');
    }
    canonical.push_str(body);
    canonical
}

/// Computes and checks request signatures with one secret key.
///
/// The HMAC is keyed once at construction and cloned for each message.
#[derive(Clone)]
pub struct Signer {
    keyed: HmacSha256,
}

impl Signer {
    pub fn new(key: impl Into<SecretKey>) -> Self {
        let key = key.into();
        // HMAC hashes or pads keys of any length, so keying cannot fail.
        let keyed = HmacSha256::new_from_slice(key.as_bytes())
            .expect("HMAC-SHA256 accepts keys of any length");
        Self { keyed }
    }

    /// Lowercase hex HMAC-SHA256 of `canonical`.
    pub fn sign_canonical(&self, canonical: &str) -> String {
        let mut mac = self.keyed.clone();
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Signature for `request` as it stands.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnsignableBody` when the request carries no
    /// serialized body. The body is never dropped from the canonical string.
    pub fn signature(&self, request: &HttpRequest) -> Result<String, ClientError> {
        let body = request.body.as_deref().ok_or(ClientError::UnsignableBody)?;
        Ok(self.sign_canonical(&canonical_string(|name| request.header(name), body)))
    }

    /// Compute the signature and store it in `X-PARA-AUTH-REQUEST`.
    pub fn sign_request(&self, request: &mut HttpRequest) -> Result<(), ClientError> {
        let signature = self.signature(request)?;
        request.set_header(HEADER_AUTH_REQUEST, signature);
        Ok(())
    }

    /// Constant-time check of a received hex signature against `canonical`.
    pub fn verify(&self, canonical: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let mut mac = self.keyed.clone();
        mac.update(canonical.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}
