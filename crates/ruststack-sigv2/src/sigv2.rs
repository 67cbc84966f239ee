//! AWS Signature Version 2 signing.
//!
//! SigV2 uses HMAC-SHA1. The `Authorization` header has the format:
//!
//! ```text
//! AWS <AWSAccessKeyId>:<Signature>
//! ```
//!
//! Where `Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))`; see
//! [`crate::canonical`] for how the string-to-sign is built.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use tracing::debug;

use crate::canonical::{SigningInput, build_string_to_sign};
use crate::credentials::Credentials;

type HmacSha1 = Hmac<Sha1>;

/// A signed REST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// The exact text that was signed.
    pub string_to_sign: String,
    /// Base64 HMAC-SHA1 signature.
    pub signature: String,
    /// Value of the `Authorization` header.
    pub authorization: String,
    /// Metadata entries left out of the string-to-sign.
    pub dropped_metadata: usize,
}

/// Sign `input` with `credentials`.
#[must_use]
pub fn sign(
    credentials: &Credentials,
    input: &SigningInput<'_>,
    metadata_limit: Option<usize>,
) -> SignedRequest {
    let sts = build_string_to_sign(input, metadata_limit);

    debug!(
        access_key_id = %credentials.key_id(),
        string_to_sign = ?sts.text,
        "Built SigV2 string to sign"
    );

    let signature = compute_signature(credentials.secret_key(), &sts.text);
    let authorization = authorization_header(credentials.key_id(), &signature);

    SignedRequest {
        string_to_sign: sts.text,
        signature,
        authorization,
        dropped_metadata: sts.dropped_metadata,
    }
}

/// Compute the SigV2 signature: Base64(HMAC-SHA1(secret, string_to_sign)).
#[must_use]
pub fn compute_signature(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    let result = mac.finalize().into_bytes();
    BASE64.encode(result)
}

/// Format the `Authorization` header value.
#[must_use]
pub fn authorization_header(access_key_id: &str, signature: &str) -> String {
    format!("AWS {access_key_id}:{signature}")
}
