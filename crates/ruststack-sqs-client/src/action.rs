//! Signed action URLs.
//!
//! A queue request carries everything in its query string:
//!
//! ```text
//! {base}/?Action=..&{params}&AWSAccessKeyId=..&Signature=..&SignatureVersion=1&Timestamp=..&Version=2009-02-01
//! ```
//!
//! The signature covers the raw values; the URL carries them
//! percent-encoded.

use ruststack_sigv2::Credentials;
use ruststack_sigv2::query::{API_VERSION, SIGNATURE_VERSION, sign_query, url_encode};

/// One queue action with its action-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    action: &'static str,
    params: Vec<(&'static str, String)>,
}

impl ActionRequest {
    /// An action with no parameters yet.
    #[must_use]
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            params: Vec::new(),
        }
    }

    /// Add a parameter. Parameters appear in the URL in insertion order.
    #[must_use]
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// The action name.
    #[must_use]
    pub fn action(&self) -> &'static str {
        self.action
    }

    /// Every parameter that takes part in the signature, with raw values.
    fn signed_params<'a>(&'a self, key_id: &'a str, timestamp: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![("Action", self.action)];
        params.extend(self.params.iter().map(|(n, v)| (*n, v.as_str())));
        params.extend([
            ("AWSAccessKeyId", key_id),
            ("SignatureVersion", SIGNATURE_VERSION),
            ("Timestamp", timestamp),
            ("Version", API_VERSION),
        ]);
        params
    }

    /// Build the signed URL under `base` (a `scheme://host` or a queue URL).
    #[must_use]
    pub fn signed_url(&self, base: &str, credentials: &Credentials, timestamp: &str) -> String {
        let signature = sign_query(
            credentials.secret_key(),
            &self.signed_params(credentials.key_id(), timestamp),
        );

        let mut url = format!("{}/?Action={}", base.trim_end_matches('/'), self.action);
        for (name, value) in &self.params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&url_encode(value));
        }
        url.push_str("&AWSAccessKeyId=");
        url.push_str(&url_encode(credentials.key_id()));
        url.push_str("&Signature=");
        url.push_str(&signature);
        url.push_str("&SignatureVersion=");
        url.push_str(SIGNATURE_VERSION);
        url.push_str("&Timestamp=");
        url.push_str(&url_encode(timestamp));
        url.push_str("&Version=");
        url.push_str(API_VERSION);
        url
    }
}
