//! Client configuration.
//!
//! Provides [`ClientConfig`], the environment-driven settings used to seed a
//! [`RequestContext`](crate::context::RequestContext). Every value can also be
//! changed on the context afterwards.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default S3 endpoint host.
pub const DEFAULT_S3_HOST: &str = "s3.amazonaws.com";

/// Default queue service endpoint host.
pub const DEFAULT_SQS_HOST: &str = "queue.amazonaws.com";

/// Default minimum size of auto-allocated buffer segments.
pub const DEFAULT_GROWTH_SIZE: usize = 65_536;

/// Client configuration.
///
/// # Examples
///
/// ```
/// use ruststack_client_core::config::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.s3_host, "s3.amazonaws.com");
/// assert!(!config.reuse_connections);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// S3 endpoint host, optionally with `:port`.
    #[builder(default = String::from(DEFAULT_S3_HOST))]
    pub s3_host: String,

    /// Queue service endpoint host.
    #[builder(default = String::from(DEFAULT_SQS_HOST))]
    pub sqs_host: String,

    /// HTTP proxy (`host:port`) applied to every request.
    #[builder(default)]
    pub proxy: Option<String>,

    /// Whether requests use `https://`.
    #[builder(default = false)]
    pub https: bool,

    /// Whether TLS certificate verification is skipped.
    #[builder(default = false)]
    pub https_insecure: bool,

    /// Whether connections are kept open between requests.
    #[builder(default = false)]
    pub reuse_connections: bool,

    /// Credentials file; `None` means `$HOME/.awsAuth`.
    #[builder(default)]
    pub credentials_file: Option<PathBuf>,

    /// User id to look up in the credentials file; `None` means `$USER`.
    #[builder(default)]
    pub credentials_id: Option<String>,

    /// Minimum size of auto-allocated buffer segments.
    #[builder(default = DEFAULT_GROWTH_SIZE)]
    pub growth_size: usize,

    /// Size of the metadata signing area; `None` signs all metadata.
    #[builder(default = Some(ruststack_sigv2::canonical::DEFAULT_METADATA_LIMIT))]
    pub metadata_limit: Option<usize>,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            s3_host: String::from(DEFAULT_S3_HOST),
            sqs_host: String::from(DEFAULT_SQS_HOST),
            proxy: None,
            https: false,
            https_insecure: false,
            reuse_connections: false,
            credentials_file: None,
            credentials_id: None,
            growth_size: DEFAULT_GROWTH_SIZE,
            metadata_limit: Some(ruststack_sigv2::canonical::DEFAULT_METADATA_LIMIT),
            log_level: String::from("info"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3_HOST` | `s3.amazonaws.com` |
    /// | `SQS_HOST` | `queue.amazonaws.com` |
    /// | `S3_PROXY` | unset |
    /// | `S3_HTTPS` | `false` |
    /// | `S3_HTTPS_INSECURE` | `false` |
    /// | `AWS_REUSE_CONNECTIONS` | `false` |
    /// | `AWS_AUTH_FILE` | `$HOME/.awsAuth` |
    /// | `AWS_AUTH_ID` | `$USER` |
    /// | `IOBUF_GROWTH_SIZE` | `65536` |
    /// | `SIGN_METADATA_LIMIT` | `2048` (`0` = unbounded) |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("S3_HOST") {
            config.s3_host = v;
        }
        if let Some(v) = lookup("SQS_HOST") {
            config.sqs_host = v;
        }
        if let Some(v) = lookup("S3_PROXY") {
            config.proxy = Some(v).filter(|p| !p.is_empty());
        }
        if let Some(v) = lookup("S3_HTTPS") {
            config.https = parse_bool(&v);
        }
        if let Some(v) = lookup("S3_HTTPS_INSECURE") {
            config.https_insecure = parse_bool(&v);
        }
        if let Some(v) = lookup("AWS_REUSE_CONNECTIONS") {
            config.reuse_connections = parse_bool(&v);
        }
        if let Some(v) = lookup("AWS_AUTH_FILE") {
            config.credentials_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("AWS_AUTH_ID") {
            config.credentials_id = Some(v);
        }
        if let Some(v) = lookup("IOBUF_GROWTH_SIZE") {
            if let Ok(n) = v.parse::<usize>() {
                config.growth_size = n;
            }
        }
        if let Some(v) = lookup("SIGN_METADATA_LIMIT") {
            if let Ok(n) = v.parse::<usize>() {
                config.metadata_limit = (n > 0).then_some(n);
            }
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.s3_host, "s3.amazonaws.com");
        assert_eq!(config.sqs_host, "queue.amazonaws.com");
        assert!(config.proxy.is_none());
        assert!(!config.https);
        assert!(!config.https_insecure);
        assert!(!config.reuse_connections);
        assert_eq!(config.growth_size, 65_536);
        assert_eq!(config.metadata_limit, Some(2048));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_load_from_env() {
        let config = ClientConfig::from_env();
        assert!(!config.s3_host.is_empty());
    }

    #[test]
    fn test_should_load_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("S3_HOST", "localhost:9000"),
            ("SQS_HOST", "localhost:9324"),
            ("S3_PROXY", "proxy:3128"),
            ("S3_HTTPS", "TRUE"),
            ("S3_HTTPS_INSECURE", "1"),
            ("AWS_REUSE_CONNECTIONS", "true"),
            ("AWS_AUTH_FILE", "/etc/aws/auth"),
            ("AWS_AUTH_ID", "svc"),
            ("IOBUF_GROWTH_SIZE", "4096"),
            ("SIGN_METADATA_LIMIT", "0"),
            ("LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.s3_host, "localhost:9000");
        assert_eq!(config.sqs_host, "localhost:9324");
        assert_eq!(config.proxy.as_deref(), Some("proxy:3128"));
        assert!(config.https);
        assert!(config.https_insecure);
        assert!(config.reuse_connections);
        assert_eq!(
            config.credentials_file.as_deref(),
            Some(std::path::Path::new("/etc/aws/auth"))
        );
        assert_eq!(config.credentials_id.as_deref(), Some("svc"));
        assert_eq!(config.growth_size, 4096);
        assert_eq!(config.metadata_limit, None);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_should_ignore_unparsable_numbers() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("IOBUF_GROWTH_SIZE", "lots"),
            ("SIGN_METADATA_LIMIT", "-1"),
            ("S3_HTTPS", "yes"),
        ]));
        assert_eq!(config.growth_size, DEFAULT_GROWTH_SIZE);
        assert_eq!(config.metadata_limit, Some(2048));
        assert!(!config.https);
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = ClientConfig::builder()
            .s3_host("minio:9000".into())
            .proxy(Some("proxy:8080".into()))
            .reuse_connections(true)
            .metadata_limit(None)
            .build();

        assert_eq!(config.s3_host, "minio:9000");
        assert_eq!(config.sqs_host, DEFAULT_SQS_HOST);
        assert_eq!(config.proxy.as_deref(), Some("proxy:8080"));
        assert!(config.reuse_connections);
        assert!(config.metadata_limit.is_none());
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let config = ClientConfig::default();
        let json = serde_json::to_string(&config).expect("test serialization");
        assert!(json.contains("s3Host"));
        assert!(json.contains("reuseConnections"));
        assert!(json.contains("metadataLimit"));

        let back: ClientConfig = serde_json::from_str(&json).expect("test deserialization");
        assert_eq!(back, config);
    }
}
