//! Canonical string-to-sign construction for SigV2 REST requests.
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                "\n" +                              (Content-MD5, never sent)
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                [ "x-amz-acl:" ACL "\n" ] +
//!                { "x-amz-meta-" key ":" value "\n" } +
//!                [ "x-amz-storage-class:REDUCED_REDUNDANCY\n" ] +
//!                "/" + Resource
//! ```
//!
//! Metadata lines are emitted in the iteration order of the caller's list,
//! which must match the order of the `x-amz-meta-*` headers actually sent.

use chrono::{DateTime, Utc};
use tracing::warn;

/// Prefix of user metadata headers.
pub const META_HEADER_PREFIX: &str = "x-amz-meta-";

/// Storage-class header line for reduced-redundancy storage.
pub const REDUCED_REDUNDANCY_LINE: &str = "x-amz-storage-class:REDUCED_REDUNDANCY\n";

/// Default size of the metadata scratch area, in bytes.
///
/// One byte of the area is reserved, so at most `limit - 1` bytes of
/// metadata lines are signed.
pub const DEFAULT_METADATA_LIMIT: usize = 2048;

/// Fixed bytes of one metadata line besides key and value:
/// the `x-amz-meta-` prefix, `:` and `\n`.
const META_LINE_OVERHEAD: usize = META_HEADER_PREFIX.len() + 2;

/// Format `time` as an RFC 1123 HTTP date, always in `+0000`.
#[must_use]
pub fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Format `time` as the ISO 8601 timestamp used by query-signed requests.
#[must_use]
pub fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Build the canonical resource for `object`.
///
/// The bucket is prefixed unless it is empty or the host name already begins
/// with it (virtual-host style addressing). The result is used both in the
/// string-to-sign and in the request path.
#[must_use]
pub fn canonical_resource(bucket: Option<&str>, host: &str, object: &str) -> String {
    match bucket {
        Some(bucket) if !bucket.is_empty() && !host.starts_with(bucket) => {
            format!("{bucket}/{object}")
        }
        _ => object.to_owned(),
    }
}

/// Inputs of a SigV2 string-to-sign.
#[derive(Debug, Clone, Default)]
pub struct SigningInput<'a> {
    /// HTTP method (`GET`, `PUT`, ...).
    pub method: &'a str,
    /// `Content-Type` of the request, if one is sent.
    pub content_type: Option<&'a str>,
    /// HTTP date sent in the `Date` header.
    pub date: &'a str,
    /// Canned ACL sent in `x-amz-acl`.
    pub acl: Option<&'a str>,
    /// Whether `x-amz-storage-class: REDUCED_REDUNDANCY` is sent.
    pub reduced_redundancy: bool,
    /// User metadata pairs, in the order their headers are sent.
    pub metadata: Vec<(&'a str, &'a str)>,
    /// Canonical resource, without the leading `/`.
    pub resource: &'a str,
}

/// A built string-to-sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToSign {
    /// The exact text to be signed.
    pub text: String,
    /// Number of metadata entries left out because they did not fit.
    pub dropped_metadata: usize,
}

/// Serialize metadata as `x-amz-meta-<key>:<value>\n` lines.
///
/// With `Some(limit)`, lines are added only while they fit in `limit - 1`
/// bytes; the first line that does not fit stops serialization and no
/// partial line is ever written. `None` serializes everything. Returns the
/// lines and the number of entries left out.
#[must_use]
pub fn metadata_lines(metadata: &[(&str, &str)], limit: Option<usize>) -> (String, usize) {
    let mut out = String::new();
    let mut remain = limit.map(|l| l.saturating_sub(1));

    for (index, (key, value)) in metadata.iter().enumerate() {
        let expect = key.len() + value.len() + META_LINE_OVERHEAD;
        if let Some(room) = remain.as_mut() {
            if expect > *room {
                return (out, metadata.len() - index);
            }
            *room -= expect;
        }
        out.push_str(META_HEADER_PREFIX);
        out.push_str(key);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    (out, 0)
}

/// Build the string-to-sign for `input`.
#[must_use]
pub fn build_string_to_sign(
    input: &SigningInput<'_>,
    metadata_limit: Option<usize>,
) -> StringToSign {
    let (meta, dropped_metadata) = metadata_lines(&input.metadata, metadata_limit);
    if dropped_metadata > 0 {
        warn!(
            dropped = dropped_metadata,
            limit = metadata_limit,
            "metadata exceeds signing scratch area, trailing entries not signed"
        );
    }

    let mut text = String::with_capacity(64 + meta.len() + input.resource.len());
    text.push_str(input.method);
    text.push_str("\n\n");
    text.push_str(input.content_type.unwrap_or(""));
    text.push('\n');
    text.push_str(input.date);
    text.push('\n');
    if let Some(acl) = input.acl {
        text.push_str("x-amz-acl:");
        text.push_str(acl);
        text.push('\n');
    }
    text.push_str(&meta);
    if input.reduced_redundancy {
        text.push_str(REDUCED_REDUNDANCY_LINE);
    }
    text.push('/');
    text.push_str(input.resource);

    StringToSign {
        text,
        dropped_metadata,
    }
}
