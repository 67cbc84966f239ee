//! Decoded response scalars and the default header decoder.

use tracing::trace;

use crate::metadata::MetadataList;

const META_PREFIX: &str = "x-amz-meta-";

/// Standard response fields decoded from the header stream of the last request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseInfo {
    /// Numeric status code from the status line, if one was seen.
    pub status_code: Option<u16>,
    /// Text following the protocol token on the status line (e.g. `"404 Not Found"`).
    pub status_text: Option<String>,
    /// Value of the `ETag` header, quotes included.
    pub etag: Option<String>,
    /// Value of the `Last-Modified` header.
    pub last_modified: Option<String>,
    /// Value of the `Content-Length` header, or zero.
    pub content_length: u64,
}

impl ResponseInfo {
    /// Whether the status code is `200 OK`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_code == Some(200)
    }
}

/// Decode one raw header line into `info` and `metadata`.
///
/// Recognizes the status line, `ETag`, `Last-Modified`, `Content-Length` and
/// `x-amz-meta-*` headers. Header names are matched case-insensitively;
/// everything else is ignored. Returns the number of bytes consumed, which is
/// always the full line.
pub fn decode_header_line(
    info: &mut ResponseInfo,
    metadata: &mut MetadataList,
    line: &[u8],
) -> usize {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end_matches(['\r', '\n']);

    if let Some(status) = strip_status_line(text) {
        info.status_code = parse_leading_number(status).and_then(|code| u16::try_from(code).ok());
        info.status_text = Some(status.to_owned());
        trace!(status = %status, "decoded status line");
        return line.len();
    }

    let Some((name, value)) = text.split_once(':') else {
        return line.len();
    };
    let name = name.trim();
    let value = value.trim();

    if name.eq_ignore_ascii_case("etag") {
        info.etag = Some(value.to_owned());
    } else if name.eq_ignore_ascii_case("last-modified") {
        info.last_modified = Some(value.to_owned());
    } else if name.eq_ignore_ascii_case("content-length") {
        info.content_length = parse_leading_number(value).unwrap_or(0);
    } else if let Some(key) = strip_prefix_ignore_case(name, META_PREFIX) {
        if !key.is_empty() {
            metadata.set(key, value);
        }
    }

    line.len()
}

/// Return the text after `HTTP/<version> ` if `line` is a status line.
fn strip_status_line(line: &str) -> Option<&str> {
    strip_prefix_ignore_case(line, "HTTP/")?;
    let (_, rest) = line.split_once(' ')?;
    Some(rest.trim())
}

fn strip_prefix_ignore_case<'s>(s: &'s str, prefix: &str) -> Option<&'s str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn parse_leading_number(s: &str) -> Option<u64> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    s[..len].parse().ok()
}
