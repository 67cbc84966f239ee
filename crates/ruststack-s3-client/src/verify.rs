//! MD5 checks for local files against uploaded objects.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};
use ruststack_iobuf::IoBuf;
use tracing::debug;

const READ_CHUNK: usize = 4096;

/// Lowercase hex MD5 of the file at `path`.
pub fn file_md5_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut chunk = [0_u8; READ_CHUNK];
    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&chunk[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Whether the file at `path` has MD5 `expected` (hex, case-insensitive).
pub fn verify_file_md5(path: &Path, expected: &str) -> io::Result<bool> {
    let actual = file_md5_hex(path)?;
    let matches = actual.eq_ignore_ascii_case(expected);
    debug!(path = %path.display(), %actual, %expected, matches, "verified file MD5");
    Ok(matches)
}

/// Whether the `ETag` decoded into `buf` is the MD5 of the file at `path`.
///
/// Only single-part uploads have an MD5 `ETag`; a missing `ETag` never
/// matches.
pub fn etag_matches_file(buf: &IoBuf<'_>, path: &Path) -> io::Result<bool> {
    match buf.etag() {
        Some(etag) => verify_file_md5(path, etag.trim_matches('"')),
        None => Ok(false),
    }
}
