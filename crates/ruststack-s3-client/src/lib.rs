//! S3 object and bucket operations for the RustStack client.
//!
//! [`S3Client`] issues GET, HEAD, PUT, POST and DELETE requests signed with
//! AWS Signature Version 2, moving payloads through a caller-owned
//! [`IoBuf`](ruststack_iobuf::IoBuf) or a local file. Settings such as the
//! bucket, MIME type, ACL and one-shot byte ranges live on the borrowed
//! [`RequestContext`](ruststack_client_core::RequestContext).
//!
//! # Modules
//!
//! - [`ambient`] - Process-wide default context
//! - [`bucket`] - Bucket create/delete/stat helpers
//! - [`client`] - Object operations and header assembly
//! - [`verify`] - MD5 checks of local files against uploads

pub mod ambient;
pub mod bucket;
pub mod client;
pub mod verify;

pub use ambient::{clone_default_context, with_default_context};
pub use client::S3Client;
pub use verify::{etag_matches_file, file_md5_hex, verify_file_md5};
