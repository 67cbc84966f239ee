//! Segmented streaming buffer for the RustStack S3/SQS client.
//!
//! The [`IoBuf`] mediates between caller data and an HTTP transport's
//! pull/push callbacks. Request bodies are appended into it (by copy, by
//! handing over a `Vec`, or by borrowing caller storage) and read out by the
//! transport; response bodies and headers flow the other way.
//!
//! # Modules
//!
//! - [`adapter`] - Header/read/write callbacks and their defaults
//! - [`buffer`] - The segmented buffer itself
//! - [`error`] - Buffer error types
//! - [`metadata`] - Key-unique `x-amz-meta-*` pair list
//! - [`response`] - Decoded response scalars and header decoding
//! - [`segment`] - Contiguous storage regions and their ownership tags

pub mod adapter;
pub mod buffer;
pub mod error;
pub mod metadata;
pub mod response;
pub mod segment;

pub use adapter::{HeaderAdapter, ReadAdapter, WriteAdapter};
pub use buffer::IoBuf;
pub use error::{IoBufError, IoBufResult};
pub use metadata::MetadataList;
pub use response::{ResponseInfo, decode_header_line};
pub use segment::{Ownership, Segment, Storage};
