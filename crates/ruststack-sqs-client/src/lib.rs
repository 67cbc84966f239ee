//! Queue-service operations for the RustStack client.
//!
//! [`SqsClient`] issues action-based requests (`CreateQueue`, `ListQueues`,
//! `GetQueueAttributes`, `SetQueueAttributes`, `SendMessage`,
//! `ReceiveMessage`, `DeleteMessage`) signed in the query string, and pulls
//! the few fields callers need out of the response by scanning for literal
//! tags.
//!
//! # Modules
//!
//! - [`action`] - Signed action URL construction
//! - [`client`] - Queue operations
//! - [`scan`] - Tag scanning of responses

pub mod action;
pub mod client;
pub mod scan;

pub use action::ActionRequest;
pub use client::SqsClient;
pub use scan::{MessageScanner, QueueAttributes, ScanState};
