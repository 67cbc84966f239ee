//! Error types for the segmented buffer.

/// Errors produced by [`IoBuf`](crate::IoBuf) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IoBufError {
    /// A segment allocation could not be satisfied.
    #[error("out of memory: could not allocate {requested} bytes")]
    OutOfMemory {
        /// Number of bytes that were requested.
        requested: usize,
    },
}

/// Convenience result type for buffer operations.
pub type IoBufResult<T> = Result<T, IoBufError>;
