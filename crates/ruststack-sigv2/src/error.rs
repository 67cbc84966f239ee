//! Error types for request signing and credential loading.

use std::path::PathBuf;

/// Errors that can occur while loading credentials or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential store has no entry for the requested id.
    #[error("Credentials not found for id: {0}")]
    CredentialsNotFound(String),

    /// The credentials file is readable or writable by group or others.
    #[error("Credentials file {path} has insecure permissions {mode:o}; it must be accessible by its owner only")]
    InsecurePermissions {
        /// Path of the rejected file.
        path: PathBuf,
        /// Permission bits found on the file.
        mode: u32,
    },

    /// The credentials file is not owned by the current user.
    #[error("Credentials file {path} is not owned by the current user")]
    NotOwner {
        /// Path of the rejected file.
        path: PathBuf,
    },

    /// A credentials line is not of the form `id:keyid:key`.
    #[error("Syntax error in credentials file {path} line {line}: {reason}")]
    Syntax {
        /// Path of the file being parsed.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was missing.
        reason: &'static str,
    },

    /// No credentials path could be determined (e.g. `HOME` is unset).
    #[error("Cannot locate credentials file: HOME is not set")]
    NoCredentialsPath,

    /// The credentials file could not be read.
    #[error("Cannot read credentials file {path}: {source}")]
    Io {
        /// Path of the file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for signing operations.
pub type AuthResult<T> = Result<T, AuthError>;
