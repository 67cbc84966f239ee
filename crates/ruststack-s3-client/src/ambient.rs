//! Process-wide default context.
//!
//! Convenience for programs that only ever talk to one endpoint. The context
//! is created on first use from [`ClientConfig::from_env`] with a real HTTP
//! connector; credentials are not loaded until the caller asks for them.
//! Access is serialized by a mutex, so requests through the default context
//! never run concurrently. Use your own [`RequestContext`] values for that.
//!
//! ```no_run
//! use ruststack_iobuf::IoBuf;
//! use ruststack_s3_client::{S3Client, with_default_context};
//!
//! let mut buf = IoBuf::new();
//! with_default_context(|ctx| {
//!     ctx.read_credentials(None)?;
//!     ctx.set_bucket(Some("mybucket"));
//!     S3Client::new(ctx).get(&mut buf, "report.csv")
//! })?;
//! # Ok::<(), ruststack_client_core::ClientError>(())
//! ```

use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use ruststack_client_core::{ClientConfig, HttpConnector, RequestContext};
use tracing::debug;

static DEFAULT_CONTEXT: LazyLock<Mutex<RequestContext>> = LazyLock::new(|| {
    let config = ClientConfig::from_env();
    debug!(s3_host = %config.s3_host, sqs_host = %config.sqs_host, "creating default context");
    Mutex::new(RequestContext::from_config(&config, Arc::new(HttpConnector)))
});

/// Run `f` with exclusive access to the default context.
pub fn with_default_context<T>(f: impl FnOnce(&mut RequestContext) -> T) -> T {
    let mut ctx = DEFAULT_CONTEXT.lock();
    f(&mut ctx)
}

/// A new context with the default context's settings and its own transport.
pub fn clone_default_context() -> ruststack_client_core::ClientResult<RequestContext> {
    DEFAULT_CONTEXT.lock().try_clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_share_settings_through_default_context() {
        with_default_context(|ctx| ctx.set_bucket(Some("ambient-bucket")));
        let bucket = with_default_context(|ctx| ctx.bucket().map(str::to_owned));
        assert_eq!(bucket.as_deref(), Some("ambient-bucket"));

        let clone = clone_default_context().unwrap();
        assert_eq!(clone.bucket(), Some("ambient-bucket"));
        with_default_context(|ctx| ctx.set_bucket(None));
    }
}
