//! Live integration tests for the RustStack S3/SQS client.
//!
//! These tests talk to a real S3/SQS-compatible endpoint configured through
//! the usual environment variables (`S3_HOST`, `SQS_HOST`, `AWS_AUTH_FILE`,
//! `AWS_AUTH_ID`, ...). They are marked `#[ignore]` so they don't run during
//! normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p ruststack-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use ruststack_client_core::{ClientConfig, HttpConnector, RequestContext};

mod test_bucket;
mod test_object;
mod test_queue;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing(config: &ClientConfig) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
            )
            .with_test_writer()
            .init();
    });
}

/// A context configured from the environment with credentials loaded.
pub fn live_context() -> anyhow::Result<RequestContext> {
    let config = ClientConfig::from_env();
    init_tracing(&config);

    let mut ctx = RequestContext::from_config(&config, Arc::new(HttpConnector));
    ctx.read_credentials(config.credentials_id.as_deref())?;
    Ok(ctx)
}

/// Generate a unique name for a test bucket or queue.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("ruststack-{prefix}-{id}")
}
