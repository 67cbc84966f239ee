//! Per-connection request context.
//!
//! A [`RequestContext`] bundles everything a request needs besides its
//! payload: credentials, endpoint hosts, proxy, bucket, per-request options
//! and the transport handle. Each context drives one request at a time; run
//! requests concurrently by giving each thread its own context (see
//! [`RequestContext::try_clone`]).
//!
//! The transport handle moves through three states:
//!
//! ```text
//! Unbound --first request--> Idle --perform--> InFlight --done--> Idle
//! ```
//!
//! Entering a request either reuses the handle (when connection reuse is on,
//! optionally forcing a fresh socket once after
//! [`reset_connection`](RequestContext::reset_connection)) or replaces it.
//! Connection settings cannot change while a request is in flight.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use ruststack_sigv2::canonical::DEFAULT_METADATA_LIMIT;
use ruststack_sigv2::credentials::{CredentialProvider, Credentials, FileCredentialProvider};
use tracing::{debug, info};

use crate::config::{ClientConfig, DEFAULT_GROWTH_SIZE, DEFAULT_S3_HOST, DEFAULT_SQS_HOST};
use crate::error::{ClientError, ClientResult};
use crate::transport::{ConnectionSettings, Connector, Exchange, Transport, TransportRequest};

/// A one-shot byte range for the next GET, PUT or POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `length` bytes starting at `offset`.
    Span {
        /// First byte.
        offset: u64,
        /// Number of bytes; never zero.
        length: u64,
    },
    /// Append to the end of the object (EMC extension, writes only).
    Append,
}

impl ByteRange {
    /// Value of the `Range` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Span { offset, length } => {
                let last = offset.saturating_add(length.saturating_sub(1));
                format!("bytes={offset}-{last}")
            }
            Self::Append => String::from("bytes=-1-"),
        }
    }
}

/// Where the transport handle is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport has been created yet.
    Unbound,
    /// A transport exists and no request is running.
    Idle,
    /// A request is running, or one panicked and the context was not reset.
    InFlight,
}

/// Everything a request needs besides its payload.
pub struct RequestContext {
    id: Option<String>,
    key_id: Option<String>,
    secret_key: Option<String>,
    credentials_file: Option<PathBuf>,
    s3_host: String,
    sqs_host: String,
    proxy: Option<String>,
    bucket: Option<String>,
    mime_type: Option<String>,
    acl: Option<String>,
    byte_range: Option<ByteRange>,
    reduced_redundancy: bool,
    emc: bool,
    scality: bool,
    sproxyd: bool,
    chunked: bool,
    https: bool,
    https_insecure: bool,
    reuse_connections: bool,
    reset_connection: bool,
    metadata_limit: Option<usize>,
    growth_size: usize,
    connector: Arc<dyn Connector>,
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("key_id", &self.key_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("s3_host", &self.s3_host)
            .field("sqs_host", &self.sqs_host)
            .field("proxy", &self.proxy)
            .field("bucket", &self.bucket)
            .field("mime_type", &self.mime_type)
            .field("acl", &self.acl)
            .field("byte_range", &self.byte_range)
            .field("reduced_redundancy", &self.reduced_redundancy)
            .field("emc", &self.emc)
            .field("scality", &self.scality)
            .field("sproxyd", &self.sproxyd)
            .field("chunked", &self.chunked)
            .field("https", &self.https)
            .field("https_insecure", &self.https_insecure)
            .field("reuse_connections", &self.reuse_connections)
            .field("reset_connection", &self.reset_connection)
            .field("metadata_limit", &self.metadata_limit)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// The login name of the current user, used as the default credentials id.
fn current_user() -> Option<String> {
    std::env::var("USER").ok().filter(|u| !u.is_empty())
}

impl RequestContext {
    /// A context with default settings that opens transports through `connector`.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            id: None,
            key_id: None,
            secret_key: None,
            credentials_file: None,
            s3_host: String::from(DEFAULT_S3_HOST),
            sqs_host: String::from(DEFAULT_SQS_HOST),
            proxy: None,
            bucket: None,
            mime_type: None,
            acl: None,
            byte_range: None,
            reduced_redundancy: false,
            emc: false,
            scality: false,
            sproxyd: false,
            chunked: false,
            https: false,
            https_insecure: false,
            reuse_connections: false,
            reset_connection: false,
            metadata_limit: Some(DEFAULT_METADATA_LIMIT),
            growth_size: DEFAULT_GROWTH_SIZE,
            connector,
            transport: None,
            state: ConnectionState::Unbound,
        }
    }

    /// A context seeded from `config`. Credentials are not loaded; call
    /// [`read_credentials`](Self::read_credentials) for that.
    pub fn from_config(config: &ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let mut ctx = Self::new(connector);
        ctx.s3_host.clone_from(&config.s3_host);
        ctx.sqs_host.clone_from(&config.sqs_host);
        ctx.proxy.clone_from(&config.proxy);
        ctx.https = config.https;
        ctx.https_insecure = config.https_insecure;
        ctx.reuse_connections = config.reuse_connections;
        ctx.credentials_file.clone_from(&config.credentials_file);
        ctx.id = config.credentials_id.clone().or_else(current_user);
        ctx.growth_size = config.growth_size;
        ctx.metadata_limit = config.metadata_limit;
        ctx
    }

    // ----------------------------------------------------------------------
    // Credentials
    // ----------------------------------------------------------------------

    /// Set the credentials id; `None` uses `$USER`.
    pub fn set_id(&mut self, id: Option<&str>) {
        self.id = id.map(str::to_owned).or_else(current_user);
    }

    /// Set the access key id.
    pub fn set_key_id(&mut self, key_id: Option<&str>) {
        self.key_id = key_id.map(str::to_owned);
    }

    /// Set the secret key.
    pub fn set_key(&mut self, key: Option<&str>) {
        self.secret_key = key.map(str::to_owned);
    }

    /// Install all three credential parts at once.
    pub fn set_credentials(&mut self, credentials: &Credentials) {
        self.id = Some(credentials.id().to_owned());
        self.key_id = Some(credentials.key_id().to_owned());
        self.secret_key = Some(credentials.secret_key().to_owned());
    }

    /// The credentials id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The access key id.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Signing credentials, if both key parts are set.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.key_id, &self.secret_key) {
            (Some(key_id), Some(secret)) => Some(Credentials::new(
                self.id.clone().unwrap_or_default(),
                key_id.clone(),
                secret.clone(),
            )),
            _ => None,
        }
    }

    /// Override the credentials file; `None` means `$HOME/.awsAuth`.
    pub fn set_credentials_file(&mut self, path: Option<PathBuf>) {
        self.credentials_file = path;
    }

    /// Load the key pair of `id` (or `$USER`) from the credentials file.
    ///
    /// The current key pair is cleared first, so on error the context has
    /// no credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the file cannot be located, is too
    /// permissive, is malformed, or has no entry for the id.
    pub fn read_credentials(&mut self, id: Option<&str>) -> ClientResult<()> {
        self.set_id(id);
        self.key_id = None;
        self.secret_key = None;

        let provider = match &self.credentials_file {
            Some(path) => FileCredentialProvider::new(path.clone()),
            None => FileCredentialProvider::from_home()?,
        };
        debug!(path = %provider.path().display(), "reading credentials file");
        self.load_credentials(&provider, id)
    }

    /// Load the key pair of `id` (or `$USER`) from any credential store.
    ///
    /// The current key pair is cleared first, so on error the context has
    /// no credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the store has no usable entry for
    /// the id.
    pub fn load_credentials(
        &mut self,
        provider: &dyn CredentialProvider,
        id: Option<&str>,
    ) -> ClientResult<()> {
        self.set_id(id);
        self.key_id = None;
        self.secret_key = None;

        let id = self.id.clone().unwrap_or_default();
        let credentials = provider.credentials(&id)?;

        info!(id = %id, key_id = %credentials.key_id(), "loaded credentials");
        self.key_id = Some(credentials.key_id().to_owned());
        self.secret_key = Some(credentials.secret_key().to_owned());
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Connection settings
    // ----------------------------------------------------------------------

    fn ensure_idle(&self) -> ClientResult<()> {
        if self.state == ConnectionState::InFlight {
            return Err(ClientError::RequestInFlight);
        }
        Ok(())
    }

    fn drop_transport(&mut self) {
        if self.transport.take().is_some() {
            debug!("connection settings changed, dropping transport");
            self.state = ConnectionState::Unbound;
        }
    }

    /// S3 endpoint host.
    #[must_use]
    pub fn s3_host(&self) -> &str {
        &self.s3_host
    }

    /// Set the S3 endpoint host.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInFlight`] while a request is running.
    pub fn set_s3_host(&mut self, host: &str) -> ClientResult<()> {
        self.ensure_idle()?;
        host.clone_into(&mut self.s3_host);
        Ok(())
    }

    /// Queue service endpoint host.
    #[must_use]
    pub fn sqs_host(&self) -> &str {
        &self.sqs_host
    }

    /// Set the queue service endpoint host.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInFlight`] while a request is running.
    pub fn set_sqs_host(&mut self, host: &str) -> ClientResult<()> {
        self.ensure_idle()?;
        host.clone_into(&mut self.sqs_host);
        Ok(())
    }

    /// HTTP proxy.
    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Route requests through `proxy`, or connect directly with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInFlight`] while a request is running.
    pub fn set_proxy(&mut self, proxy: Option<&str>) -> ClientResult<()> {
        self.ensure_idle()?;
        if self.proxy.as_deref() != proxy {
            self.proxy = proxy.map(str::to_owned);
            self.drop_transport();
        }
        Ok(())
    }

    /// Whether URLs use `https://`.
    #[must_use]
    pub fn https(&self) -> bool {
        self.https
    }

    /// Switch between `http://` and `https://`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInFlight`] while a request is running.
    pub fn set_https(&mut self, enable: bool) -> ClientResult<()> {
        self.ensure_idle()?;
        if self.https != enable {
            self.https = enable;
            self.drop_transport();
        }
        Ok(())
    }

    /// Skip TLS certificate verification.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInFlight`] while a request is running.
    pub fn set_https_insecure(&mut self, enable: bool) -> ClientResult<()> {
        self.ensure_idle()?;
        if self.https_insecure != enable {
            self.https_insecure = enable;
            self.drop_transport();
        }
        Ok(())
    }

    /// Keep the transport between requests.
    pub fn set_reuse_connections(&mut self, enable: bool) {
        self.reuse_connections = enable;
    }

    /// Whether the transport is kept between requests.
    #[must_use]
    pub fn reuse_connections(&self) -> bool {
        self.reuse_connections
    }

    /// Force the next reused request onto a fresh socket.
    pub fn reset_connection(&mut self) {
        self.reset_connection = true;
    }

    /// Current transport state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Scheme for request URLs.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.https { "https" } else { "http" }
    }

    // ----------------------------------------------------------------------
    // Request options
    // ----------------------------------------------------------------------

    /// Current bucket.
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Select the bucket for subsequent S3 requests.
    pub fn set_bucket(&mut self, bucket: Option<&str>) {
        self.bucket = bucket.map(str::to_owned);
    }

    /// `Content-Type` sent with writes.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Set the `Content-Type` sent with writes.
    pub fn set_mime_type(&mut self, mime_type: Option<&str>) {
        self.mime_type = mime_type.map(str::to_owned);
    }

    /// Canned ACL sent with writes.
    #[must_use]
    pub fn acl(&self) -> Option<&str> {
        self.acl.as_deref()
    }

    /// Set the canned ACL sent with writes.
    pub fn set_acl(&mut self, acl: Option<&str>) {
        self.acl = acl.map(str::to_owned);
    }

    /// Pending byte range.
    #[must_use]
    pub fn byte_range(&self) -> Option<ByteRange> {
        self.byte_range
    }

    /// Apply a byte range to the next GET, PUT or POST only. A zero length
    /// clears any pending range.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidByteRange`] if the last byte of the range
    /// does not fit in a `u64`; the pending range is left untouched.
    pub fn set_byte_range(&mut self, offset: u64, length: u64) -> ClientResult<()> {
        if length > 0 && offset.checked_add(length - 1).is_none() {
            return Err(ClientError::InvalidByteRange { offset, length });
        }
        self.byte_range = (length > 0).then_some(ByteRange::Span { offset, length });
        Ok(())
    }

    /// Make the next write append to the object (EMC extension).
    pub fn set_append_range(&mut self) {
        self.byte_range = Some(ByteRange::Append);
    }

    /// Consume the pending byte range.
    pub fn take_byte_range(&mut self) -> Option<ByteRange> {
        self.byte_range.take()
    }

    /// Whether writes request reduced-redundancy storage.
    #[must_use]
    pub fn reduced_redundancy(&self) -> bool {
        self.reduced_redundancy
    }

    /// Request reduced-redundancy storage for writes.
    pub fn set_reduced_redundancy(&mut self, enable: bool) {
        self.reduced_redundancy = enable;
    }

    /// Whether EMC extensions are enabled.
    #[must_use]
    pub fn emc_extensions(&self) -> bool {
        self.emc
    }

    /// Enable EMC extensions (byte ranges on writes).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConflictingExtensions`] when enabling while
    /// Scality extensions are on.
    pub fn set_emc_extensions(&mut self, enable: bool) -> ClientResult<()> {
        if enable && self.scality {
            return Err(ClientError::ConflictingExtensions);
        }
        self.emc = enable;
        Ok(())
    }

    /// Whether Scality extensions are enabled.
    #[must_use]
    pub fn scality_extensions(&self) -> bool {
        self.scality
    }

    /// Enable Scality extensions.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConflictingExtensions`] when enabling while
    /// EMC extensions are on.
    pub fn set_scality_extensions(&mut self, enable: bool) -> ClientResult<()> {
        if enable && self.emc {
            return Err(ClientError::ConflictingExtensions);
        }
        self.scality = enable;
        Ok(())
    }

    /// Whether requests are sent unsigned (sproxyd).
    #[must_use]
    pub fn sproxyd(&self) -> bool {
        self.sproxyd
    }

    /// Send requests without an `Authorization` header.
    pub fn set_sproxyd(&mut self, enable: bool) {
        self.sproxyd = enable;
    }

    /// Whether writes use chunked transfer encoding.
    #[must_use]
    pub fn chunked_transfer(&self) -> bool {
        self.chunked
    }

    /// Stream write bodies with chunked transfer encoding.
    pub fn set_chunked_transfer(&mut self, enable: bool) {
        self.chunked = enable;
    }

    /// Size of the metadata signing area.
    #[must_use]
    pub fn metadata_limit(&self) -> Option<usize> {
        self.metadata_limit
    }

    /// Bound the metadata signed per request; `None` signs everything.
    pub fn set_metadata_limit(&mut self, limit: Option<usize>) {
        self.metadata_limit = limit;
    }

    /// Growth size for buffers the client allocates itself.
    #[must_use]
    pub fn growth_size(&self) -> usize {
        self.growth_size
    }

    /// Set the growth size for buffers the client allocates itself.
    pub fn set_growth_size(&mut self, size: usize) {
        self.growth_size = size;
    }

    // ----------------------------------------------------------------------
    // Lifecycle
    // ----------------------------------------------------------------------

    /// An independent copy of every setting, with its own (not yet
    /// created) transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInFlight`] while a request is running.
    pub fn try_clone(&self) -> ClientResult<Self> {
        self.ensure_idle()?;
        Ok(Self {
            id: self.id.clone(),
            key_id: self.key_id.clone(),
            secret_key: self.secret_key.clone(),
            credentials_file: self.credentials_file.clone(),
            s3_host: self.s3_host.clone(),
            sqs_host: self.sqs_host.clone(),
            proxy: self.proxy.clone(),
            bucket: self.bucket.clone(),
            mime_type: self.mime_type.clone(),
            acl: self.acl.clone(),
            byte_range: self.byte_range,
            reduced_redundancy: self.reduced_redundancy,
            emc: self.emc,
            scality: self.scality,
            sproxyd: self.sproxyd,
            chunked: self.chunked,
            https: self.https,
            https_insecure: self.https_insecure,
            reuse_connections: self.reuse_connections,
            reset_connection: self.reset_connection,
            metadata_limit: self.metadata_limit,
            growth_size: self.growth_size,
            connector: Arc::clone(&self.connector),
            transport: None,
            state: ConnectionState::Unbound,
        })
    }

    /// Restore every setting to its default and drop the transport. The
    /// connector is kept.
    pub fn reset(&mut self) {
        *self = Self::new(Arc::clone(&self.connector));
    }

    // ----------------------------------------------------------------------
    // Execution
    // ----------------------------------------------------------------------

    fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            proxy: self.proxy.clone(),
            accept_invalid_certs: self.https_insecure,
        }
    }

    /// Prepare the transport for a request and mark the context in flight.
    /// Returns whether the request must use a fresh socket.
    fn enter(&mut self) -> ClientResult<bool> {
        self.ensure_idle()?;

        let reuse = self.reuse_connections;
        let mut fresh_connect = false;
        if let Some(transport) = self.transport.as_mut().filter(|_| reuse) {
            transport.reset();
            fresh_connect = self.reset_connection;
            debug!(fresh_connect, "reusing transport");
        } else {
            if self.transport.take().is_some() {
                debug!("connection reuse disabled, replacing transport");
            }
            self.transport = Some(self.connector.connect(&self.connection_settings())?);
        }

        self.state = ConnectionState::InFlight;
        Ok(fresh_connect)
    }

    fn exit(&mut self) {
        self.reset_connection = false;
        self.state = ConnectionState::Idle;
    }

    /// Run `request` over this context's transport.
    ///
    /// Completing at the HTTP level is success whatever the status code.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the transport cannot be created
    /// or the exchange fails, and [`ClientError::RequestInFlight`] if the
    /// context is still marked in flight.
    pub fn perform(
        &mut self,
        mut request: TransportRequest,
        exchange: &mut dyn Exchange,
    ) -> ClientResult<()> {
        request.fresh_connect = self.enter()?;

        debug!(method = %request.method, url = %request.url, "performing request");
        let result = match self.transport.as_mut() {
            Some(transport) => transport.perform(&request, exchange),
            None => Ok(()),
        };
        self.exit();

        result.map_err(|e| {
            debug!(error = %e, url = %request.url, "request failed");
            ClientError::Transport(e)
        })
    }
}
