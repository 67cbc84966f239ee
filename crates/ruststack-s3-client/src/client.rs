//! S3 object operations.
//!
//! Every operation signs the request with the context's credentials (unless
//! sproxyd mode is on), sends it, and decodes the response status, `ETag`,
//! `Last-Modified`, `Content-Length` and `x-amz-meta-*` headers into the
//! caller's buffer. A request that reaches the server returns `Ok(())` even
//! when the server answers with an error status; check
//! [`IoBuf::status_code`] afterwards.
//!
//! Headers are sent in this order:
//!
//! | Operation | Headers |
//! |-----------|---------|
//! | PUT, POST | `Content-Type`, `x-amz-acl`, `x-amz-storage-class`, `Range`, `Date`, `Authorization`, `x-amz-meta-*`, `Transfer-Encoding` |
//! | GET, HEAD | `Range`, `Date`, `Authorization` |
//! | DELETE | `Date`, `Authorization` |

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE, RANGE, TRANSFER_ENCODING};
use http::{HeaderName, HeaderValue, Method};
use ruststack_client_core::{
    BodySink, BodySource, BufferExchange, ByteRange, ClientError, ClientResult, RequestBody,
    RequestContext, TransportRequest,
};
use ruststack_iobuf::IoBuf;
use ruststack_sigv2::canonical::{META_HEADER_PREFIX, SigningInput, canonical_resource, http_date};
use ruststack_sigv2::sign;
use tracing::debug;

type HeaderList = Vec<(HeaderName, HeaderValue)>;

fn push_header(headers: &mut HeaderList, name: HeaderName, value: &str) -> ClientResult<()> {
    let value = HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader {
        name: name.as_str().to_owned(),
        value: value.to_owned(),
    })?;
    headers.push((name, value));
    Ok(())
}

fn push_metadata(headers: &mut HeaderList, buf: &IoBuf<'_>) -> ClientResult<()> {
    for (key, value) in buf.metadata().iter() {
        let invalid = || ClientError::InvalidHeader {
            name: format!("{META_HEADER_PREFIX}{key}"),
            value: value.to_owned(),
        };
        let name = HeaderName::from_bytes(format!("{META_HEADER_PREFIX}{key}").as_bytes())
            .map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.push((name, value));
    }
    Ok(())
}

/// S3 operations over a borrowed [`RequestContext`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use ruststack_client_core::{HttpConnector, RequestContext};
/// use ruststack_iobuf::IoBuf;
/// use ruststack_s3_client::S3Client;
///
/// let mut ctx = RequestContext::new(Arc::new(HttpConnector));
/// ctx.read_credentials(None)?;
/// ctx.set_bucket(Some("mybucket"));
///
/// let mut buf = IoBuf::new();
/// buf.append(b"hello")?;
/// S3Client::new(&mut ctx).put(&mut buf, "greeting.txt")?;
/// assert_eq!(buf.status_code(), Some(200));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct S3Client<'c> {
    ctx: &'c mut RequestContext,
}

impl<'c> S3Client<'c> {
    /// Issue requests through `ctx`.
    pub fn new(ctx: &'c mut RequestContext) -> Self {
        Self { ctx }
    }

    /// The underlying context.
    pub fn context(&mut self) -> &mut RequestContext {
        self.ctx
    }

    /// Download `object` from the current bucket into `buf`.
    ///
    /// A pending byte range is sent as a standard `Range` header and then
    /// cleared.
    pub fn get(&mut self, buf: &mut IoBuf<'_>, object: &str) -> ClientResult<()> {
        self.get_or_head(Method::GET, buf, object, None)
    }

    /// Like [`get`](Self::get), but writes the body to `dst` when given.
    /// Headers are still decoded into `buf`.
    pub fn get_with(
        &mut self,
        buf: &mut IoBuf<'_>,
        object: &str,
        dst: Option<&Path>,
    ) -> ClientResult<()> {
        self.get_or_head(Method::GET, buf, object, dst)
    }

    /// Fetch the headers of `object`. The raw header lines are also appended
    /// to `buf`.
    pub fn head(&mut self, buf: &mut IoBuf<'_>, object: &str) -> ClientResult<()> {
        self.get_or_head(Method::HEAD, buf, object, None)
    }

    /// Like [`head`](Self::head), but writes the raw header lines to `dst`
    /// when given.
    pub fn head_with(
        &mut self,
        buf: &mut IoBuf<'_>,
        object: &str,
        dst: Option<&Path>,
    ) -> ClientResult<()> {
        self.get_or_head(Method::HEAD, buf, object, dst)
    }

    /// Upload the readable contents of `buf` as `object`.
    pub fn put(&mut self, buf: &mut IoBuf<'_>, object: &str) -> ClientResult<()> {
        self.put_or_post(Method::PUT, buf, object, None, None::<&mut IoBuf<'_>>)
    }

    /// Like [`put`](Self::put), but uploads from `src` when given and
    /// captures the response body in `response` when given.
    pub fn put_with<'r>(
        &mut self,
        buf: &mut IoBuf<'_>,
        object: &str,
        src: Option<&Path>,
        response: Option<&mut IoBuf<'r>>,
    ) -> ClientResult<()> {
        self.put_or_post(Method::PUT, buf, object, src, response)
    }

    /// Like [`put`](Self::put), with POST. Query parameters may be appended
    /// to the object name, e.g. `"key?uploads"`.
    pub fn post(&mut self, buf: &mut IoBuf<'_>, object: &str) -> ClientResult<()> {
        self.put_or_post(Method::POST, buf, object, None, None::<&mut IoBuf<'_>>)
    }

    /// Like [`put_with`](Self::put_with), with POST.
    pub fn post_with<'r>(
        &mut self,
        buf: &mut IoBuf<'_>,
        object: &str,
        src: Option<&Path>,
        response: Option<&mut IoBuf<'r>>,
    ) -> ClientResult<()> {
        self.put_or_post(Method::POST, buf, object, src, response)
    }

    /// Append the contents of `buf` to `object` (EMC extension).
    pub fn emc_put_append(&mut self, buf: &mut IoBuf<'_>, object: &str) -> ClientResult<()> {
        self.ctx.set_append_range();
        self.put(buf, object)
    }

    /// Like [`emc_put_append`](Self::emc_put_append), with the options of
    /// [`put_with`](Self::put_with).
    pub fn emc_put_append_with<'r>(
        &mut self,
        buf: &mut IoBuf<'_>,
        object: &str,
        src: Option<&Path>,
        response: Option<&mut IoBuf<'r>>,
    ) -> ClientResult<()> {
        self.ctx.set_append_range();
        self.put_with(buf, object, src, response)
    }

    /// Delete `object` from the current bucket. Any error document the
    /// server returns is appended to `buf`.
    pub fn delete(&mut self, buf: &mut IoBuf<'_>, object: &str) -> ClientResult<()> {
        let date = http_date(&Utc::now());
        let resource = self.resource(object);
        let input = SigningInput {
            method: "DELETE",
            date: &date,
            resource: &resource,
            ..SigningInput::default()
        };

        let mut headers = HeaderList::new();
        push_header(&mut headers, DATE, &date)?;
        if let Some(authorization) = self.authorization(&input)? {
            push_header(&mut headers, AUTHORIZATION, &authorization)?;
        }

        let mut request = TransportRequest::new(Method::DELETE, self.url(&resource));
        request.headers = headers;
        let mut exchange = BufferExchange::new(buf);
        let result = self.ctx.perform(request, &mut exchange);
        drop(exchange);

        log_outcome("DELETE", &resource, buf);
        result
    }

    fn resource(&self, object: &str) -> String {
        canonical_resource(self.ctx.bucket(), self.ctx.s3_host(), object)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}://{}/{resource}", self.ctx.scheme(), self.ctx.s3_host())
    }

    /// The `Authorization` value for `input`, or `None` in sproxyd mode.
    fn authorization(&self, input: &SigningInput<'_>) -> ClientResult<Option<String>> {
        if self.ctx.sproxyd() {
            return Ok(None);
        }
        let credentials = self.ctx.credentials().ok_or(ClientError::MissingSignature)?;
        let signed = sign(&credentials, input, self.ctx.metadata_limit());
        Ok(Some(signed.authorization))
    }

    fn get_or_head(
        &mut self,
        method: Method,
        buf: &mut IoBuf<'_>,
        object: &str,
        dst: Option<&Path>,
    ) -> ClientResult<()> {
        let range = self.ctx.take_byte_range();
        if range == Some(ByteRange::Append) {
            return Err(ClientError::AppendRangeOnRead);
        }

        let date = http_date(&Utc::now());
        let resource = self.resource(object);
        let input = SigningInput {
            method: method.as_str(),
            date: &date,
            resource: &resource,
            ..SigningInput::default()
        };

        let mut headers = HeaderList::new();
        if let Some(range) = range {
            push_header(&mut headers, RANGE, &range.header_value())?;
        }
        push_header(&mut headers, DATE, &date)?;
        if let Some(authorization) = self.authorization(&input)? {
            push_header(&mut headers, AUTHORIZATION, &authorization)?;
        }

        let sink = match dst {
            Some(path) => BodySink::File(File::create(path).map_err(|source| {
                ClientError::File {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => BodySink::Buffer,
        };

        let head = method == Method::HEAD;
        let mut request = TransportRequest::new(method, self.url(&resource));
        request.headers = headers;
        let mut exchange = BufferExchange::new(buf)
            .with_sink(sink)
            .mirror_headers(head);
        let result = self.ctx.perform(request, &mut exchange);
        drop(exchange);

        log_outcome(if head { "HEAD" } else { "GET" }, &resource, buf);
        result
    }

    fn put_or_post<'r>(
        &mut self,
        method: Method,
        buf: &mut IoBuf<'_>,
        object: &str,
        src: Option<&Path>,
        response: Option<&mut IoBuf<'r>>,
    ) -> ClientResult<()> {
        let range = self.ctx.take_byte_range();
        if range.is_some() && !self.ctx.emc_extensions() {
            return Err(ClientError::ByteRangeRequiresEmc);
        }

        let date = http_date(&Utc::now());
        let resource = self.resource(object);
        let input = SigningInput {
            method: method.as_str(),
            content_type: self.ctx.mime_type(),
            date: &date,
            acl: self.ctx.acl(),
            reduced_redundancy: self.ctx.reduced_redundancy(),
            metadata: buf.metadata().iter().collect(),
            resource: &resource,
        };
        let authorization = self.authorization(&input)?;

        let mut headers = HeaderList::new();
        if let Some(mime_type) = self.ctx.mime_type() {
            push_header(&mut headers, CONTENT_TYPE, mime_type)?;
        }
        if let Some(acl) = self.ctx.acl() {
            push_header(&mut headers, HeaderName::from_static("x-amz-acl"), acl)?;
        }
        if self.ctx.reduced_redundancy() {
            push_header(
                &mut headers,
                HeaderName::from_static("x-amz-storage-class"),
                "REDUCED_REDUNDANCY",
            )?;
        }
        if let Some(range) = range {
            push_header(&mut headers, RANGE, &range.header_value())?;
        }
        push_header(&mut headers, DATE, &date)?;
        if let Some(authorization) = authorization {
            push_header(&mut headers, AUTHORIZATION, &authorization)?;
        }
        push_metadata(&mut headers, buf)?;

        let chunked = self.ctx.chunked_transfer() || buf.chunked_transfer();
        if chunked {
            push_header(&mut headers, TRANSFER_ENCODING, "chunked")?;
        }

        let (source, body) = match src {
            Some(path) => {
                let file_error = |source| ClientError::File {
                    path: path.to_path_buf(),
                    source,
                };
                let file = File::open(path).map_err(file_error)?;
                let len = file.metadata().map_err(file_error)?.len();
                let body = if chunked {
                    RequestBody::Chunked
                } else {
                    RequestBody::Sized(len)
                };
                (BodySource::File(file), body)
            }
            None => {
                let body = if chunked {
                    RequestBody::Chunked
                } else {
                    RequestBody::Sized(buf.available() as u64)
                };
                (BodySource::Buffer, body)
            }
        };
        let sink = response.map_or(BodySink::Discard, BodySink::Response);

        let mut request = TransportRequest::new(method.clone(), self.url(&resource));
        request.headers = headers;
        request.body = body;
        let mut exchange = BufferExchange::new(buf).with_source(source).with_sink(sink);
        let result = self.ctx.perform(request, &mut exchange);
        drop(exchange);

        log_outcome(method.as_str(), &resource, buf);
        result
    }
}

fn log_outcome(method: &str, resource: &str, buf: &IoBuf<'_>) {
    debug!(
        method,
        resource,
        status = ?buf.status_code(),
        etag = ?buf.etag(),
        content_length = buf.content_length(),
        "S3 request complete"
    );
}
