//! HTTP transport backed by a blocking `reqwest` client.

use std::io::{self, Read};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use http::Version;
use reqwest::blocking::{Body, Client, Response};
use tracing::{debug, trace, warn};

use crate::error::TransportError;
use crate::transport::{
    ConnectionSettings, Connector, Exchange, RequestBody, Transport, TransportRequest,
};

/// Size of the chunks pulled from request sources and pushed to response sinks.
const IO_CHUNK: usize = 16 * 1024;

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Request body chunks buffered between the exchange and the sender.
const BODY_QUEUE: usize = 4;

/// Builds [`HttpTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(HttpTransport::new(settings.clone())?))
    }
}

/// A transport owning one `reqwest` connection pool.
#[derive(Debug)]
pub struct HttpTransport {
    settings: ConnectionSettings,
    client: Client,
}

impl HttpTransport {
    /// Build a transport for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] if the proxy is malformed or the
    /// TLS backend cannot be initialized.
    pub fn new(settings: ConnectionSettings) -> Result<Self, TransportError> {
        let client = build_client(&settings)?;
        Ok(Self { settings, client })
    }
}

fn build_client(settings: &ConnectionSettings) -> Result<Client, TransportError> {
    let mut builder = Client::builder()
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(settings.accept_invalid_certs);

    if let Some(proxy) = settings.proxy.as_deref() {
        let url = if proxy.contains("://") {
            proxy.to_owned()
        } else {
            format!("http://{proxy}")
        };
        let proxy = reqwest::Proxy::all(&url)
            .map_err(|e| TransportError::Connect(format!("invalid proxy {url}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| TransportError::Connect(e.to_string()))
}

/// Reader half of a streamed request body.
///
/// Chunks arrive from [`pump_body`] on the caller's thread. A closed channel
/// ends the body; an error chunk fails the upload.
struct ChannelReader {
    rx: Receiver<io::Result<Vec<u8>>>,
    chunk: Vec<u8>,
    pos: usize,
}

impl ChannelReader {
    fn new(rx: Receiver<io::Result<Vec<u8>>>) -> Self {
        Self {
            rx,
            chunk: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.chunk.len() {
            match self.rx.recv() {
                Ok(Ok(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(0),
            }
        }
        let n = dst.len().min(self.chunk.len() - self.pos);
        dst[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Feed request body bytes from `exchange` into `tx`, stopping after `limit`
/// bytes when one is given. Returns the number of bytes sent.
///
/// A read error or a body shorter than `limit` is forwarded to the reader so
/// the upload fails instead of completing with a truncated body.
fn pump_body(
    exchange: &mut dyn Exchange,
    limit: Option<u64>,
    tx: &SyncSender<io::Result<Vec<u8>>>,
) -> Result<u64, TransportError> {
    let mut sent = 0_u64;
    let mut chunk = vec![0_u8; IO_CHUNK];
    loop {
        let want = limit.map_or(IO_CHUNK, |l| {
            usize::try_from(l - sent).map_or(IO_CHUNK, |rest| rest.min(IO_CHUNK))
        });
        if want == 0 {
            return Ok(sent);
        }
        let n = match exchange.on_read(&mut chunk[..want]) {
            Ok(n) => n,
            Err(e) => {
                let _ = tx.send(Err(io::Error::new(e.kind(), e.to_string())));
                return Err(e.into());
            }
        };
        if n == 0 {
            break;
        }
        sent += n as u64;
        if tx.send(Ok(chunk[..n].to_vec())).is_err() {
            // The sender stopped reading; its own error is reported instead.
            return Ok(sent);
        }
    }
    match limit {
        Some(expected) if sent < expected => {
            let _ = tx.send(Err(io::ErrorKind::UnexpectedEof.into()));
            Err(TransportError::ShortBody {
                expected,
                actual: sent,
            })
        }
        _ => Ok(sent),
    }
}

/// Send `builder` with a body streamed out of `exchange`.
fn send_streamed(
    builder: reqwest::blocking::RequestBuilder,
    exchange: &mut dyn Exchange,
    limit: Option<u64>,
) -> Result<Response, TransportError> {
    let (tx, rx) = sync_channel(BODY_QUEUE);
    let reader = ChannelReader::new(rx);
    let body = match limit {
        Some(len) => Body::sized(reader, len),
        None => Body::new(reader),
    };
    let request = builder.body(body);

    std::thread::scope(|scope| {
        let sender = scope.spawn(move || request.send());
        let pumped = pump_body(exchange, limit, &tx);
        drop(tx);
        let sent = sender
            .join()
            .map_err(|_| TransportError::Connect("request sender panicked".into()))?;
        match pumped {
            Ok(bytes) => {
                trace!(declared = ?limit, sent = bytes, "streamed request body");
                Ok(sent?)
            }
            Err(e) => {
                warn!(error = %e, "request body failed");
                Err(e)
            }
        }
    })
}

fn status_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/1.1",
    }
}

impl Transport for HttpTransport {
    fn perform(
        &mut self,
        request: &TransportRequest,
        exchange: &mut dyn Exchange,
    ) -> Result<(), TransportError> {
        if request.fresh_connect {
            debug!("opening fresh connection");
            self.client = build_client(&self.settings)?;
        }

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            // Framing headers are produced from the body below.
            if name == http::header::TRANSFER_ENCODING || name == http::header::CONTENT_LENGTH {
                continue;
            }
            builder = builder.header(name.clone(), value.clone());
        }

        let mut response = match request.body {
            RequestBody::Empty => builder.send()?,
            RequestBody::Sized(0) => builder.body(Vec::new()).send()?,
            RequestBody::Sized(len) => send_streamed(builder, exchange, Some(len))?,
            RequestBody::Chunked => send_streamed(builder, exchange, None)?,
        };

        let status = response.status();
        let status_line = format!(
            "{} {} {}\r\n",
            status_version(response.version()),
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        deliver_header(exchange, status_line.as_bytes())?;
        for (name, value) in response.headers() {
            let mut line = Vec::with_capacity(name.as_str().len() + value.len() + 4);
            line.extend_from_slice(name.as_str().as_bytes());
            line.extend_from_slice(b": ");
            line.extend_from_slice(value.as_bytes());
            line.extend_from_slice(b"\r\n");
            deliver_header(exchange, &line)?;
        }
        deliver_header(exchange, b"\r\n")?;

        let mut chunk = vec![0_u8; IO_CHUNK];
        loop {
            let n = match response.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if exchange.on_write(&chunk[..n]) < n {
                return Err(TransportError::Aborted { stage: "write" });
            }
        }

        Ok(())
    }
}

fn deliver_header(exchange: &mut dyn Exchange, line: &[u8]) -> Result<(), TransportError> {
    if exchange.on_header(line) < line.len() {
        return Err(TransportError::Aborted { stage: "header" });
    }
    Ok(())
}
