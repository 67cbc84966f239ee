//! Wiring between an [`IoBuf`] and a transport.
//!
//! Response headers always go through the primary buffer's header adapter.
//! The request body comes from the buffer or from a file, and the response
//! body goes to the buffer, a second buffer, a file, or nowhere.

use std::fs::File;
use std::io::{Read, Write};

use ruststack_iobuf::IoBuf;
use tracing::warn;

use crate::transport::Exchange;

/// Where request body bytes come from.
#[derive(Debug)]
pub enum BodySource {
    /// No body.
    None,
    /// The primary buffer's read adapter.
    Buffer,
    /// An open file, read to its end.
    File(File),
}

/// Where response body bytes go.
pub enum BodySink<'s, 'r> {
    /// The primary buffer's write adapter.
    Buffer,
    /// Another buffer's write adapter.
    Response(&'s mut IoBuf<'r>),
    /// An open file.
    File(File),
    /// Dropped.
    Discard,
}

impl std::fmt::Debug for BodySink<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffer => f.write_str("Buffer"),
            Self::Response(buf) => f.debug_tuple("Response").field(buf).finish(),
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
            Self::Discard => f.write_str("Discard"),
        }
    }
}

/// An [`Exchange`] over a primary buffer.
#[derive(Debug)]
pub struct BufferExchange<'s, 'a, 'r> {
    buf: &'s mut IoBuf<'a>,
    source: BodySource,
    sink: BodySink<'s, 'r>,
    mirror_headers: bool,
}

impl<'s, 'a, 'r> BufferExchange<'s, 'a, 'r> {
    /// Headers and body both go to `buf`; nothing is uploaded.
    pub fn new(buf: &'s mut IoBuf<'a>) -> Self {
        Self {
            buf,
            source: BodySource::None,
            sink: BodySink::Buffer,
            mirror_headers: false,
        }
    }

    /// Upload from `source`.
    #[must_use]
    pub fn with_source(mut self, source: BodySource) -> Self {
        self.source = source;
        self
    }

    /// Send the response body to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: BodySink<'s, 'r>) -> Self {
        self.sink = sink;
        self
    }

    /// Also write each raw header line to the body sink.
    #[must_use]
    pub fn mirror_headers(mut self, enable: bool) -> Self {
        self.mirror_headers = enable;
        self
    }

    fn sink_write(&mut self, data: &[u8]) -> usize {
        match &mut self.sink {
            BodySink::Buffer => self.buf.on_write(data),
            BodySink::Response(response) => response.on_write(data),
            BodySink::File(file) => match file.write_all(data) {
                Ok(()) => data.len(),
                Err(e) => {
                    warn!(error = %e, "failed to write response body to file");
                    0
                }
            },
            BodySink::Discard => data.len(),
        }
    }
}

impl Exchange for BufferExchange<'_, '_, '_> {
    fn on_header(&mut self, line: &[u8]) -> usize {
        let consumed = self.buf.on_header(line);
        if self.mirror_headers && consumed == line.len() {
            return self.sink_write(line);
        }
        consumed
    }

    fn on_write(&mut self, data: &[u8]) -> usize {
        self.sink_write(data)
    }

    fn on_read(&mut self, dst: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.source {
            BodySource::None => Ok(0),
            BodySource::Buffer => Ok(self.buf.on_read(dst)),
            BodySource::File(file) => loop {
                match file.read(dst) {
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        warn!(error = %e, "failed to read request body from file");
                        break Err(e);
                    }
                    read => break read,
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Seek;

    use super::*;

    #[test]
    fn test_should_route_headers_and_body_to_buffer() {
        let mut buf = IoBuf::new();
        {
            let mut exchange = BufferExchange::new(&mut buf);
            exchange.on_header(b"HTTP/1.1 200 OK\r\n");
            exchange.on_header(b"x-amz-meta-color: red\r\n");
            exchange.on_write(b"payload");
        }
        assert_eq!(buf.status_code(), Some(200));
        assert_eq!(buf.metadata_value("color"), Some("red"));
        assert_eq!(buf.to_vec(), b"payload");
    }

    #[test]
    fn test_should_send_body_to_response_buffer() {
        let mut buf = IoBuf::new();
        buf.append(b"request").unwrap();
        let mut response = IoBuf::new();
        {
            let mut exchange = BufferExchange::new(&mut buf)
                .with_source(BodySource::Buffer)
                .with_sink(BodySink::Response(&mut response));
            let mut dst = [0_u8; 16];
            assert_eq!(exchange.on_read(&mut dst).unwrap(), 7);
            exchange.on_header(b"HTTP/1.1 201 Created\r\n");
            exchange.on_write(b"<ok/>");
        }
        assert_eq!(buf.status_code(), Some(201));
        assert_eq!(response.to_vec(), b"<ok/>");
        assert!(response.status_code().is_none());
    }

    #[test]
    fn test_should_mirror_headers_into_body() {
        let mut buf = IoBuf::new();
        {
            let mut exchange = BufferExchange::new(&mut buf).mirror_headers(true);
            exchange.on_header(b"HTTP/1.1 200 OK\r\n");
            exchange.on_header(b"Content-Length: 12\r\n");
        }
        assert_eq!(buf.content_length(), 12);
        assert_eq!(buf.to_vec(), b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\n");
    }

    #[test]
    fn test_should_stream_file_source_and_sink() {
        let mut upload = tempfile::tempfile().unwrap();
        upload.write_all(b"file body").unwrap();
        upload.rewind().unwrap();
        let mut download = tempfile::tempfile().unwrap();

        let mut buf = IoBuf::new();
        {
            let mut exchange = BufferExchange::new(&mut buf)
                .with_source(BodySource::File(upload))
                .with_sink(BodySink::File(download.try_clone().unwrap()));
            let mut dst = [0_u8; 64];
            assert_eq!(exchange.on_read(&mut dst).unwrap(), 9);
            assert_eq!(exchange.on_read(&mut dst).unwrap(), 0);
            assert_eq!(exchange.on_write(b"downloaded"), 10);
        }
        assert!(buf.is_empty());

        download.rewind().unwrap();
        let mut content = String::new();
        download.read_to_string(&mut content).unwrap();
        assert_eq!(content, "downloaded");
    }

    #[test]
    fn test_should_surface_file_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let write_only = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(dir.path().join("upload"))
            .unwrap();

        let mut buf = IoBuf::new();
        let mut exchange = BufferExchange::new(&mut buf).with_source(BodySource::File(write_only));
        let mut dst = [0_u8; 16];
        assert!(exchange.on_read(&mut dst).is_err());
    }

    #[test]
    fn test_should_discard_body() {
        let mut buf = IoBuf::new();
        {
            let mut exchange = BufferExchange::new(&mut buf).with_sink(BodySink::Discard);
            assert_eq!(exchange.on_write(b"ignored"), 7);
        }
        assert!(buf.is_empty());
    }
}
