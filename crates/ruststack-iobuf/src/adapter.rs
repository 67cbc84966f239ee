//! Transport-facing adapters.
//!
//! During a request the transport talks to a buffer through three callbacks:
//!
//! - **header**: one raw response header line at a time;
//! - **write**: response body bytes as they arrive;
//! - **read**: request body bytes as the transport needs them.
//!
//! Each callback returns the number of bytes it consumed or produced. A
//! header or write callback that consumes fewer bytes than offered makes the
//! transport abort the request.
//!
//! The default behaviour decodes headers into [`ResponseInfo`](crate::ResponseInfo)
//! and the metadata list, appends response bytes, and serves request bytes
//! with [`IoBuf::read_line`]. Callers may install their own closures, e.g. to
//! stream a request body from another thread; overrides survive
//! [`IoBuf::reset`].

use tracing::warn;

use crate::buffer::IoBuf;
use crate::response::decode_header_line;

/// Custom handler for response header lines.
pub type HeaderAdapter<'a> = Box<dyn FnMut(&mut IoBuf<'a>, &[u8]) -> usize + Send + 'a>;

/// Custom handler for response body bytes.
pub type WriteAdapter<'a> = Box<dyn FnMut(&mut IoBuf<'a>, &[u8]) -> usize + Send + 'a>;

/// Custom producer of request body bytes.
pub type ReadAdapter<'a> = Box<dyn FnMut(&mut IoBuf<'a>, &mut [u8]) -> usize + Send + 'a>;

impl<'a> IoBuf<'a> {
    /// Install a custom header handler.
    pub fn set_header_adapter<F>(&mut self, f: F)
    where
        F: FnMut(&mut IoBuf<'a>, &[u8]) -> usize + Send + 'a,
    {
        self.header_adapter = Some(Box::new(f));
    }

    /// Install a custom response-body handler.
    pub fn set_write_adapter<F>(&mut self, f: F)
    where
        F: FnMut(&mut IoBuf<'a>, &[u8]) -> usize + Send + 'a,
    {
        self.write_adapter = Some(Box::new(f));
    }

    /// Install a custom request-body producer.
    pub fn set_read_adapter<F>(&mut self, f: F)
    where
        F: FnMut(&mut IoBuf<'a>, &mut [u8]) -> usize + Send + 'a,
    {
        self.read_adapter = Some(Box::new(f));
    }

    /// Remove all adapter overrides.
    pub fn clear_adapters(&mut self) {
        self.header_adapter = None;
        self.write_adapter = None;
        self.read_adapter = None;
    }

    /// Whether a custom read adapter is installed.
    #[must_use]
    pub fn has_read_adapter(&self) -> bool {
        self.read_adapter.is_some()
    }

    /// Feed one response header line through the installed or default handler.
    pub fn on_header(&mut self, line: &[u8]) -> usize {
        match self.header_adapter.take() {
            Some(mut f) => {
                let n = f(self, line);
                if self.header_adapter.is_none() {
                    self.header_adapter = Some(f);
                }
                n
            }
            None => self.default_header(line),
        }
    }

    /// Feed response body bytes through the installed or default handler.
    pub fn on_write(&mut self, data: &[u8]) -> usize {
        match self.write_adapter.take() {
            Some(mut f) => {
                let n = f(self, data);
                if self.write_adapter.is_none() {
                    self.write_adapter = Some(f);
                }
                n
            }
            None => self.default_write(data),
        }
    }

    /// Pull request body bytes through the installed or default handler.
    pub fn on_read(&mut self, dst: &mut [u8]) -> usize {
        match self.read_adapter.take() {
            Some(mut f) => {
                let n = f(self, dst);
                if self.read_adapter.is_none() {
                    self.read_adapter = Some(f);
                }
                n
            }
            None => self.default_read(dst),
        }
    }

    /// Default header handling: decode status, `ETag`, `Last-Modified`,
    /// `Content-Length` and `x-amz-meta-*` into this buffer.
    pub fn default_header(&mut self, line: &[u8]) -> usize {
        let (response, metadata) = self.response_and_metadata_mut();
        decode_header_line(response, metadata, line)
    }

    /// Default body handling: append the bytes. Returns `0` when the bytes
    /// could not be stored, which aborts the transfer.
    pub fn default_write(&mut self, data: &[u8]) -> usize {
        match self.append(data) {
            Ok(()) => data.len(),
            Err(e) => {
                warn!(error = %e, len = data.len(), "failed to store response bytes");
                0
            }
        }
    }

    /// Default request-body production: serve the next line of buffered data.
    pub fn default_read(&mut self, dst: &mut [u8]) -> usize {
        self.read_line(dst)
    }
}
