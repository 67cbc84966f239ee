//! The segmented streaming buffer.
//!
//! An [`IoBuf`] is an ordered chain of [`Segment`]s with a write cursor (the
//! segment receiving appended bytes) and a read cursor (segment and offset
//! being consumed). It sits between caller data and the transport: the
//! transport pulls request bodies out of it and pushes response bodies and
//! headers into it through the adapters in [`crate::adapter`].
//!
//! # Cursors
//!
//! - Appends fill the current write segment, move on to the next
//!   pre-staged segment when it is full, and otherwise allocate a new
//!   segment of `max(len, growth_size)` bytes.
//! - Reads never move past the write boundary of the segment they point
//!   into, and never leave the segment still being written. Data appended
//!   after a read returned `0` is therefore picked up by the next read.
//!
//! # Example
//!
//! ```
//! use ruststack_iobuf::IoBuf;
//!
//! let mut buf = IoBuf::new();
//! buf.append(b"Hello\n").unwrap();
//! buf.append(b"World\n").unwrap();
//!
//! let mut line = [0_u8; 64];
//! let n = buf.read_line(&mut line);
//! assert_eq!(&line[..n], b"Hello\n");
//! ```

use std::any::Any;
use std::fmt;

use tracing::trace;

use crate::adapter::{HeaderAdapter, ReadAdapter, WriteAdapter};
use crate::error::{IoBufError, IoBufResult};
use crate::metadata::MetadataList;
use crate::response::ResponseInfo;
use crate::segment::{Segment, Storage};

/// Chunk size used by [`IoBuf::read_full_line`].
const LINE_CHUNK: usize = 1024;

/// A growable chain of byte segments with independent read and write cursors.
///
/// Besides the payload, a buffer carries the decoded response of the last
/// request ([`ResponseInfo`]), a [`MetadataList`], optional adapter overrides
/// and an opaque user value.
///
/// The buffer does no internal locking. It may be moved between threads, but
/// only one party may touch it at a time.
pub struct IoBuf<'a> {
    segments: Vec<Segment<'a>>,
    write_index: Option<usize>,
    read_index: usize,
    read_offset: usize,
    capacity: usize,
    written: usize,
    available: usize,
    growth_size: usize,
    response: ResponseInfo,
    metadata: MetadataList,
    chunked: bool,
    pub(crate) header_adapter: Option<HeaderAdapter<'a>>,
    pub(crate) read_adapter: Option<ReadAdapter<'a>>,
    pub(crate) write_adapter: Option<WriteAdapter<'a>>,
    user_data: Option<Box<dyn Any + Send>>,
}

impl Default for IoBuf<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IoBuf<'a> {
    /// Create an empty buffer that allocates exactly what each append needs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_growth_size(0)
    }

    /// Create an empty buffer whose auto-allocated segments hold at least
    /// `growth_size` bytes.
    #[must_use]
    pub fn with_growth_size(growth_size: usize) -> Self {
        Self {
            segments: Vec::new(),
            write_index: None,
            read_index: 0,
            read_offset: 0,
            capacity: 0,
            written: 0,
            available: 0,
            growth_size,
            response: ResponseInfo::default(),
            metadata: MetadataList::new(),
            chunked: false,
            header_adapter: None,
            read_adapter: None,
            write_adapter: None,
            user_data: None,
        }
    }

    /// Minimum size of segments allocated by [`append`](Self::append).
    #[must_use]
    pub fn growth_size(&self) -> usize {
        self.growth_size
    }

    /// Change the minimum size of future auto-allocated segments.
    pub fn set_growth_size(&mut self, size: usize) {
        self.growth_size = size;
    }

    // ----------------------------------------------------------------------
    // Producer side
    // ----------------------------------------------------------------------

    /// Copy `data` into the buffer, splitting it across segments as needed.
    pub fn append(&mut self, data: &[u8]) -> IoBufResult<()> {
        let mut rest = data;
        while !rest.is_empty() {
            let index = match self.writable_segment() {
                Some(index) => index,
                None => {
                    let size = rest.len().max(self.growth_size);
                    self.push_segment(Segment::allocate(size)?);
                    trace!(
                        segment_size = size,
                        segments = self.segments.len(),
                        capacity = self.capacity,
                        "grew buffer"
                    );
                    self.segments.len() - 1
                }
            };
            self.write_index = Some(index);
            let n = self.segments[index].fill(rest);
            self.written += n;
            self.available += n;
            rest = &rest[n..];
        }
        Ok(())
    }

    /// Copy a string into the buffer.
    pub fn append_str(&mut self, data: &str) -> IoBufResult<()> {
        self.append(data.as_bytes())
    }

    /// Take ownership of `data` and add it as a full segment at the tail.
    ///
    /// No copy is made. Unused room in earlier segments is skipped by later
    /// appends.
    pub fn append_adopted(&mut self, data: Vec<u8>) {
        if data.is_empty() {
            return;
        }
        let len = data.len();
        self.push_full_segment(Segment::new(Storage::Adopted(data), len));
    }

    /// Add caller-owned bytes as a full segment at the tail without copying.
    ///
    /// The buffer never frees or modifies this storage.
    pub fn append_borrowed(&mut self, data: &'a [u8]) {
        if data.is_empty() {
            return;
        }
        self.push_full_segment(Segment::new(Storage::Borrowed(data), data.len()));
    }

    /// Append an empty owned segment of `max(len, growth_size)` bytes to
    /// receive future writes.
    pub fn extend(&mut self, len: usize) -> IoBufResult<()> {
        let size = len.max(self.growth_size);
        self.push_segment(Segment::allocate(size)?);
        Ok(())
    }

    /// Append `storage` as an empty segment to receive future writes.
    /// The buffer takes ownership; existing contents are treated as free room.
    pub fn extend_adopted(&mut self, storage: Vec<u8>) {
        self.push_segment(Segment::new(Storage::Adopted(storage), 0));
    }

    /// Append caller-owned `storage` as an empty segment to receive future
    /// writes. The buffer never frees it.
    pub fn extend_borrowed(&mut self, storage: &'a mut [u8]) {
        self.push_segment(Segment::new(Storage::BorrowedMut(storage), 0));
    }

    fn push_segment(&mut self, segment: Segment<'a>) {
        self.capacity += segment.capacity();
        self.segments.push(segment);
    }

    fn push_full_segment(&mut self, segment: Segment<'a>) {
        let len = segment.written();
        self.push_segment(segment);
        self.write_index = Some(self.segments.len() - 1);
        self.written += len;
        self.available += len;
    }

    /// Index of the segment the next append should write into, advancing the
    /// write cursor over full segments.
    fn writable_segment(&self) -> Option<usize> {
        let start = self.write_index.unwrap_or(0);
        (start..self.segments.len()).find(|&i| self.segments[i].remaining() > 0)
    }

    // ----------------------------------------------------------------------
    // Consumer side
    // ----------------------------------------------------------------------

    /// Copy bytes up to and including the next `'\n'`, or until `dst` is full
    /// or the written data is exhausted. Returns the number of bytes copied,
    /// which is `0` at end of data.
    pub fn read_line(&mut self, dst: &mut [u8]) -> usize {
        self.read_into(dst, true)
    }

    /// Copy up to `dst.len()` bytes, ignoring line boundaries.
    pub fn read_raw(&mut self, dst: &mut [u8]) -> usize {
        self.read_into(dst, false)
    }

    /// Read one whole line of any length into `out`, replacing its contents.
    /// Returns the line length, `0` at end of data.
    pub fn read_full_line(&mut self, out: &mut Vec<u8>) -> usize {
        out.clear();
        let mut chunk = [0_u8; LINE_CHUNK];
        loop {
            let n = self.read_line(&mut chunk);
            out.extend_from_slice(&chunk[..n]);
            if n == 0 || chunk[n - 1] == b'\n' {
                return out.len();
            }
        }
    }

    fn read_into(&mut self, dst: &mut [u8], stop_at_newline: bool) -> usize {
        let mut copied = 0;
        while copied < dst.len() {
            let Some(segment) = self.segments.get(self.read_index) else {
                break;
            };
            let data = segment.data();
            if self.read_offset >= data.len() {
                if self.can_leave_read_segment() {
                    self.read_index += 1;
                    self.read_offset = 0;
                    continue;
                }
                break;
            }

            let chunk = &data[self.read_offset..];
            let want = chunk.len().min(dst.len() - copied);
            let n = if stop_at_newline {
                chunk[..want]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(want, |pos| pos + 1)
            } else {
                want
            };

            dst[copied..copied + n].copy_from_slice(&chunk[..n]);
            copied += n;
            self.read_offset += n;
            self.available -= n;

            if stop_at_newline && dst[copied - 1] == b'\n' {
                break;
            }
        }
        copied
    }

    /// The read cursor may move on only when a later segment exists and the
    /// current one is no longer receiving writes.
    fn can_leave_read_segment(&self) -> bool {
        self.read_index + 1 < self.segments.len()
            && self.write_index.is_some_and(|w| w > self.read_index)
    }

    // ----------------------------------------------------------------------
    // Whole-buffer operations
    // ----------------------------------------------------------------------

    /// Collapse all written data into one owned segment.
    ///
    /// The new segment has room for one terminator byte (zero) after the
    /// data; the terminator is not counted in [`written`](Self::written).
    /// The read cursor is reset to the start of the data, so a caller that
    /// was reading mid-stream will see everything again.
    pub fn consolidate(&mut self) -> IoBufResult<()> {
        if self.segments.is_empty() {
            return Ok(());
        }
        let total = self.written;
        let mut data = Vec::new();
        data.try_reserve_exact(total + 1)
            .map_err(|_| IoBufError::OutOfMemory {
                requested: total + 1,
            })?;
        for segment in &self.segments {
            data.extend_from_slice(segment.data());
        }
        data.push(0);

        trace!(
            bytes = total,
            segments = self.segments.len(),
            "consolidated buffer"
        );
        self.segments = vec![Segment::new(Storage::Owned(data), total)];
        self.capacity = total + 1;
        self.write_index = Some(0);
        self.read_index = 0;
        self.read_offset = 0;
        self.available = total;
        Ok(())
    }

    /// The written data as one slice, when it lives in at most one segment.
    #[must_use]
    pub fn as_contiguous(&self) -> Option<&[u8]> {
        match self.segments.as_slice() {
            [] => Some(&[]),
            [only] => Some(only.data()),
            _ => None,
        }
    }

    /// The written data followed by its zero terminator, available right
    /// after [`consolidate`](Self::consolidate).
    #[must_use]
    pub fn as_terminated(&self) -> Option<&[u8]> {
        let [only] = self.segments.as_slice() else {
            return None;
        };
        let storage = only.storage();
        (storage.get(only.written()) == Some(&0)).then(|| &storage[..=only.written()])
    }

    /// Copy all written data (read or not) into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.written);
        for segment in &self.segments {
            out.extend_from_slice(segment.data());
        }
        out
    }

    /// Release all segments, the decoded response and the metadata list.
    ///
    /// Installed adapters, the growth size, the chunked-transfer preference
    /// and the user value survive, so a buffer can be reused across requests.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.write_index = None;
        self.read_index = 0;
        self.read_offset = 0;
        self.capacity = 0;
        self.written = 0;
        self.available = 0;
        self.response = ResponseInfo::default();
        self.metadata.clear();
    }

    /// [`reset`](Self::reset), then also drop the adapters, the user value
    /// and the chunked-transfer preference. Only the growth size is kept.
    pub fn full_reset(&mut self) {
        self.reset();
        self.header_adapter = None;
        self.read_adapter = None;
        self.write_adapter = None;
        self.user_data = None;
        self.chunked = false;
    }

    // ----------------------------------------------------------------------
    // Accessors
    // ----------------------------------------------------------------------

    /// Total storage across all segments.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes written across all segments.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Bytes written but not yet read.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// The segment chain, first to last.
    #[must_use]
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Response fields decoded during the last request.
    #[must_use]
    pub fn response(&self) -> &ResponseInfo {
        &self.response
    }

    /// Mutable access to the decoded response fields.
    pub fn response_mut(&mut self) -> &mut ResponseInfo {
        &mut self.response
    }

    /// Status code of the last response, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.response.status_code
    }

    /// Status text of the last response (e.g. `"200 OK"`).
    #[must_use]
    pub fn status_text(&self) -> Option<&str> {
        self.response.status_text.as_deref()
    }

    /// `ETag` of the last response.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.response.etag.as_deref()
    }

    /// `Last-Modified` of the last response.
    #[must_use]
    pub fn last_modified(&self) -> Option<&str> {
        self.response.last_modified.as_deref()
    }

    /// `Content-Length` of the last response.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.response.content_length
    }

    /// Metadata to send, or metadata received.
    #[must_use]
    pub fn metadata(&self) -> &MetadataList {
        &self.metadata
    }

    /// Mutable access to the metadata list.
    pub fn metadata_mut(&mut self) -> &mut MetadataList {
        &mut self.metadata
    }

    pub(crate) fn response_and_metadata_mut(&mut self) -> (&mut ResponseInfo, &mut MetadataList) {
        (&mut self.response, &mut self.metadata)
    }

    /// Replace the metadata list.
    pub fn set_metadata(&mut self, metadata: MetadataList) {
        self.metadata = metadata;
    }

    /// Look up one metadata value.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key)
    }

    /// Whether uploads from this buffer use chunked transfer encoding.
    #[must_use]
    pub fn chunked_transfer(&self) -> bool {
        self.chunked
    }

    /// Request chunked transfer encoding for uploads from this buffer.
    pub fn set_chunked_transfer(&mut self, enable: bool) {
        self.chunked = enable;
    }

    /// Attach an opaque value, e.g. state for a custom adapter.
    pub fn set_user_data(&mut self, data: Box<dyn Any + Send>) {
        self.user_data = Some(data);
    }

    /// Borrow the attached value as `T`.
    #[must_use]
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref().and_then(|d| d.downcast_ref())
    }

    /// Mutably borrow the attached value as `T`.
    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_data.as_deref_mut().and_then(|d| d.downcast_mut())
    }

    /// Detach and return the attached value.
    pub fn take_user_data(&mut self) -> Option<Box<dyn Any + Send>> {
        self.user_data.take()
    }
}

impl fmt::Debug for IoBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoBuf")
            .field("segments", &self.segments)
            .field("write_index", &self.write_index)
            .field("read_index", &self.read_index)
            .field("read_offset", &self.read_offset)
            .field("capacity", &self.capacity)
            .field("written", &self.written)
            .field("available", &self.available)
            .field("growth_size", &self.growth_size)
            .field("response", &self.response)
            .field("metadata", &self.metadata)
            .field("chunked", &self.chunked)
            .field("header_adapter", &self.header_adapter.is_some())
            .field("read_adapter", &self.read_adapter.is_some())
            .field("write_adapter", &self.write_adapter.is_some())
            .field("user_data", &self.user_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Ownership;

    fn drain_raw(buf: &mut IoBuf<'_>, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut tmp = vec![0_u8; chunk];
        loop {
            let n = buf.read_raw(&mut tmp);
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&tmp[..n]);
        }
    }

    fn read_line_vec(buf: &mut IoBuf<'_>, max: usize) -> Vec<u8> {
        let mut tmp = vec![0_u8; max];
        let n = buf.read_line(&mut tmp);
        tmp.truncate(n);
        tmp
    }

    #[test]
    fn test_should_read_lines_appended_separately() {
        let mut buf = IoBuf::new();
        buf.append(b"Hello\n").unwrap();
        buf.append(b"World\n").unwrap();

        assert_eq!(read_line_vec(&mut buf, 64), b"Hello\n");
        assert_eq!(read_line_vec(&mut buf, 64), b"World\n");
        assert!(read_line_vec(&mut buf, 64).is_empty());
    }

    #[test]
    fn test_should_read_line_across_segment_boundary() {
        let mut buf = IoBuf::with_growth_size(6);
        buf.append(b"Hello").unwrap();
        assert_eq!(buf.segments().len(), 1);
        assert_eq!(buf.segments()[0].capacity(), 6);

        buf.append(b"World\n22").unwrap();
        assert_eq!(buf.segments().len(), 2);

        assert_eq!(read_line_vec(&mut buf, 64), b"HelloWorld\n");
        assert_eq!(read_line_vec(&mut buf, 64), b"22");
        assert!(read_line_vec(&mut buf, 64).is_empty());
    }

    #[test]
    fn test_should_round_trip_regardless_of_chunk_boundaries() {
        let inputs: [&[u8]; 5] = [b"a", b"bcdefgh", b"", b"\n\x00\xffxyz", b"0123456789"];
        let expected: Vec<u8> = inputs.concat();

        for growth in [0, 1, 3, 8, 64] {
            for chunk in [1, 2, 5, 100] {
                let mut buf = IoBuf::with_growth_size(growth);
                for input in inputs {
                    buf.append(input).unwrap();
                }
                assert_eq!(buf.written(), expected.len());
                assert_eq!(drain_raw(&mut buf, chunk), expected);
                assert_eq!(buf.available(), 0);
            }
        }
    }

    #[test]
    fn test_should_only_end_lines_with_newline_and_stay_empty_at_eof() {
        let mut buf = IoBuf::with_growth_size(4);
        buf.append(b"one\ntwo\n\nthree").unwrap();

        let mut lines = Vec::new();
        loop {
            let line = read_line_vec(&mut buf, 3);
            if line.is_empty() {
                break;
            }
            lines.push(line);
        }
        for line in &lines {
            let body = &line[..line.len() - 1];
            assert!(!body.contains(&b'\n'));
        }
        assert_eq!(lines.concat(), b"one\ntwo\n\nthree");
        assert!(read_line_vec(&mut buf, 3).is_empty());
        assert!(read_line_vec(&mut buf, 3).is_empty());
    }

    #[test]
    fn test_should_see_data_appended_after_eof() {
        let mut buf = IoBuf::with_growth_size(16);
        buf.append(b"first\n").unwrap();
        assert_eq!(read_line_vec(&mut buf, 64), b"first\n");
        assert!(read_line_vec(&mut buf, 64).is_empty());

        buf.append(b"second\n").unwrap();
        assert_eq!(read_line_vec(&mut buf, 64), b"second\n");
    }

    #[test]
    fn test_should_read_full_line_longer_than_chunk() {
        let long = "x".repeat(3000);
        let mut buf = IoBuf::new();
        buf.append_str(&long).unwrap();
        buf.append(b"\nnext\n").unwrap();

        let mut line = Vec::new();
        assert_eq!(buf.read_full_line(&mut line), 3001);
        assert_eq!(&line[..3000], long.as_bytes());
        assert_eq!(buf.read_full_line(&mut line), 5);
        assert_eq!(line, b"next\n");
        assert_eq!(buf.read_full_line(&mut line), 0);
    }

    #[test]
    fn test_should_consolidate_into_single_terminated_segment() {
        let mut buf = IoBuf::with_growth_size(3);
        buf.append(b"abc").unwrap();
        buf.append(b"defg").unwrap();
        buf.append_borrowed(b"hi");
        let before = buf.written();
        assert!(buf.segments().len() > 1);
        assert!(buf.as_contiguous().is_none());

        buf.consolidate().unwrap();

        assert_eq!(buf.segments().len(), 1);
        assert_eq!(buf.segments()[0].written(), before);
        assert_eq!(buf.written(), before);
        assert_eq!(buf.as_contiguous(), Some(&b"abcdefghi"[..]));
        assert_eq!(buf.as_terminated(), Some(&b"abcdefghi\0"[..]));
        assert_eq!(buf.segments()[0].ownership(), Ownership::Owned);
    }

    #[test]
    fn test_should_reset_read_cursor_on_consolidate() {
        let mut buf = IoBuf::with_growth_size(4);
        buf.append(b"line1\nline2\n").unwrap();
        assert_eq!(read_line_vec(&mut buf, 64), b"line1\n");

        buf.consolidate().unwrap();
        assert_eq!(buf.available(), buf.written());
        assert_eq!(read_line_vec(&mut buf, 64), b"line1\n");
    }

    #[test]
    fn test_should_keep_appending_after_consolidate() {
        let mut buf = IoBuf::new();
        buf.append(b"ab").unwrap();
        buf.append(b"cd").unwrap();
        buf.consolidate().unwrap();
        buf.append(b"ef").unwrap();
        assert_eq!(buf.to_vec(), b"abcdef");
        assert_eq!(drain_raw(&mut buf, 4), b"abcdef");
    }

    #[test]
    fn test_should_fill_extended_segments_before_allocating() {
        let mut buf = IoBuf::new();
        buf.extend(4).unwrap();
        buf.extend(4).unwrap();
        assert_eq!(buf.capacity(), 8);

        buf.append(b"123456").unwrap();
        assert_eq!(buf.segments().len(), 2);
        assert_eq!(buf.segments()[0].data(), b"1234");
        assert_eq!(buf.segments()[1].data(), b"56");
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn test_should_write_into_borrowed_extension() {
        let mut region = [0_u8; 5];
        {
            let mut buf = IoBuf::new();
            buf.extend_borrowed(&mut region);
            buf.append(b"abc").unwrap();
            assert_eq!(buf.segments()[0].ownership(), Ownership::Borrowed);
            assert_eq!(drain_raw(&mut buf, 8), b"abc");
        }
        assert_eq!(&region[..3], b"abc");
    }

    #[test]
    fn test_should_adopt_storage_without_copy() {
        let mut buf = IoBuf::new();
        buf.append(b"head-").unwrap();
        buf.append_adopted(b"body".to_vec());
        buf.append(b"-tail").unwrap();

        assert_eq!(buf.segments().len(), 3);
        assert_eq!(buf.segments()[1].ownership(), Ownership::Adopted);
        assert_eq!(buf.segments()[1].written(), 4);
        assert_eq!(drain_raw(&mut buf, 3), b"head-body-tail");
    }

    #[test]
    fn test_should_preserve_settings_across_reset() {
        let mut buf = IoBuf::with_growth_size(32);
        buf.set_chunked_transfer(true);
        buf.set_user_data(Box::new(7_u32));
        buf.set_write_adapter(|b, data| b.default_write(data));
        buf.append(b"payload").unwrap();
        buf.metadata_mut().set("k", "v");
        buf.response_mut().status_code = Some(200);

        buf.reset();

        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
        assert!(buf.metadata().is_empty());
        assert_eq!(buf.status_code(), None);
        assert_eq!(buf.growth_size(), 32);
        assert!(buf.chunked_transfer());
        assert_eq!(buf.user_data::<u32>(), Some(&7));
        assert!(buf.write_adapter.is_some());
    }

    #[test]
    fn test_should_drop_everything_but_growth_on_full_reset() {
        let mut buf = IoBuf::with_growth_size(32);
        buf.set_chunked_transfer(true);
        buf.set_user_data(Box::new("state"));
        buf.set_read_adapter(|b, dst| b.default_read(dst));

        buf.full_reset();

        assert_eq!(buf.growth_size(), 32);
        assert!(!buf.chunked_transfer());
        assert!(buf.user_data::<&str>().is_none());
        assert!(buf.read_adapter.is_none());
    }

    #[test]
    fn test_should_describe_buffer_in_debug_output() {
        let mut buf = IoBuf::new();
        buf.append(b"abc").unwrap();
        let out = format!("{buf:?}");
        assert!(out.contains("written: 3"));
        assert!(out.contains("Segment"));
    }
}
