//! Contiguous storage regions that make up an [`IoBuf`](crate::IoBuf).
//!
//! Each [`Segment`] owns or borrows one region of bytes and tracks how much
//! of it has been written. Ownership is carried by the [`Storage`] variant,
//! so borrowed regions are released by the borrow checker rather than by the
//! buffer.

use std::fmt;

use crate::error::{IoBufError, IoBufResult};

/// Backing storage of a single segment.
pub enum Storage<'a> {
    /// Storage allocated by the buffer itself (appended copies, auto-grown space).
    Owned(Vec<u8>),
    /// Caller-provided storage whose ownership was handed to the buffer.
    Adopted(Vec<u8>),
    /// Read-only caller storage that the buffer never frees.
    Borrowed(&'a [u8]),
    /// Writable caller storage that the buffer never frees.
    BorrowedMut(&'a mut [u8]),
}

/// Ownership tag reported by [`Segment::ownership`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Allocated and owned by the buffer.
    Owned,
    /// Handed over by the caller; dropped with the buffer.
    Adopted,
    /// Caller-owned; never released by the buffer.
    Borrowed,
}

impl Storage<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Owned(v) | Self::Adopted(v) => v,
            Self::Borrowed(s) => s,
            Self::BorrowedMut(s) => s,
        }
    }

    fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Owned(v) | Self::Adopted(v) => Some(v),
            Self::BorrowedMut(s) => Some(s),
            Self::Borrowed(_) => None,
        }
    }
}

/// One contiguous region of bytes inside a segmented buffer.
///
/// Invariant: `written <= capacity`.
pub struct Segment<'a> {
    storage: Storage<'a>,
    written: usize,
}

impl<'a> Segment<'a> {
    /// Create a segment over `storage` with `written` bytes already filled.
    pub(crate) fn new(storage: Storage<'a>, written: usize) -> Self {
        let capacity = storage.bytes().len();
        Self {
            storage,
            written: written.min(capacity),
        }
    }

    /// Allocate an owned, zero-filled segment of `capacity` bytes.
    pub(crate) fn allocate(capacity: usize) -> IoBufResult<Self> {
        Ok(Self::new(Storage::Owned(try_alloc(capacity)?), 0))
    }

    /// Total size of the storage region.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.bytes().len()
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Bytes still free for writing. Read-only storage never has room.
    #[must_use]
    pub fn remaining(&self) -> usize {
        match self.storage {
            Storage::Borrowed(_) => 0,
            _ => self.capacity() - self.written,
        }
    }

    /// The written portion of the segment.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.storage.bytes()[..self.written]
    }

    /// The full storage region, including bytes past `written`.
    #[must_use]
    pub fn storage(&self) -> &[u8] {
        self.storage.bytes()
    }

    /// Ownership tag of the backing storage.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        match self.storage {
            Storage::Owned(_) => Ownership::Owned,
            Storage::Adopted(_) => Ownership::Adopted,
            Storage::Borrowed(_) | Storage::BorrowedMut(_) => Ownership::Borrowed,
        }
    }

    /// Copy as much of `src` as fits; returns the number of bytes copied.
    pub(crate) fn fill(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.remaining());
        if n == 0 {
            return 0;
        }
        let start = self.written;
        if let Some(dst) = self.storage.bytes_mut() {
            dst[start..start + n].copy_from_slice(&src[..n]);
            self.written += n;
            n
        } else {
            0
        }
    }
}

impl fmt::Debug for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("ownership", &self.ownership())
            .field("capacity", &self.capacity())
            .field("written", &self.written)
            .finish()
    }
}

/// Allocate a zero-filled vector, reporting allocation failure as an error.
pub(crate) fn try_alloc(len: usize) -> IoBufResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| IoBufError::OutOfMemory { requested: len })?;
    v.resize(len, 0);
    Ok(v)
}
