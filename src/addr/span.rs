use super::Align;
use crate::error::{MemError, Result};
use std::ops;

//===========================================================================//

/// Represents a run of consecutive physical memory bytes.
///
/// A `Span` by itself is not known to be in bounds; call [`Span::within`]
/// to check it against the size of physical memory before touching any
/// bytes.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Span {
    start: u64,
    len: usize,
}

impl Span {
    /// Returns the span of `len` bytes starting at `start`.
    pub fn new(start: u64, len: usize) -> Span {
        Span { start, len }
    }

    /// Returns the span of the whole aligned unit (e.g. cache line or page
    /// frame) that contains `addr`.
    pub fn unit_containing(addr: u64, align: Align) -> Span {
        Span::new(align.base_of(addr), align.size() as usize)
    }

    /// Returns the first address in the span.
    pub fn start(self) -> u64 {
        self.start
    }

    /// Returns the number of bytes in the span.
    pub fn len(self) -> usize {
        self.len
    }

    /// Returns true if the span contains no bytes.
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns the address one past the last byte of the span, or `None` if
    /// that would overflow.
    pub fn end(self) -> Option<u64> {
        self.start.checked_add(self.len as u64)
    }

    /// Checks that this span lies entirely within a memory of `capacity`
    /// bytes, and if so returns the corresponding index range.
    pub fn within(self, capacity: usize) -> Result<ops::Range<usize>> {
        match self.end() {
            Some(end) if end <= capacity as u64 => {
                Ok(self.start as usize..end as usize)
            }
            _ => Err(MemError::OutOfRange {
                addr: self.start,
                len: self.len,
                capacity,
            }),
        }
    }
}

//===========================================================================//


//===========================================================================//
