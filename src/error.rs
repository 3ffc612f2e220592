//! The error type shared by every memory operation in this crate.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

//===========================================================================//

/// An error encountered while accessing simulated physical memory or its
/// swap backing store.
#[derive(Debug)]
pub enum MemError {
    /// An access would touch bytes outside of physical memory.
    OutOfRange {
        /// The first physical address of the attempted access.
        addr: u64,
        /// The number of bytes in the attempted access.
        len: usize,
        /// The size of physical memory, in bytes.
        capacity: usize,
    },
    /// A cache line buffer handed to the bus was not exactly one line long.
    LineSize {
        /// The configured cache line size, in bytes.
        expected: usize,
        /// The length of the buffer that was supplied.
        actual: usize,
    },
    /// Instruction text did not fit in an instruction slot (including its
    /// NUL terminator).
    SlotOverflow {
        /// The length of the rejected text, in bytes.
        len: usize,
    },
    /// A page was swapped in from a disk address that has no page file.
    SwapMissing {
        /// The disk address of the missing page.
        daddr: u64,
        /// The path where the page file was expected.
        path: PathBuf,
    },
    /// A page file exists but does not hold a well-formed page.
    SwapFormat {
        /// The disk address of the malformed page.
        daddr: u64,
        /// What was wrong with the file.
        message: String,
    },
    /// Reading or writing a page file failed for some other reason.
    SwapIo {
        /// The disk address of the page being transferred.
        daddr: u64,
        /// The page file being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// Every disk address is already taken by a page file, so no new page
    /// can be allocated in the swap store.
    SwapExhausted,
    /// A memory configuration was internally inconsistent.
    Config(String),
}

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemError::OutOfRange { addr, len, capacity } => write!(
                f,
                "{len}-byte access at {addr:#x} is outside of \
                 {capacity:#x} bytes of physical memory"
            ),
            MemError::LineSize { expected, actual } => write!(
                f,
                "cache line buffer is {actual} bytes, expected {expected}"
            ),
            MemError::SlotOverflow { len } => write!(
                f,
                "instruction text of {len} bytes does not fit in a \
                 {}-byte slot",
                crate::mem::SLOT_WIDTH
            ),
            MemError::SwapMissing { daddr, path } => write!(
                f,
                "no swap page for disk address {daddr} at {}",
                path.display()
            ),
            MemError::SwapFormat { daddr, message } => {
                write!(f, "malformed swap page {daddr}: {message}")
            }
            MemError::SwapIo { daddr, path, source } => write!(
                f,
                "I/O error on swap page {daddr} ({}): {source}",
                path.display()
            ),
            MemError::SwapExhausted => {
                write!(f, "no free disk addresses left in the swap store")
            }
            MemError::Config(message) => {
                write!(f, "invalid memory configuration: {message}")
            }
        }
    }
}

impl Error for MemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MemError::SwapIo { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MemError> for io::Error {
    fn from(error: MemError) -> io::Error {
        let kind = match &error {
            MemError::SwapMissing { .. } => io::ErrorKind::NotFound,
            MemError::SwapIo { source, .. } => source.kind(),
            MemError::SwapFormat { .. } => io::ErrorKind::InvalidData,
            MemError::SwapExhausted => io::ErrorKind::StorageFull,
            _ => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, error)
    }
}

/// A specialized `Result` type for memory operations.
pub type Result<T> = std::result::Result<T, MemError>;

//===========================================================================//


//===========================================================================//
