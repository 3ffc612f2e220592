//! The I/O bus between a cache and physical memory, which moves whole cache
//! lines at a time.

use crate::addr::{Align, Span};
use crate::error::{MemError, Result};
use crate::mem::PhysMem;
use tracing::trace;

//===========================================================================//

/// Counts the line transfers that a bus has served.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BusStats {
    /// Number of lines copied out of memory (cache fills).
    pub lines_read: u64,
    /// Number of lines copied into memory (cache write-backs).
    pub lines_written: u64,
}

//===========================================================================//

/// A bus that transfers cache lines to and from physical memory.
///
/// Both transfer methods operate on the whole line that contains the given
/// address, no matter where within that line the address falls, and the
/// supplied buffer must be exactly one line long.
pub trait LineBus {
    /// Returns the cache line granularity of this bus.
    fn line_align(&self) -> Align;

    /// Returns the cache line size of this bus, in bytes.
    fn line_size(&self) -> usize {
        self.line_align().size() as usize
    }

    /// Copies the line containing `paddr` out of memory into `block`.
    fn bus_read_line(&mut self, paddr: u64, block: &mut [u8]) -> Result<()>;

    /// Copies `block` into memory, replacing the line containing `paddr`.
    fn bus_write_line(&mut self, paddr: u64, block: &[u8]) -> Result<()>;
}

fn check_block_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MemError::LineSize { expected, actual });
    }
    Ok(())
}

impl LineBus for PhysMem {
    fn line_align(&self) -> Align {
        PhysMem::line_align(self)
    }

    fn bus_read_line(&mut self, paddr: u64, block: &mut [u8]) -> Result<()> {
        let span = Span::unit_containing(paddr, PhysMem::line_align(self));
        check_block_len(span.len(), block.len())?;
        block.copy_from_slice(self.bytes(span)?);
        self.stats_mut().lines_read += 1;
        trace!(paddr, base = span.start(), "bus read line");
        Ok(())
    }

    fn bus_write_line(&mut self, paddr: u64, block: &[u8]) -> Result<()> {
        let span = Span::unit_containing(paddr, PhysMem::line_align(self));
        check_block_len(span.len(), block.len())?;
        self.bytes_mut(span)?.copy_from_slice(block);
        self.stats_mut().lines_written += 1;
        trace!(paddr, base = span.start(), "bus write line");
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
