//! Configuration of the simulated memory hierarchy.

use crate::addr::Align;
use crate::error::{MemError, Result};
use std::path::PathBuf;

//===========================================================================//

/// Size of physical memory used by [`MemConfig::default`], in bytes.
pub const DEFAULT_PM_SIZE: usize = 0x10000;

/// Cache line offset width used by [`MemConfig::default`] (64-byte lines).
pub const DEFAULT_LINE_OFFSET_BITS: u32 = 6;

/// Page offset width used by [`MemConfig::default`] (4096-byte pages).
pub const DEFAULT_PAGE_OFFSET_BITS: u32 = 12;

/// Swap directory used by [`MemConfig::default`].
pub const DEFAULT_SWAP_DIR: &str = "files/swap";

//===========================================================================//

/// Describes the geometry of simulated physical memory and how word
/// accesses reach it.
///
/// A configuration is fixed once a [`Dram`](crate::mem::Dram) is built from
/// it; the memory layer only ever reads these values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemConfig {
    /// Size of physical memory, in bytes.
    pub pm_size: usize,
    /// Base-2 logarithm of the cache line size.
    pub line_offset_bits: u32,
    /// Base-2 logarithm of the page size.
    pub page_offset_bits: u32,
    /// If true, word reads and writes go through the attached cache rather
    /// than straight to physical memory.
    pub route_through_cache: bool,
    /// Directory holding one file per swapped-out page.
    pub swap_dir: PathBuf,
}

impl MemConfig {
    /// Returns the cache line granularity.
    pub fn line_align(&self) -> Result<Align> {
        Align::from_log2(self.line_offset_bits).ok_or_else(|| {
            MemError::Config(format!(
                "line offset of {} bits is too large",
                self.line_offset_bits
            ))
        })
    }

    /// Returns the page frame granularity.
    pub fn page_align(&self) -> Result<Align> {
        Align::from_log2(self.page_offset_bits).ok_or_else(|| {
            MemError::Config(format!(
                "page offset of {} bits is too large",
                self.page_offset_bits
            ))
        })
    }

    /// Checks that the geometry is self-consistent: pages hold whole words
    /// and whole cache lines, and physical memory holds whole pages.
    pub fn validate(&self) -> Result<()> {
        let line = self.line_align()?;
        let page = self.page_align()?;
        if page.log2() < 3 {
            return Err(MemError::Config(format!(
                "{page}-byte pages cannot hold a 64-bit word"
            )));
        }
        if line > page {
            return Err(MemError::Config(format!(
                "{line}-byte cache lines are larger than {page}-byte pages"
            )));
        }
        if page.size() >= usize::MAX as u64 {
            return Err(MemError::Config(format!(
                "{page}-byte pages cannot be addressed on this host"
            )));
        }
        if self.pm_size == 0 || !page.is_aligned(self.pm_size as u64) {
            return Err(MemError::Config(format!(
                "physical memory size {:#x} is not a nonzero multiple of \
                 the {page}-byte page size",
                self.pm_size
            )));
        }
        Ok(())
    }
}

impl Default for MemConfig {
    fn default() -> MemConfig {
        MemConfig {
            pm_size: DEFAULT_PM_SIZE,
            line_offset_bits: DEFAULT_LINE_OFFSET_BITS,
            page_offset_bits: DEFAULT_PAGE_OFFSET_BITS,
            route_through_cache: false,
            swap_dir: PathBuf::from(DEFAULT_SWAP_DIR),
        }
    }
}

//===========================================================================//


//===========================================================================//
