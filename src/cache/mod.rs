//! The contract between the word access layer and an SRAM cache.

use crate::addr::Align;
use crate::bus::LineBus;
use crate::error::Result;

mod direct;

pub use direct::{DirectMappedCache, MAX_INDEX_BITS};

//===========================================================================//

/// A simulated cache sitting in front of physical memory.
///
/// The memory layer only ever calls these entry points.  Whenever the cache
/// needs to fill or evict a line it does so through the [`LineBus`] it is
/// handed, which is how it reaches physical memory.
pub trait SimCache {
    /// Returns a human-readable description of this cache.
    fn description(&self) -> String;

    /// Returns the size of this cache's lines.  This must match the line
    /// size of the bus the cache is used with.
    fn line_align(&self) -> Align;

    /// Returns the counters accumulated so far.
    fn stats(&self) -> CacheStats;

    /// Reads a single byte through the cache.
    fn read_byte(&mut self, bus: &mut dyn LineBus, paddr: u64) -> Result<u8>;

    /// Writes a single byte through the cache.
    fn write_byte(
        &mut self,
        bus: &mut dyn LineBus,
        paddr: u64,
        data: u8,
    ) -> Result<()>;

    /// Writes every dirty line back over the bus and invalidates the whole
    /// cache, so that physical memory holds the only copy of its contents.
    fn flush(&mut self, bus: &mut dyn LineBus) -> Result<()>;
}

//===========================================================================//

/// Hit, miss, and eviction counters for a cache.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CacheStats {
    /// Accesses served by a line that was already cached.
    pub hits: u64,
    /// Accesses that had to fill a line from memory.
    pub misses: u64,
    /// Misses that displaced a valid line.
    pub evictions: u64,
    /// Evictions that had to write a dirty line back to memory.
    pub dirty_evictions: u64,
}

impl CacheStats {
    /// Returns the counts accumulated between `earlier` and `self`.
    pub fn since(self, earlier: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits - earlier.hits,
            misses: self.misses - earlier.misses,
            evictions: self.evictions - earlier.evictions,
            dirty_evictions: self.dirty_evictions - earlier.dirty_evictions,
        }
    }
}

//===========================================================================//


//===========================================================================//
