use super::{CacheStats, SimCache};
use crate::addr::Align;
use crate::bus::LineBus;
use crate::error::{MemError, Result};
use tracing::trace;

//===========================================================================//

/// The largest number of index bits a [`DirectMappedCache`] may have.
pub const MAX_INDEX_BITS: u32 = 16;

struct CacheLine {
    valid: bool,
    dirty: bool,
    tag: u64,
    block: Box<[u8]>,
}

//===========================================================================//

/// A direct-mapped, write-back, write-allocate cache.
pub struct DirectMappedCache {
    index_bits: u32,
    line: Align,
    lines: Vec<CacheLine>,
    stats: CacheStats,
}

impl DirectMappedCache {
    /// Returns a new, empty cache with `1 << index_bits` lines of the given
    /// size.  Fails if `index_bits` is more than [`MAX_INDEX_BITS`].
    pub fn new(index_bits: u32, line: Align) -> Result<DirectMappedCache> {
        if index_bits > MAX_INDEX_BITS {
            return Err(MemError::Config(format!(
                "{index_bits} cache index bits is more than the maximum of \
                 {MAX_INDEX_BITS}"
            )));
        }
        let lines = (0..(1usize << index_bits))
            .map(|_| CacheLine {
                valid: false,
                dirty: false,
                tag: 0,
                block: vec![0u8; line.size() as usize].into_boxed_slice(),
            })
            .collect();
        Ok(DirectMappedCache {
            index_bits,
            line,
            lines,
            stats: CacheStats::default(),
        })
    }

    fn split(&self, paddr: u64) -> (usize, u64, usize) {
        let block_number = paddr >> self.line.log2();
        let index = (block_number & ((1u64 << self.index_bits) - 1)) as usize;
        let tag = block_number >> self.index_bits;
        (index, tag, self.line.offset_of(paddr) as usize)
    }

    fn line_base(&self, index: usize, tag: u64) -> u64 {
        ((tag << self.index_bits) | index as u64) << self.line.log2()
    }

    /// Makes sure the line holding `paddr` is cached, and returns its index
    /// and the offset of `paddr` within it.
    fn fetch(
        &mut self,
        bus: &mut dyn LineBus,
        paddr: u64,
    ) -> Result<(usize, usize)> {
        if bus.line_align() != self.line {
            return Err(MemError::LineSize {
                expected: bus.line_size(),
                actual: self.line.size() as usize,
            });
        }
        let (index, tag, offset) = self.split(paddr);
        let victim_base = self.line_base(index, self.lines[index].tag);
        let line = &mut self.lines[index];
        if line.valid && line.tag == tag {
            self.stats.hits += 1;
            return Ok((index, offset));
        }
        self.stats.misses += 1;
        if line.valid {
            self.stats.evictions += 1;
            if line.dirty {
                self.stats.dirty_evictions += 1;
                bus.bus_write_line(victim_base, &line.block)?;
            }
            trace!(victim_base, dirty = line.dirty, "cache eviction");
            line.valid = false;
        }
        bus.bus_read_line(paddr, &mut line.block)?;
        line.valid = true;
        line.dirty = false;
        line.tag = tag;
        Ok((index, offset))
    }
}

impl SimCache for DirectMappedCache {
    fn description(&self) -> String {
        format!(
            "direct-mapped cache, {} x {}B lines",
            self.lines.len(),
            self.line
        )
    }

    fn line_align(&self) -> Align {
        self.line
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }

    fn read_byte(&mut self, bus: &mut dyn LineBus, paddr: u64) -> Result<u8> {
        let (index, offset) = self.fetch(bus, paddr)?;
        Ok(self.lines[index].block[offset])
    }

    fn write_byte(
        &mut self,
        bus: &mut dyn LineBus,
        paddr: u64,
        data: u8,
    ) -> Result<()> {
        let (index, offset) = self.fetch(bus, paddr)?;
        let line = &mut self.lines[index];
        line.block[offset] = data;
        line.dirty = true;
        Ok(())
    }

    fn flush(&mut self, bus: &mut dyn LineBus) -> Result<()> {
        for index in 0..self.lines.len() {
            let base = self.line_base(index, self.lines[index].tag);
            let line = &mut self.lines[index];
            if line.valid && line.dirty {
                bus.bus_write_line(base, &line.block)?;
            }
            line.valid = false;
            line.dirty = false;
        }
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
