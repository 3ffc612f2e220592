//! Facilities for representing simulated physical memory (DRAM) and the
//! word-level accesses the processor makes to it.

use crate::addr::{Align, Span};
use crate::bus::BusStats;
use crate::config::MemConfig;
use crate::error::{MemError, Result};
use byteorder::{ByteOrder, LittleEndian};

mod dram;
mod slot;

pub use dram::Dram;
pub use slot::{SLOT_WIDTH, decode_slot, encode_slot};

//===========================================================================//

/// The physical memory store: a fixed-size, byte-addressable array holding
/// the authoritative contents of every physical address.
///
/// All accessors are bounds-checked, and reject an out-of-range access
/// before touching any byte.
pub struct PhysMem {
    bytes: Box<[u8]>,
    line: Align,
    page: Align,
    stats: BusStats,
}

impl PhysMem {
    /// Returns a new zero-filled physical memory with the geometry of the
    /// given configuration.
    pub fn new(config: &MemConfig) -> Result<PhysMem> {
        config.validate()?;
        Ok(PhysMem {
            bytes: vec![0u8; config.pm_size].into_boxed_slice(),
            line: config.line_align()?,
            page: config.page_align()?,
            stats: BusStats::default(),
        })
    }

    /// Returns a human-readable description of this memory.
    pub fn description(&self) -> String {
        let size = self.bytes.len();
        if size < 1024 {
            format!("{size}B DRAM")
        } else if size < 1024 * 1024 {
            format!("{}kB DRAM", size >> 10)
        } else {
            format!("{}MB DRAM", size >> 20)
        }
    }

    /// Returns the size of physical memory, in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the cache line granularity of this memory's bus.
    pub fn line_align(&self) -> Align {
        self.line
    }

    /// Returns the page frame granularity.
    pub fn page_align(&self) -> Align {
        self.page
    }

    /// Returns the number of page frames in this memory.
    pub fn frame_count(&self) -> u64 {
        self.bytes.len() as u64 >> self.page.log2()
    }

    /// Returns the number of 64-bit words in one page frame.
    pub fn page_word_count(&self) -> usize {
        self.page.size() as usize / 8
    }

    /// Returns the bytes covered by `span`.
    pub fn bytes(&self, span: Span) -> Result<&[u8]> {
        let range = span.within(self.bytes.len())?;
        Ok(&self.bytes[range])
    }

    /// Returns the bytes covered by `span`, for writing.
    pub fn bytes_mut(&mut self, span: Span) -> Result<&mut [u8]> {
        let range = span.within(self.bytes.len())?;
        Ok(&mut self.bytes[range])
    }

    /// Returns the span of the page frame with physical page number `ppn`.
    pub fn frame_span(&self, ppn: u64) -> Result<Span> {
        let page_size = self.page.size() as usize;
        if ppn >= self.frame_count() {
            return Err(MemError::OutOfRange {
                addr: ppn.saturating_mul(self.page.size()),
                len: page_size,
                capacity: self.bytes.len(),
            });
        }
        Ok(Span::new(ppn << self.page.log2(), page_size))
    }

    /// Returns the value of a single byte of memory.
    pub fn peek_byte(&self, paddr: u64) -> Result<u8> {
        Ok(self.bytes(Span::new(paddr, 1))?[0])
    }

    /// Reads a little-endian 64-bit word directly from memory, bypassing
    /// any cache.
    pub fn read_u64(&self, paddr: u64) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.bytes(Span::new(paddr, 8))?))
    }

    /// Writes a little-endian 64-bit word directly to memory, bypassing any
    /// cache.
    pub fn write_u64(&mut self, paddr: u64, value: u64) -> Result<()> {
        LittleEndian::write_u64(self.bytes_mut(Span::new(paddr, 8))?, value);
        Ok(())
    }

    /// Returns the line transfer counters accumulated so far.
    pub fn bus_stats(&self) -> BusStats {
        self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut BusStats {
        &mut self.stats
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::PhysMem;
    use crate::addr::Span;
    use crate::config::MemConfig;
    use crate::error::MemError;

    #[test]
    fn description() {
        let config = MemConfig {
            pm_size: 0x100,
            line_offset_bits: 4,
            page_offset_bits: 6,
            ..MemConfig::default()
        };
        assert_eq!(PhysMem::new(&config).unwrap().description(), "256B DRAM");
        let mem = PhysMem::new(&MemConfig::default()).unwrap();
        assert_eq!(mem.description(), "64kB DRAM");
        let config = MemConfig { pm_size: 0x200000, ..MemConfig::default() };
        assert_eq!(PhysMem::new(&config).unwrap().description(), "2MB DRAM");
    }

    #[test]
    fn starts_zeroed() {
        let mem = PhysMem::new(&MemConfig::default()).unwrap();
        assert_eq!(mem.size(), 0x10000);
        let bytes = mem.bytes(Span::new(0, 0x10000)).unwrap();
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn little_endian_words() {
        let mut mem = PhysMem::new(&MemConfig::default()).unwrap();
        mem.write_u64(0x100, 0x00007fd357a02ae0).unwrap();
        assert_eq!(
            mem.bytes(Span::new(0x100, 8)).unwrap(),
            &[0xe0, 0x2a, 0xa0, 0x57, 0xd3, 0x7f, 0x00, 0x00]
        );
        assert_eq!(mem.read_u64(0x100).unwrap(), 0x00007fd357a02ae0);
    }

    #[test]
    fn word_bounds() {
        let mut mem = PhysMem::new(&MemConfig::default()).unwrap();
        assert!(mem.read_u64(0x10000 - 8).is_ok());
        assert!(matches!(
            mem.read_u64(0x10000 - 4),
            Err(MemError::OutOfRange { addr: 0xfffc, len: 8, .. })
        ));
        assert!(mem.write_u64(u64::MAX - 3, 1).is_err());
        assert!(mem.peek_byte(0x10000).is_err());
    }

    #[test]
    fn frames() {
        let mem = PhysMem::new(&MemConfig::default()).unwrap();
        assert_eq!(mem.frame_count(), 16);
        assert_eq!(mem.page_word_count(), 512);
        assert_eq!(mem.frame_span(3).unwrap(), Span::new(0x3000, 0x1000));
        assert!(mem.frame_span(15).is_ok());
        assert!(matches!(
            mem.frame_span(16),
            Err(MemError::OutOfRange { addr: 0x10000, .. })
        ));
        assert!(mem.frame_span(u64::MAX).is_err());
    }
}

//===========================================================================//
