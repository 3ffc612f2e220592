use super::{PhysMem, SLOT_WIDTH};
use crate::addr::Span;
use crate::cache::{CacheStats, SimCache};
use crate::config::MemConfig;
use crate::error::{MemError, Result};
use crate::swap::SwapStore;
use byteorder::{ByteOrder, LittleEndian};

//===========================================================================//

/// The processor's view of main memory: physical memory plus an optional
/// cache that word accesses may be routed through.
///
/// Whether word accesses use the cache is decided once, by
/// [`MemConfig::route_through_cache`], when the `Dram` is built.
/// Instruction slots are always read and written directly, since
/// instruction fetch uses the authoritative memory image.
pub struct Dram {
    mem: PhysMem,
    cache: Option<Box<dyn SimCache>>,
    route_through_cache: bool,
}

impl Dram {
    /// Returns a new zero-filled memory with no cache attached.  Fails if
    /// the configuration asks for cache routing.
    pub fn new(config: &MemConfig) -> Result<Dram> {
        if config.route_through_cache {
            return Err(MemError::Config(
                "cache routing is enabled but no cache is attached"
                    .to_string(),
            ));
        }
        Ok(Dram {
            mem: PhysMem::new(config)?,
            cache: None,
            route_through_cache: false,
        })
    }

    /// Returns a new zero-filled memory with the given cache attached in
    /// front of it.  Fails if the cache's line size differs from the
    /// configured line size.
    pub fn with_cache(
        config: &MemConfig,
        cache: Box<dyn SimCache>,
    ) -> Result<Dram> {
        let mem = PhysMem::new(config)?;
        if cache.line_align() != mem.line_align() {
            return Err(MemError::Config(format!(
                "{}-byte cache lines do not match {}-byte memory lines",
                cache.line_align(),
                mem.line_align()
            )));
        }
        Ok(Dram {
            mem,
            cache: Some(cache),
            route_through_cache: config.route_through_cache,
        })
    }

    /// Returns a human-readable description of this memory system.
    pub fn description(&self) -> String {
        match (&self.cache, self.route_through_cache) {
            (Some(cache), true) => format!(
                "{} behind {}",
                self.mem.description(),
                cache.description()
            ),
            _ => self.mem.description(),
        }
    }

    /// Returns true if word accesses are routed through the cache.
    pub fn is_cache_routed(&self) -> bool {
        self.route_through_cache
    }

    /// Returns the attached cache's counters, if there is a cache.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// Returns the underlying physical memory.
    pub fn mem(&self) -> &PhysMem {
        &self.mem
    }

    /// Returns the underlying physical memory, for writing.
    ///
    /// Writes made this way bypass the cache; call
    /// [`flush_cache`](Dram::flush_cache) first if the cache may hold lines
    /// being overwritten.
    pub fn mem_mut(&mut self) -> &mut PhysMem {
        &mut self.mem
    }

    /// Reads `buf.len()` consecutive bytes starting at `paddr`, through the
    /// cache if routing is enabled.
    pub fn read_bytes(&mut self, paddr: u64, buf: &mut [u8]) -> Result<()> {
        let span = Span::new(paddr, buf.len());
        span.within(self.mem.size())?;
        if span.is_empty() {
            return Ok(());
        }
        let cache =
            if self.route_through_cache { self.cache.as_mut() } else { None };
        match cache {
            Some(cache) => {
                for (addr, byte) in (paddr..).zip(buf.iter_mut()) {
                    *byte = cache.read_byte(&mut self.mem, addr)?;
                }
            }
            None => buf.copy_from_slice(self.mem.bytes(span)?),
        }
        Ok(())
    }

    /// Writes `data` to consecutive bytes starting at `paddr`, through the
    /// cache if routing is enabled.
    pub fn write_bytes(&mut self, paddr: u64, data: &[u8]) -> Result<()> {
        let span = Span::new(paddr, data.len());
        span.within(self.mem.size())?;
        if span.is_empty() {
            return Ok(());
        }
        let cache =
            if self.route_through_cache { self.cache.as_mut() } else { None };
        match cache {
            Some(cache) => {
                for (addr, &byte) in (paddr..).zip(data.iter()) {
                    cache.write_byte(&mut self.mem, addr, byte)?;
                }
            }
            None => self.mem.bytes_mut(span)?.copy_from_slice(data),
        }
        Ok(())
    }

    /// Reads the 64-bit word at `paddr`.  Byte `i` of memory supplies bits
    /// `8i..8i+8` of the result.
    pub fn read_u64(&mut self, paddr: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_bytes(paddr, &mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }

    /// Writes the 64-bit word `value` at `paddr`, least significant byte
    /// first.
    pub fn write_u64(&mut self, paddr: u64, value: u64) -> Result<()> {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, value);
        self.write_bytes(paddr, &buf)
    }

    /// Copies the raw instruction slot at `paddr` out of physical memory.
    pub fn read_instruction_slot(
        &self,
        paddr: u64,
    ) -> Result<[u8; SLOT_WIDTH]> {
        self.mem.read_instruction_slot(paddr)
    }

    /// Stores instruction text into the slot at `paddr` in physical memory.
    pub fn write_instruction_slot(
        &mut self,
        paddr: u64,
        text: &str,
    ) -> Result<()> {
        self.mem.write_instruction_slot(paddr, text)
    }

    /// Writes back and invalidates every cached line, if there is a cache.
    pub fn flush_cache(&mut self) -> Result<()> {
        match self.cache.as_mut() {
            Some(cache) => cache.flush(&mut self.mem),
            None => Ok(()),
        }
    }

    /// Flushes the cache, then loads page `daddr` from the swap store into
    /// frame `ppn`.
    pub fn swap_in(
        &mut self,
        store: &SwapStore,
        daddr: u64,
        ppn: u64,
    ) -> Result<()> {
        self.flush_cache()?;
        store.swap_in(&mut self.mem, daddr, ppn)
    }

    /// Flushes the cache, then saves frame `ppn` to the swap store as page
    /// `daddr`.
    pub fn swap_out(
        &mut self,
        store: &SwapStore,
        daddr: u64,
        ppn: u64,
    ) -> Result<()> {
        self.flush_cache()?;
        store.swap_out(&self.mem, daddr, ppn)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Dram;
    use crate::addr::{Align, Span};
    use crate::cache::DirectMappedCache;
    use crate::config::MemConfig;
    use crate::error::MemError;

    fn make_cached_dram() -> Dram {
        let config =
            MemConfig { route_through_cache: true, ..MemConfig::default() };
        let line = Align::from_log2(6).unwrap();
        let cache = DirectMappedCache::new(4, line).unwrap();
        Dram::with_cache(&config, Box::new(cache)).unwrap()
    }

    #[test]
    fn routing_requires_cache() {
        let config =
            MemConfig { route_through_cache: true, ..MemConfig::default() };
        assert!(matches!(Dram::new(&config), Err(MemError::Config(_))));
    }

    #[test]
    fn cache_line_size_must_match() {
        let config =
            MemConfig { route_through_cache: true, ..MemConfig::default() };
        let line = Align::from_log2(5).unwrap();
        let cache = DirectMappedCache::new(4, line).unwrap();
        assert!(matches!(
            Dram::with_cache(&config, Box::new(cache)),
            Err(MemError::Config(_))
        ));
        let config = MemConfig { line_offset_bits: 5, ..config };
        let cache = DirectMappedCache::new(4, line).unwrap();
        assert!(Dram::with_cache(&config, Box::new(cache)).is_ok());
    }

    #[test]
    fn cache_stats() {
        let dram = Dram::new(&MemConfig::default()).unwrap();
        assert_eq!(dram.cache_stats(), None);
        let mut dram = make_cached_dram();
        dram.read_u64(0x100).unwrap();
        dram.read_u64(0x108).unwrap();
        let stats = dram.cache_stats().unwrap();
        assert_eq!((stats.hits, stats.misses), (15, 1));
    }

    #[test]
    fn empty_access() {
        let mut dram = make_cached_dram();
        dram.read_bytes(0x10000, &mut []).unwrap();
        dram.write_bytes(0x100, &[]).unwrap();
        assert!(dram.read_bytes(0x10001, &mut []).is_err());
        assert_eq!(dram.cache_stats().unwrap().misses, 0);
    }

    #[test]
    fn description() {
        let dram = Dram::new(&MemConfig::default()).unwrap();
        assert_eq!(dram.description(), "64kB DRAM");
        assert!(!dram.is_cache_routed());
        let dram = make_cached_dram();
        assert_eq!(
            dram.description(),
            "64kB DRAM behind direct-mapped cache, 16 x 64B lines"
        );
        assert!(dram.is_cache_routed());
    }

    #[test]
    fn direct_word_layout() {
        let mut dram = Dram::new(&MemConfig::default()).unwrap();
        dram.write_u64(0x1000, 0x00007fd357a02ae0).unwrap();
        assert_eq!(
            dram.mem().bytes(Span::new(0x1000, 8)).unwrap(),
            &[0xe0, 0x2a, 0xa0, 0x57, 0xd3, 0x7f, 0x00, 0x00]
        );
        assert_eq!(dram.read_u64(0x1000).unwrap(), 0x00007fd357a02ae0);
    }

    #[test]
    fn cached_word_layout() {
        let mut dram = make_cached_dram();
        dram.write_u64(0x1000, 0x00007fd357a02ae0).unwrap();
        assert_eq!(dram.read_u64(0x1000).unwrap(), 0x00007fd357a02ae0);
        // The write is still sitting in a dirty cache line.
        assert_eq!(dram.mem().read_u64(0x1000).unwrap(), 0);
        dram.flush_cache().unwrap();
        assert_eq!(
            dram.mem().bytes(Span::new(0x1000, 8)).unwrap(),
            &[0xe0, 0x2a, 0xa0, 0x57, 0xd3, 0x7f, 0x00, 0x00]
        );
    }

    #[test]
    fn unaligned_word_across_lines() {
        let mut dram = make_cached_dram();
        dram.write_u64(0x103c, 0x1122334455667788).unwrap();
        assert_eq!(dram.read_u64(0x103c).unwrap(), 0x1122334455667788);
        dram.flush_cache().unwrap();
        assert_eq!(dram.mem().read_u64(0x103c).unwrap(), 0x1122334455667788);
        assert_eq!(dram.mem().bus_stats().lines_written, 2);
    }

    #[test]
    fn word_bounds_checked_before_cache() {
        let mut dram = make_cached_dram();
        assert!(matches!(
            dram.read_u64(0x10000 - 4),
            Err(MemError::OutOfRange { addr: 0xfffc, len: 8, .. })
        ));
        assert!(dram.write_u64(0x10000 - 7, 1).is_err());
        assert_eq!(dram.mem().bus_stats().lines_read, 0);
        assert!(dram.read_u64(0x10000 - 8).is_ok());
    }

    #[test]
    fn slots_bypass_cache() {
        let mut dram = make_cached_dram();
        dram.write_instruction_slot(0x2000, "mov %rax, %rbx").unwrap();
        let slot = dram.read_instruction_slot(0x2000).unwrap();
        assert_eq!(&slot[..14], b"mov %rax, %rbx");
        assert_eq!(dram.mem().bus_stats().lines_read, 0);
    }

    #[test]
    fn unrouted_cache_is_ignored() {
        let config = MemConfig::default();
        let line = Align::from_log2(6).unwrap();
        let cache = DirectMappedCache::new(4, line).unwrap();
        let mut dram = Dram::with_cache(&config, Box::new(cache)).unwrap();
        dram.write_u64(0x40, 42).unwrap();
        assert_eq!(dram.mem().read_u64(0x40).unwrap(), 42);
        assert_eq!(dram.mem().bus_stats().lines_read, 0);
    }
}

//===========================================================================//
