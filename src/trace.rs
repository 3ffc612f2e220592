//! Facilities for replaying memory access traces against a simulated
//! memory system.
//!
//! A trace is a text file with one access per line, in the form
//! `L 7ff000384,4` (load) or `S 7ff000388,4` (store), where the address is
//! in hex and the size is 1, 2, 4, or 8 bytes.
//!
//! Traces recorded from real programs use full 64-bit virtual addresses;
//! replay them with [`AddressMode::Wrap`] to fold every address into the
//! simulated physical memory.

use crate::bus::BusStats;
use crate::cache::CacheStats;
use crate::error::Result;
use crate::mem::Dram;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

//===========================================================================//

/// Whether a traced access reads or writes memory.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AccessKind {
    /// A read from memory.
    Load,
    /// A write to memory.
    Store,
}

/// A single traced memory access.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Access {
    /// Whether the access reads or writes.
    pub kind: AccessKind,
    /// The first physical address accessed.
    pub paddr: u64,
    /// The number of bytes accessed.
    pub size: usize,
}

impl FromStr for Access {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Access, String> {
        let (op, rest) = line
            .trim()
            .split_once(' ')
            .ok_or_else(|| format!("missing operand in {line:?}"))?;
        let kind = match op {
            "L" => AccessKind::Load,
            "S" => AccessKind::Store,
            _ => return Err(format!("unknown access kind {op:?}")),
        };
        let (addr, size) = rest
            .trim()
            .split_once(',')
            .ok_or_else(|| format!("missing access size in {line:?}"))?;
        let paddr = u64::from_str_radix(addr, 16)
            .map_err(|_| format!("invalid address {addr:?}"))?;
        let size = match size.parse::<usize>() {
            Ok(size @ (1 | 2 | 4 | 8)) => size,
            _ => return Err(format!("invalid access size {size:?}")),
        };
        Ok(Access { kind, paddr, size })
    }
}

/// Reads a whole trace.  Blank lines are skipped.
pub fn read_trace<R: BufRead>(reader: R) -> io::Result<Vec<Access>> {
    let mut accesses = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let access = line.parse::<Access>().map_err(|message| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("trace line {}: {}", index + 1, message),
            )
        })?;
        accesses.push(access);
    }
    Ok(accesses)
}

//===========================================================================//

/// How trace addresses are mapped onto physical memory.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AddressMode {
    /// Addresses are physical addresses; an access outside of physical
    /// memory is an error.
    #[default]
    Exact,
    /// Each byte address is reduced modulo the size of physical memory.
    Wrap,
}

/// Totals gathered while replaying a trace.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplayStats {
    /// Number of loads performed.
    pub loads: u64,
    /// Number of stores performed.
    pub stores: u64,
    /// Line transfers between the cache and memory during the replay.
    pub bus: BusStats,
    /// Cache counters accumulated during the replay, if accesses were
    /// routed through a cache.
    pub cache: Option<CacheStats>,
}

impl ReplayStats {
    /// Writes the totals as `name: value` lines.
    pub fn report<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "loads: {}", self.loads)?;
        writeln!(writer, "stores: {}", self.stores)?;
        if let Some(cache) = self.cache {
            writeln!(writer, "hits: {}", cache.hits)?;
            writeln!(writer, "misses: {}", cache.misses)?;
            writeln!(writer, "evictions: {}", cache.evictions)?;
            writeln!(writer, "dirty evictions: {}", cache.dirty_evictions)?;
        }
        writeln!(writer, "lines read: {}", self.bus.lines_read)?;
        writeln!(writer, "lines written: {}", self.bus.lines_written)?;
        Ok(())
    }
}

/// Performs each access in order.  Loads read the accessed bytes; stores
/// set each accessed byte to `0x01`.
pub fn replay(
    dram: &mut Dram,
    accesses: &[Access],
    mode: AddressMode,
) -> Result<ReplayStats> {
    let start_bus = dram.mem().bus_stats();
    let start_cache = dram.cache_stats();
    let capacity = dram.mem().size() as u64;
    let mut stats = ReplayStats::default();
    let mut buf = [0u8; 8];
    for access in accesses {
        let bytes = &mut buf[..access.size];
        let paddr = match mode {
            AddressMode::Exact => access.paddr,
            AddressMode::Wrap => access.paddr % capacity,
        };
        // A wrapped access may run off the end of memory and continue at
        // address zero.
        let head = match mode {
            AddressMode::Exact => bytes.len(),
            AddressMode::Wrap => bytes.len().min((capacity - paddr) as usize),
        };
        let (first, rest) = bytes.split_at_mut(head);
        match access.kind {
            AccessKind::Load => {
                dram.read_bytes(paddr, first)?;
                dram.read_bytes(0, rest)?;
                stats.loads += 1;
            }
            AccessKind::Store => {
                first.fill(0x01);
                rest.fill(0x01);
                dram.write_bytes(paddr, first)?;
                dram.write_bytes(0, rest)?;
                stats.stores += 1;
            }
        }
    }
    let end_bus = dram.mem().bus_stats();
    stats.bus = BusStats {
        lines_read: end_bus.lines_read - start_bus.lines_read,
        lines_written: end_bus.lines_written - start_bus.lines_written,
    };
    if dram.is_cache_routed()
        && let (Some(end), Some(start)) = (dram.cache_stats(), start_cache)
    {
        stats.cache = Some(end.since(start));
    }
    Ok(stats)
}

//===========================================================================//


//===========================================================================//
