use clap::{Parser, Subcommand};
use dram::addr::Align;
use dram::cache::DirectMappedCache;
use dram::config::{self, MemConfig};
use dram::mem::Dram;
use dram::swap::{SwapStore, codec};
use dram::trace::{AddressMode, read_trace, replay};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replays a load/store trace against simulated memory.
    Trace {
        /// The trace file to replay.
        trace: PathBuf,
        /// Route accesses through a direct-mapped cache with this many
        /// index bits.
        #[clap(long)]
        cache_index_bits: Option<u32>,
        /// Base-2 logarithm of the cache line size.
        #[clap(long, default_value_t = config::DEFAULT_LINE_OFFSET_BITS)]
        line_bits: u32,
        /// Size of physical memory, in bytes.
        #[clap(long, default_value_t = config::DEFAULT_PM_SIZE)]
        mem_size: usize,
        /// Fold trace addresses into physical memory instead of rejecting
        /// those outside of it.
        #[clap(long)]
        wrap: bool,
    },
    /// Prints the nonzero words of a swapped-out page.
    Page {
        /// The swap directory holding the page files.
        swap_dir: PathBuf,
        /// The disk address of the page.
        daddr: u64,
        /// Base-2 logarithm of the page size.
        #[clap(long, default_value_t = config::DEFAULT_PAGE_OFFSET_BITS)]
        page_bits: u32,
    },
}

//===========================================================================//

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Trace {
            trace,
            cache_index_bits,
            line_bits,
            mem_size,
            wrap,
        } => {
            let config = MemConfig {
                pm_size: mem_size,
                line_offset_bits: line_bits,
                route_through_cache: cache_index_bits.is_some(),
                ..MemConfig::default()
            };
            let mode =
                if wrap { AddressMode::Wrap } else { AddressMode::Exact };
            run_trace(&trace, &config, cache_index_bits, mode, &mut stdout)?;
        }
        Command::Page { swap_dir, daddr, page_bits } => {
            run_page(&swap_dir, daddr, page_bits, &mut stdout)?;
        }
    }
    Ok(())
}

fn run_trace<W: Write>(
    trace: &Path,
    config: &MemConfig,
    cache_index_bits: Option<u32>,
    mode: AddressMode,
    out: &mut W,
) -> io::Result<()> {
    let mut dram = match cache_index_bits {
        Some(index_bits) => {
            let cache =
                DirectMappedCache::new(index_bits, config.line_align()?)?;
            Dram::with_cache(config, Box::new(cache))?
        }
        None => Dram::new(config)?,
    };
    let accesses = {
        let file = File::open(trace)?;
        read_trace(io::BufReader::new(file))?
    };
    let stats = replay(&mut dram, &accesses, mode)?;
    writeln!(out, "{}", dram.description())?;
    stats.report(out)
}

fn run_page<W: Write>(
    swap_dir: &Path,
    daddr: u64,
    page_bits: u32,
    out: &mut W,
) -> io::Result<()> {
    let page = Align::from_log2(page_bits)
        .filter(|page| page.log2() >= 3 && page.log2() < 32)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported page size: 1 << {page_bits}"),
            )
        })?;
    let store = SwapStore::open(swap_dir)?;
    let words = {
        let file = File::open(store.page_path(daddr))?;
        let mut reader = io::BufReader::new(file);
        codec::read_page(&mut reader, (page.size() / 8) as usize)?
    };
    codec::write_listing(out, &words)
}

//===========================================================================//


//===========================================================================//
