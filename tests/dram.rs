use dram::MemError;
use dram::addr::{Align, Span};
use dram::bus::LineBus;
use dram::cache::{DirectMappedCache, SimCache};
use dram::config::MemConfig;
use dram::mem::{Dram, PhysMem, SLOT_WIDTH, decode_slot};
use quickcheck::quickcheck;

//===========================================================================//

const PM_SIZE: u64 = 0x10000;

fn make_direct_dram() -> Dram {
    Dram::new(&MemConfig::default()).unwrap()
}

fn make_cached_dram(index_bits: u32) -> Dram {
    let config =
        MemConfig { route_through_cache: true, ..MemConfig::default() };
    let line = config.line_align().unwrap();
    let cache = DirectMappedCache::new(index_bits, line).unwrap();
    Dram::with_cache(&config, Box::new(cache)).unwrap()
}

//===========================================================================//

quickcheck! {
    fn word_round_trip_direct(addr: u16, value: u64) -> bool {
        let paddr = u64::from(addr) % (PM_SIZE - 7);
        let mut dram = make_direct_dram();
        dram.write_u64(paddr, value).unwrap();
        dram.read_u64(paddr).unwrap() == value
    }

    fn word_round_trip_cached(addr: u16, value: u64) -> bool {
        let paddr = u64::from(addr) % (PM_SIZE - 7);
        let mut dram = make_cached_dram(2);
        dram.write_u64(paddr, value).unwrap();
        if dram.read_u64(paddr).unwrap() != value {
            return false;
        }
        dram.flush_cache().unwrap();
        dram.mem().read_u64(paddr).unwrap() == value
    }

    fn cached_and_direct_agree(writes: Vec<(u16, u64)>) -> bool {
        let mut direct = make_direct_dram();
        let mut cached = make_cached_dram(1);
        for &(addr, value) in &writes {
            let paddr = u64::from(addr) % (PM_SIZE - 7);
            direct.write_u64(paddr, value).unwrap();
            cached.write_u64(paddr, value).unwrap();
        }
        writes.iter().all(|&(addr, _)| {
            let paddr = u64::from(addr) % (PM_SIZE - 7);
            direct.read_u64(paddr).unwrap() == cached.read_u64(paddr).unwrap()
        })
    }
}

#[test]
fn little_endian_byte_layout() {
    for mut dram in [make_direct_dram(), make_cached_dram(4)] {
        dram.write_u64(0x3008, 0x00007fd357a02ae0).unwrap();
        dram.flush_cache().unwrap();
        assert_eq!(
            dram.mem().bytes(Span::new(0x3008, 8)).unwrap(),
            &[0xe0, 0x2a, 0xa0, 0x57, 0xd3, 0x7f, 0x00, 0x00]
        );
        let mut bytes = [0u8; 2];
        dram.read_bytes(0x3008, &mut bytes).unwrap();
        assert_eq!(bytes, [0xe0, 0x2a]);
    }
}

#[test]
fn word_bounds() {
    for mut dram in [make_direct_dram(), make_cached_dram(4)] {
        assert!(dram.read_u64(PM_SIZE - 8).is_ok());
        assert!(matches!(
            dram.read_u64(PM_SIZE - 4),
            Err(MemError::OutOfRange { .. })
        ));
        assert!(dram.write_u64(PM_SIZE, 0).is_err());
        assert!(dram.write_u64(u64::MAX, 0).is_err());
    }
}

#[test]
fn every_offset_touches_the_same_line() {
    let mut mem = PhysMem::new(&MemConfig::default()).unwrap();
    let line = mem.line_align();
    for paddr in 0x4c0..0x500 {
        let block: Vec<u8> = (0..64).map(|i| (paddr as u8) ^ i).collect();
        mem.bus_write_line(paddr, &block).unwrap();
        let mut readback = vec![0u8; 64];
        mem.bus_read_line(0x4c0 + (paddr * 7) % 64, &mut readback).unwrap();
        assert_eq!(readback, block);
        assert_eq!(mem.peek_byte(line.base_of(paddr)).unwrap(), block[0]);
        assert_eq!(mem.peek_byte(0x4bf).unwrap(), 0);
        assert_eq!(mem.peek_byte(0x500).unwrap(), 0);
    }
}

#[test]
fn small_lines() {
    let config = MemConfig {
        line_offset_bits: 3,
        route_through_cache: true,
        ..MemConfig::default()
    };
    let line = Align::from_log2(3).unwrap();
    let cache = DirectMappedCache::new(0, line).unwrap();
    assert_eq!(cache.description(), "direct-mapped cache, 1 x 8B lines");
    let mut dram = Dram::with_cache(&config, Box::new(cache)).unwrap();
    dram.write_u64(0x14, 0x0102030405060708).unwrap();
    assert_eq!(dram.read_u64(0x14).unwrap(), 0x0102030405060708);
    dram.flush_cache().unwrap();
    assert_eq!(dram.mem().read_u64(0x14).unwrap(), 0x0102030405060708);
}

#[test]
fn instruction_slots() {
    let mut dram = make_cached_dram(4);
    dram.write_instruction_slot(0x800, "mov %rax, %rbx").unwrap();
    let slot = dram.read_instruction_slot(0x800).unwrap();
    assert_eq!(decode_slot(&slot), Some("mov %rax, %rbx"));
    assert!(slot[14..].iter().all(|&b| b == 0));
    let too_long = "a".repeat(SLOT_WIDTH);
    assert!(matches!(
        dram.write_instruction_slot(0x800, &too_long),
        Err(MemError::SlotOverflow { .. })
    ));
    assert_eq!(
        decode_slot(&dram.read_instruction_slot(0x800).unwrap()),
        Some("mov %rax, %rbx")
    );
}

//===========================================================================//
