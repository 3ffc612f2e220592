use super::PhysMem;
use crate::addr::Span;
use crate::error::{MemError, Result};

//===========================================================================//

/// The width of an instruction slot in physical memory, in bytes.
///
/// Instruction text stored in a slot must be strictly shorter than this, so
/// that at least one NUL byte always terminates it.
pub const SLOT_WIDTH: usize = 64;

/// Encodes instruction text into a NUL-padded slot image.
///
/// Fails (rather than truncating) if the text is `SLOT_WIDTH` bytes or
/// longer.
pub fn encode_slot(text: &str) -> Result<[u8; SLOT_WIDTH]> {
    let bytes = text.as_bytes();
    if bytes.len() >= SLOT_WIDTH {
        return Err(MemError::SlotOverflow { len: bytes.len() });
    }
    let mut slot = [0u8; SLOT_WIDTH];
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(slot)
}

/// Returns the instruction text held in a slot image: everything before the
/// first NUL byte.  Returns `None` if that text is not valid UTF-8.
pub fn decode_slot(slot: &[u8; SLOT_WIDTH]) -> Option<&str> {
    let len = slot.iter().position(|&b| b == 0).unwrap_or(SLOT_WIDTH);
    std::str::from_utf8(&slot[..len]).ok()
}

//===========================================================================//

impl PhysMem {
    /// Copies the raw instruction slot starting at `paddr` out of memory.
    pub fn read_instruction_slot(
        &self,
        paddr: u64,
    ) -> Result<[u8; SLOT_WIDTH]> {
        let mut slot = [0u8; SLOT_WIDTH];
        slot.copy_from_slice(self.bytes(Span::new(paddr, SLOT_WIDTH))?);
        Ok(slot)
    }

    /// Stores instruction text into the slot starting at `paddr`, padding
    /// the rest of the slot with zeros.
    pub fn write_instruction_slot(
        &mut self,
        paddr: u64,
        text: &str,
    ) -> Result<()> {
        let slot = encode_slot(text)?;
        self.bytes_mut(Span::new(paddr, SLOT_WIDTH))?.copy_from_slice(&slot);
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
