use std::fmt;
use std::num::NonZero;

//===========================================================================//

/// Represents a power-of-two granularity of physical memory, such as the
/// size of a cache line or of a page frame.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Align(NonZero<u8>);

impl Align {
    /// Returns the alignment `1 << log2`, or `None` if that would not fit in
    /// a `u64`.
    pub const fn from_log2(log2: u32) -> Option<Align> {
        if log2 < u64::BITS {
            match NonZero::new(log2 as u8 + 1) {
                Some(inner) => Some(Align(inner)),
                None => None,
            }
        } else {
            None
        }
    }

    /// Returns the base-2 logarithm of the alignment.
    ///
    /// This is always exact, as `self` represents a power of two.
    pub fn log2(self) -> u32 {
        u32::from(self.0.get() - 1)
    }

    /// Returns the alignment as a number of bytes.
    pub fn size(self) -> u64 {
        1u64 << self.log2()
    }

    /// Returns a bit mask that can be used to match this alignment.
    ///
    /// That is, an address `addr` is aligned to `self` if and only if `addr &
    /// self.mask() == addr`.
    pub fn mask(self) -> u64 {
        !(self.size() - 1)
    }

    /// Returns the base address of the aligned unit containing `addr`.
    pub fn base_of(self, addr: u64) -> u64 {
        addr & self.mask()
    }

    /// Returns the offset of `addr` within its aligned unit.
    pub fn offset_of(self, addr: u64) -> u64 {
        addr & !self.mask()
    }

    /// Returns true if `addr` is aligned to `self`.
    pub fn is_aligned(self, addr: u64) -> bool {
        self.offset_of(addr) == 0
    }
}

impl fmt::Debug for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Align(1 << {:?})", self.log2())
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        fmt::Display::fmt(&self.size(), f)
    }
}

//===========================================================================//


//===========================================================================//
