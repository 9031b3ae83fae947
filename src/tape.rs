//! Sparse, unbounded tape of wrapping cells.

use std::collections::HashMap;
use std::fmt;

/// Cell width. Values live in `[0, 2^bits)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellWidth {
    #[default]
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl CellWidth {
    /// Pick a width from a requested bit count. Anything unsupported falls back to 8.
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            16 => CellWidth::Bits16,
            32 => CellWidth::Bits32,
            64 => CellWidth::Bits64,
            _ => CellWidth::Bits8,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            CellWidth::Bits8 => 8,
            CellWidth::Bits16 => 16,
            CellWidth::Bits32 => 32,
            CellWidth::Bits64 => 64,
        }
    }

    /// Largest representable value, `2^bits - 1`.
    pub fn max_value(self) -> u64 {
        u64::MAX >> (64 - self.bits())
    }

    /// `(value + 1) mod 2^bits`
    pub fn increment(self, value: u64) -> u64 {
        value.wrapping_add(1) & self.max_value()
    }

    /// `(value - 1) mod 2^bits`
    pub fn decrement(self, value: u64) -> u64 {
        value.wrapping_sub(1) & self.max_value()
    }
}

impl fmt::Display for CellWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Cells keyed by signed address, created as 0 on first touch and never removed.
#[derive(Debug, Default)]
pub struct Tape {
    cells: HashMap<i64, u64>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at `addr`, materializing it with 0 if it has never been touched.
    pub fn cell(&mut self, addr: i64) -> &mut u64 {
        self.cells.entry(addr).or_insert(0)
    }

    /// Read without materializing.
    pub fn peek(&self, addr: i64) -> u64 {
        self.cells.get(&addr).copied().unwrap_or(0)
    }

    /// Number of addresses touched so far.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
