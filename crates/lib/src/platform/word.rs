use std::fmt;

use serde::Serialize;

/// Pointer width of the host, which selects 32- or 64-bit toolkits and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WordSize {
  Bits32,
  Bits64,
}

impl WordSize {
  /// Detect the word size of the running binary
  pub fn current() -> Option<Self> {
    match usize::BITS {
      32 => Some(Self::Bits32),
      64 => Some(Self::Bits64),
      _ => None,
    }
  }

  pub fn bits(&self) -> u32 {
    match self {
      Self::Bits32 => 32,
      Self::Bits64 => 64,
    }
  }

  pub fn from_bits(bits: u32) -> Option<Self> {
    match bits {
      32 => Some(Self::Bits32),
      64 => Some(Self::Bits64),
      _ => None,
    }
  }
}

impl fmt::Display for WordSize {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}bit", self.bits())
  }
}
