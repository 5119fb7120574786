pub mod os;
pub mod word;

use std::fmt;

use os::Os;
use serde::Serialize;
use word::WordSize;

/// Platform identifier combining OS and word size (e.g., "linux-64bit")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
  pub os: Os,
  pub word_size: WordSize,
}

impl Platform {
  pub fn new(os: Os, word_size: WordSize) -> Self {
    Self { os, word_size }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or word size is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      word_size: WordSize::current()?,
    })
  }

  pub fn is_64bit(&self) -> bool {
    matches!(self.word_size, WordSize::Bits64)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.word_size)
  }
}
