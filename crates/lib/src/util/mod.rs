//! Shared utilities.
//!
//! Hashing for download verification and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
