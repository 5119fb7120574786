//! depends-lib: Core types and logic for the dependency bootstrapper
//!
//! This crate provides the pieces used by the `depends` CLI:
//! - `Platform`: host OS and word size, used to pick URLs, paths and flags
//! - `Config` / `Layout`: the version set and every path derived from it
//! - `Step`: an idempotent unit of work gated by an install marker
//! - `Installer`: runs steps through an `Executor`, collecting an `InstallReport`

pub mod action;
pub mod config;
pub mod consts;
pub mod execute;
pub mod layout;
pub mod platform;
pub mod recipe;
pub mod util;
