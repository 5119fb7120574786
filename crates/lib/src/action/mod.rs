//! Actions performed while installing dependencies.
//!
//! Recipes describe their work as a list of [`Action`]s. Running them is the
//! job of an [`Executor`](crate::execute::Executor); this module only holds
//! the data types and their human-readable rendering.
//!
//! # Action Types
//!
//! - [`Action::Fetch`] - Download a file, optionally verifying its SHA-256
//! - [`Action::Extract`] - Unpack a tar.gz, tar.bz2, tar or zip archive
//! - [`Action::Run`] - Run a native build tool described by a [`CommandSpec`]
//! - Filesystem helpers: create, rename, remove, chmod, patch

mod command;
mod types;

pub use command::*;
pub use types::*;

use std::borrow::Cow;

/// Shell-quote a word for display, leaving plain words untouched.
pub(crate) fn quote(word: &str) -> Cow<'_, str> {
  shlex::try_quote(word).unwrap_or(Cow::Borrowed(word))
}
