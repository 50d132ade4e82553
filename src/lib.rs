//! Enumeration and transfer helper for remote file shares.
//!
//! The crate is built around two pieces: a [`ShareProvider`] that abstracts
//! the underlying share client (enumerate, stat, open, rename, mkdir,
//! remove), and a [`ShareClient`] that composes UNC paths for one
//! [`ShareLocation`] and drives the depth-bounded recursive walker on top
//! of the provider. An in-memory provider lives in [`memory`] for tests.

#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate async_trait;

mod client;
mod error;
mod info;
mod list;
pub mod memory;
pub mod path;
mod provider;

pub use client::ShareClient;
pub use error::{Error, Result};
pub use info::FileInfo;
pub use list::{ListOptions, Listing};
pub use path::{Credentials, ShareLocation};
pub use provider::{ByteReader, ByteWriter, DirEntry, EntryKind, OpenFlags, RawStat, ShareProvider};
