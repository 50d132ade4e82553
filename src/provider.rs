//! The remote directory provider contract.
//!
//! Any concrete share client that can enumerate a directory, stat an entry
//! and open byte streams is substitutable here; [`crate::memory`] carries
//! an in-memory implementation for tests. All paths handed to a provider
//! are fully qualified UNC addresses (see [`crate::ShareLocation`]).

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// Flags for opening a remote file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFlags(u32);

bitflags! {
    impl OpenFlags: u32 {
        const READ = 0x00000001;
        const WRITE = 0x00000002;
        const APPEND = 0x00000004;
        const CREATE = 0x00000008;
        const TRUNCATE = 0x00000010;
        const EXCLUDE = 0x00000020;
    }
}

/// Kind of an enumerated entry. Anything that is neither a plain file nor
/// a directory (device nodes, pipes) is reported as `Other` and skipped by
/// the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// A single entry of a remote directory stream, in provider enumeration
/// order. Providers may include the `.` and `..` pseudo-entries; the
/// walker drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Raw stat result. Timestamps are epoch seconds as reported by the
/// server; `0` means the value was never set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStat {
    pub size: u64,
    pub created: u64,
    pub modified: u64,
}

pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Operations a remote share backend must support.
///
/// Every method may fail with [`NotFound`](crate::Error::NotFound),
/// [`AccessDenied`](crate::Error::AccessDenied) or
/// [`Transport`](crate::Error::Transport). Streams returned by `open_read`
/// and `open_write` own their handle and must release it when dropped;
/// writers additionally commit on `shutdown`.
#[async_trait]
pub trait ShareProvider: Send + Sync {
    /// Enumerates the direct entries of a directory.
    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Stats a single entry.
    async fn stat(&self, path: &str) -> Result<RawStat>;

    /// Opens a file for reading.
    async fn open_read(&self, path: &str) -> Result<ByteReader>;

    /// Opens a file for writing according to `flags`.
    async fn open_write(&self, path: &str, flags: OpenFlags) -> Result<ByteWriter>;

    /// Renames an entry, moving it between directories if needed.
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Creates a new empty directory.
    async fn create_dir(&self, path: &str) -> Result<()>;

    /// Removes a file or an empty directory.
    async fn remove(&self, path: &str) -> Result<()>;
}
