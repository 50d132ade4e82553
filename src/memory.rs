//! In-memory share backend.
//!
//! [`MemoryShare`] implements the full [`ShareProvider`] contract against a
//! mutex-guarded node tree, so consumers can test listing and transfer
//! logic without a real network share. It addresses exactly one
//! `\\server\share`; any UNC path outside that prefix resolves to
//! `NotFound`. Like a real server, `read_dir` reports the `.` and `..`
//! pseudo-entries.

use std::{
    collections::BTreeMap,
    io, mem,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use bytes::Bytes;
use chrono::Utc;
use tokio::io::AsyncWrite;

use crate::{
    error::{Error, Result},
    path::{Credentials, ShareLocation, SEPARATOR},
    provider::{ByteReader, ByteWriter, DirEntry, EntryKind, OpenFlags, RawStat, ShareProvider},
};

#[derive(Debug, Clone)]
enum Node {
    File {
        data: Bytes,
        created: u64,
        modified: u64,
    },
    Dir(BTreeMap<String, Node>),
}

fn find<'a>(mut node: &'a Node, segments: &[String]) -> Option<&'a Node> {
    for segment in segments {
        match node {
            Node::Dir(children) => node = children.get(segment)?,
            Node::File { .. } => return None,
        }
    }

    Some(node)
}

fn find_dir_mut<'a>(
    mut node: &'a mut Node,
    segments: &[String],
) -> Option<&'a mut BTreeMap<String, Node>> {
    for segment in segments {
        match node {
            Node::Dir(children) => node = children.get_mut(segment)?,
            Node::File { .. } => return None,
        }
    }

    match node {
        Node::Dir(children) => Some(children),
        Node::File { .. } => None,
    }
}

fn now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// In-memory share for tests. Cloning shares the underlying tree, so a
/// clone can be handed to a [`ShareClient`](crate::ShareClient) while the
/// original keeps seeding fixtures.
#[derive(Clone)]
pub struct MemoryShare {
    location: ShareLocation,
    root: Arc<Mutex<Node>>,
}

impl MemoryShare {
    pub fn new(server: &str, share: &str) -> Self {
        Self {
            location: ShareLocation::new(server, share, Credentials::guest()),
            root: Arc::new(Mutex::new(Node::Dir(BTreeMap::new()))),
        }
    }

    /// Location addressing this share, for building a client on top.
    pub fn location(&self) -> ShareLocation {
        self.location.clone()
    }

    /// Stores a file, creating intermediate directories and replacing
    /// whatever is in the way. Timestamps are left unset.
    pub fn put_file(&self, path_in_share: &str, contents: impl Into<Bytes>) -> &Self {
        self.put(
            path_in_share,
            Node::File {
                data: contents.into(),
                created: 0,
                modified: 0,
            },
        )
    }

    /// Same as [`put_file`](Self::put_file) with explicit raw timestamps
    /// (epoch seconds, `0` meaning unset).
    pub fn put_file_with_times(
        &self,
        path_in_share: &str,
        contents: impl Into<Bytes>,
        created: u64,
        modified: u64,
    ) -> &Self {
        self.put(
            path_in_share,
            Node::File {
                data: contents.into(),
                created,
                modified,
            },
        )
    }

    /// Creates a directory chain, keeping the contents of directories that
    /// already exist.
    pub fn put_dir(&self, path_in_share: &str) -> &Self {
        self.put(path_in_share, Node::Dir(BTreeMap::new()))
    }

    fn put(&self, path_in_share: &str, node: Node) -> &Self {
        let segments: Vec<&str> = path_in_share
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();
        let Some((last, parents)) = segments.split_last() else {
            return self;
        };

        let mut guard = self.tree();
        let mut current = match &mut *guard {
            Node::Dir(children) => children,
            Node::File { .. } => return self,
        };
        for segment in parents {
            let child = current
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            if let Node::File { .. } = child {
                *child = Node::Dir(BTreeMap::new());
            }
            match child {
                Node::Dir(children) => current = children,
                Node::File { .. } => return self,
            }
        }

        if let (Node::Dir(_), Some(Node::Dir(_))) = (&node, current.get(*last)) {
            return self;
        }
        let _ = current.insert((*last).to_string(), node);

        self
    }

    fn tree(&self) -> MutexGuard<'_, Node> {
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, unc: &str) -> Result<Vec<String>> {
        let prefix = self.location.unc_path("");
        let Some(rel) = unc.strip_prefix(&prefix) else {
            return Err(Error::NotFound(unc.to_string()));
        };

        Ok(rel
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl ShareProvider for MemoryShare {
    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let segments = self.resolve(path)?;
        let guard = self.tree();
        let node = find(&guard, &segments).ok_or_else(|| Error::NotFound(path.to_string()))?;
        let Node::Dir(children) = node else {
            return Err(Error::InvalidArgument(format!("{path} is not a directory")));
        };

        let mut entries = vec![
            DirEntry {
                name: ".".to_string(),
                kind: EntryKind::Directory,
            },
            DirEntry {
                name: "..".to_string(),
                kind: EntryKind::Directory,
            },
        ];
        entries.extend(children.iter().map(|(name, child)| DirEntry {
            name: name.clone(),
            kind: match child {
                Node::File { .. } => EntryKind::File,
                Node::Dir(_) => EntryKind::Directory,
            },
        }));

        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<RawStat> {
        let segments = self.resolve(path)?;
        let guard = self.tree();
        match find(&guard, &segments).ok_or_else(|| Error::NotFound(path.to_string()))? {
            Node::File {
                data,
                created,
                modified,
            } => Ok(RawStat {
                size: data.len() as u64,
                created: *created,
                modified: *modified,
            }),
            Node::Dir(_) => Ok(RawStat::default()),
        }
    }

    async fn open_read(&self, path: &str) -> Result<ByteReader> {
        let segments = self.resolve(path)?;
        let guard = self.tree();
        match find(&guard, &segments).ok_or_else(|| Error::NotFound(path.to_string()))? {
            Node::File { data, .. } => Ok(Box::new(io::Cursor::new(data.clone()))),
            Node::Dir(_) => Err(Error::AccessDenied(format!("{path} is a directory"))),
        }
    }

    async fn open_write(&self, path: &str, flags: OpenFlags) -> Result<ByteWriter> {
        let segments = self.resolve(path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(Error::AccessDenied(format!("{path} is a directory")));
        };

        let mut guard = self.tree();
        let children =
            find_dir_mut(&mut guard, parents).ok_or_else(|| Error::NotFound(path.to_string()))?;

        let (buffer, created) = match children.get(name) {
            Some(Node::Dir(_)) => {
                return Err(Error::AccessDenied(format!("{path} is a directory")))
            }
            Some(Node::File { data, created, .. }) => {
                if flags.contains(OpenFlags::EXCLUDE) {
                    return Err(Error::AlreadyExists(path.to_string()));
                }
                let initial = if flags.contains(OpenFlags::APPEND) {
                    data.to_vec()
                } else {
                    Vec::new()
                };
                (initial, *created)
            }
            None => {
                if !flags.contains(OpenFlags::CREATE) {
                    return Err(Error::NotFound(path.to_string()));
                }
                (Vec::new(), now())
            }
        };
        drop(guard);

        Ok(Box::new(MemoryWriter {
            root: Arc::clone(&self.root),
            segments,
            buffer,
            created,
            committed: false,
        }))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        let Some((source_name, source_parents)) = source.split_last() else {
            return Err(Error::InvalidArgument(
                "cannot rename the share root".to_string(),
            ));
        };
        let Some((target_name, target_parents)) = target.split_last() else {
            return Err(Error::InvalidArgument(
                "cannot rename onto the share root".to_string(),
            ));
        };

        let mut guard = self.tree();
        {
            let target_children = find_dir_mut(&mut guard, target_parents)
                .ok_or_else(|| Error::NotFound(to.to_string()))?;
            if target_children.contains_key(target_name) {
                return Err(Error::AlreadyExists(to.to_string()));
            }
        }
        let node = {
            let source_children = find_dir_mut(&mut guard, source_parents)
                .ok_or_else(|| Error::NotFound(from.to_string()))?;
            source_children
                .remove(source_name)
                .ok_or_else(|| Error::NotFound(from.to_string()))?
        };
        let target_children =
            find_dir_mut(&mut guard, target_parents).ok_or_else(|| Error::NotFound(to.to_string()))?;
        let _ = target_children.insert(target_name.clone(), node);

        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let segments = self.resolve(path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(Error::AlreadyExists(path.to_string()));
        };

        let mut guard = self.tree();
        let children =
            find_dir_mut(&mut guard, parents).ok_or_else(|| Error::NotFound(path.to_string()))?;
        if children.contains_key(name) {
            return Err(Error::AlreadyExists(path.to_string()));
        }
        let _ = children.insert(name.clone(), Node::Dir(BTreeMap::new()));

        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let segments = self.resolve(path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(Error::InvalidArgument(
                "cannot remove the share root".to_string(),
            ));
        };

        let mut guard = self.tree();
        let children =
            find_dir_mut(&mut guard, parents).ok_or_else(|| Error::NotFound(path.to_string()))?;
        match children.get(name) {
            None => Err(Error::NotFound(path.to_string())),
            Some(Node::Dir(grandchildren)) if !grandchildren.is_empty() => {
                Err(Error::InvalidArgument(format!("{path} is not empty")))
            }
            Some(_) => {
                let _ = children.remove(name);
                Ok(())
            }
        }
    }
}

/// Write stream that buffers locally and commits to the tree on
/// `shutdown`. Dropping the writer without shutting it down discards the
/// buffered bytes, like closing a remote handle without flushing.
struct MemoryWriter {
    root: Arc<Mutex<Node>>,
    segments: Vec<String>,
    buffer: Vec<u8>,
    created: u64,
    committed: bool,
}

impl MemoryWriter {
    fn commit(&mut self) -> io::Result<()> {
        if self.committed {
            return Ok(());
        }
        self.committed = true;

        let Some((name, parents)) = self.segments.split_last() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
        };
        let mut guard = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        let children = find_dir_mut(&mut guard, parents)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "parent directory removed"))?;
        let _ = children.insert(
            name.clone(),
            Node::File {
                data: Bytes::from(mem::take(&mut self.buffer)),
                created: self.created,
                modified: now(),
            },
        );

        Ok(())
    }
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buffer.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(self.commit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn unc(share: &MemoryShare, path: &str) -> String {
        share.location().unc_path(path)
    }

    #[tokio::test]
    async fn read_dir_reports_pseudo_entries() {
        let share = MemoryShare::new("srv", "data");
        let _ = share.put_file(r"docs\a.txt", "a").put_dir(r"docs\sub");

        let entries = share.read_dir(&unc(&share, "docs")).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".", "..", "a.txt", "sub"]);
    }

    #[tokio::test]
    async fn stat_distinguishes_files_and_dirs() {
        let share = MemoryShare::new("srv", "data");
        let _ = share
            .put_file_with_times("f.bin", vec![0u8; 10], 100, 200)
            .put_dir("d");

        let file = share.stat(&unc(&share, "f.bin")).await.unwrap();
        assert_eq!(file.size, 10);
        assert_eq!(file.created, 100);
        assert_eq!(file.modified, 200);

        let dir = share.stat(&unc(&share, "d")).await.unwrap();
        assert_eq!(dir, RawStat::default());
    }

    #[tokio::test]
    async fn write_commits_on_shutdown_only() {
        let share = MemoryShare::new("srv", "data");
        let mut writer = share
            .open_write(
                &unc(&share, "out.txt"),
                OpenFlags::CREATE | OpenFlags::WRITE,
            )
            .await
            .unwrap();
        writer.write_all(b"hello").await.unwrap();

        assert!(matches!(
            share.stat(&unc(&share, "out.txt")).await,
            Err(Error::NotFound(_))
        ));

        writer.shutdown().await.unwrap();
        let mut reader = share.open_read(&unc(&share, "out.txt")).await.unwrap();
        let mut contents = Vec::new();
        let _ = reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"hello");
    }

    #[tokio::test]
    async fn open_write_flag_handling() {
        let share = MemoryShare::new("srv", "data");
        let _ = share.put_file("f.txt", "old");

        let exclusive = share
            .open_write(
                &unc(&share, "f.txt"),
                OpenFlags::CREATE | OpenFlags::EXCLUDE | OpenFlags::WRITE,
            )
            .await;
        assert!(matches!(exclusive, Err(Error::AlreadyExists(_))));

        let missing = share
            .open_write(&unc(&share, "nope.txt"), OpenFlags::WRITE)
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let mut appender = share
            .open_write(
                &unc(&share, "f.txt"),
                OpenFlags::APPEND | OpenFlags::WRITE,
            )
            .await
            .unwrap();
        appender.write_all(b"+new").await.unwrap();
        appender.shutdown().await.unwrap();

        let mut reader = share.open_read(&unc(&share, "f.txt")).await.unwrap();
        let mut contents = Vec::new();
        let _ = reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"old+new");
    }

    #[tokio::test]
    async fn rename_refuses_existing_target() {
        let share = MemoryShare::new("srv", "data");
        let _ = share.put_file("a.txt", "a").put_file("b.txt", "b");

        let result = share
            .rename(&unc(&share, "a.txt"), &unc(&share, "b.txt"))
            .await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn remove_refuses_non_empty_directory() {
        let share = MemoryShare::new("srv", "data");
        let _ = share.put_file(r"d\child.txt", "x");

        let result = share.remove(&unc(&share, "d")).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        share.remove(&unc(&share, r"d\child.txt")).await.unwrap();
        share.remove(&unc(&share, "d")).await.unwrap();
    }

    #[tokio::test]
    async fn foreign_unc_is_not_found() {
        let share = MemoryShare::new("srv", "data");
        let result = share.read_dir(r"\\elsewhere\data\docs").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
