//! Directory enumeration: listing options, result shapes and the
//! depth-bounded recursive walker.

use std::{collections::HashSet, future::Future, pin::Pin};

use serde::Serialize;

use crate::{
    error::Result,
    info::{self, FileInfo},
    path::{self, ShareLocation},
    provider::{DirEntry, EntryKind, ShareProvider},
};

/// Name excluded from every listing unless the caller overrides the set.
pub const DEFAULT_EXCLUDE: &str = ".DS_Store";

/// Options shared by the listing entry points.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub(crate) files_only: bool,
    pub(crate) recursive: bool,
    pub(crate) max_depth: Option<u32>,
    pub(crate) exclude: HashSet<String>,
    pub(crate) include_metadata: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            files_only: false,
            recursive: false,
            max_depth: None,
            exclude: HashSet::from([DEFAULT_EXCLUDE.to_string()]),
            include_metadata: false,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop directory entries from the result entirely.
    #[must_use]
    pub fn files_only(mut self, files_only: bool) -> Self {
        self.files_only = files_only;
        self
    }

    /// Descend into subdirectories, emitting backslash-joined relative
    /// paths (or [`FileInfo`] records) in preorder.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Bound on subfolder levels below the traversal root. `0` still lists
    /// the root's direct children and descends no further; unset means
    /// unlimited. Has no effect on a non-recursive listing.
    #[must_use]
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    #[must_use]
    pub fn unlimited_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Replace the exclusion set. An empty iterator disables exclusion
    /// altogether. The `.` and `..` pseudo-entries are always dropped,
    /// independent of this set.
    #[must_use]
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    /// Stat every surviving entry and return [`FileInfo`] records instead
    /// of bare names.
    #[must_use]
    pub fn include_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }
}

/// Result of one listing call.
///
/// The shape follows the requested mode: bare names (relative paths when
/// recursive) without metadata, [`FileInfo`] records with it. The two are
/// never mixed within one result. Order is provider enumeration order; no
/// alphabetical sort is implied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Names(Vec<String>),
    Entries(Vec<FileInfo>),
}

impl Listing {
    pub(crate) fn empty(opts: &ListOptions) -> Self {
        if opts.include_metadata {
            Self::Entries(Vec::new())
        } else {
            Self::Names(Vec::new())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Option<&[String]> {
        match self {
            Self::Names(names) => Some(names),
            Self::Entries(_) => None,
        }
    }

    pub fn entries(&self) -> Option<&[FileInfo]> {
        match self {
            Self::Names(_) => None,
            Self::Entries(entries) => Some(entries),
        }
    }

    pub fn into_names(self) -> Option<Vec<String>> {
        match self {
            Self::Names(names) => Some(names),
            Self::Entries(_) => None,
        }
    }

    pub fn into_entries(self) -> Option<Vec<FileInfo>> {
        match self {
            Self::Names(_) => None,
            Self::Entries(entries) => Some(entries),
        }
    }

    fn push_name(&mut self, name: String) {
        if let Self::Names(names) = self {
            names.push(name);
        }
    }

    fn push_entry(&mut self, entry: FileInfo) {
        if let Self::Entries(entries) = self {
            entries.push(entry);
        }
    }
}

/// Which entries a walk emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryFilter {
    All,
    FilesOnly,
    DirsOnly,
}

/// One traversal of a subtree. Strictly sequential: directories are
/// enumerated one at a time in provider order, parents before children.
pub(crate) struct Walk<'a, P> {
    pub provider: &'a P,
    pub location: &'a ShareLocation,
    /// Traversal root, relative to the share root.
    pub root: &'a str,
    pub filter: EntryFilter,
    pub opts: &'a ListOptions,
}

impl<P: ShareProvider> Walk<'_, P> {
    pub async fn run(&self) -> Result<Listing> {
        let mut out = Listing::empty(self.opts);
        self.walk_dir(String::new(), 0, &mut out).await?;
        Ok(out)
    }

    /// Preorder walk of one directory. `dir_rel` is the directory's path
    /// relative to the traversal root, empty at the root itself; `depth`
    /// counts subfolder levels below the root's direct children.
    fn walk_dir<'b>(
        &'b self,
        dir_rel: String,
        depth: u32,
        out: &'b mut Listing,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'b>> {
        Box::pin(async move {
            let dir_in_share = path::join(self.root, &dir_rel);
            let unc = self.location.unc_path(&dir_in_share);
            debug!("enumerating {unc} at depth {depth}");

            for entry in self.provider.read_dir(&unc).await? {
                if entry.name == "." || entry.name == ".." {
                    continue;
                }
                if self.opts.exclude.contains(&entry.name) {
                    trace!("excluding {}", entry.name);
                    continue;
                }

                let rel = path::join(&dir_rel, &entry.name);
                match entry.kind {
                    EntryKind::File => {
                        if self.filter != EntryFilter::DirsOnly {
                            self.emit(&entry, &rel, &dir_rel, &dir_in_share, out).await?;
                        }
                    }
                    EntryKind::Directory => {
                        if self.filter != EntryFilter::FilesOnly {
                            self.emit(&entry, &rel, &dir_rel, &dir_in_share, out).await?;
                        }
                        if self.descend(depth) {
                            self.walk_dir(rel, depth + 1, out).await?;
                        }
                    }
                    EntryKind::Other => {}
                }
            }

            Ok(())
        })
    }

    fn descend(&self, depth: u32) -> bool {
        self.opts.recursive && self.opts.max_depth.map_or(true, |limit| depth < limit)
    }

    async fn emit(
        &self,
        entry: &DirEntry,
        rel: &str,
        dir_rel: &str,
        dir_in_share: &str,
        out: &mut Listing,
    ) -> Result<()> {
        if !self.opts.include_metadata {
            out.push_name(rel.to_string());
            return Ok(());
        }

        let entry_in_share = path::join(dir_in_share, &entry.name);
        let stat = self
            .provider
            .stat(&self.location.unc_path(&entry_in_share))
            .await?;

        out.push_entry(FileInfo {
            name: entry.name.clone(),
            // Intentionally the parent's own segment, not the full
            // relative prefix; `full_share_path` carries the long form.
            folder: path::last_segment(dir_rel).to_string(),
            size: entry.is_file().then_some(stat.size),
            created: info::timestamp(stat.created),
            modified: info::timestamp(stat.modified),
            is_dir: match self.filter {
                EntryFilter::FilesOnly => None,
                EntryFilter::DirsOnly => Some(true),
                EntryFilter::All => Some(entry.is_dir()),
            },
            full_share_path: dir_in_share.to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_exclude_ds_store() {
        let opts = ListOptions::default();
        assert!(opts.exclude.contains(DEFAULT_EXCLUDE));
        assert!(!opts.files_only);
        assert!(!opts.recursive);
        assert_eq!(opts.max_depth, None);
        assert!(!opts.include_metadata);
    }

    #[test]
    fn exclude_replaces_the_whole_set() {
        let opts = ListOptions::new().exclude(["Thumbs.db"]);
        assert!(opts.exclude.contains("Thumbs.db"));
        assert!(!opts.exclude.contains(DEFAULT_EXCLUDE));

        let none = ListOptions::new().exclude(Vec::<String>::new());
        assert!(none.exclude.is_empty());
    }

    #[test]
    fn listing_shape_follows_metadata_flag() {
        let names = Listing::empty(&ListOptions::new());
        assert_eq!(names, Listing::Names(Vec::new()));

        let entries = Listing::empty(&ListOptions::new().include_metadata(true));
        assert_eq!(entries, Listing::Entries(Vec::new()));
        assert!(entries.is_empty());
    }
}
