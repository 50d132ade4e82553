use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Description of one discovered file-or-directory entry.
///
/// `folder` is the immediate parent directory's own segment, empty at the
/// traversal root. `full_share_path` is the parent's path relative to the
/// share root instead, independent of where the traversal started; the two
/// fields deliberately carry different bases.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub folder: String,
    /// Byte size; only present for files when metadata was requested.
    pub size: Option<u64>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    /// `None` in files-only mode, where the distinction carries no
    /// information.
    pub is_dir: Option<bool>,
    pub full_share_path: String,
}

impl FileInfo {
    fn identity(&self) -> (&str, &str, Option<u64>, Option<DateTime<Utc>>) {
        (
            self.name.as_str(),
            self.folder.as_str(),
            self.size,
            self.modified,
        )
    }
}

/// Identity covers `(name, folder, size, modified)` only. Creation time
/// and the directory flag are reported inconsistently by some servers, so
/// deduplication and set membership must not depend on them.
impl PartialEq for FileInfo {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for FileInfo {}

impl Hash for FileInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Maps a raw epoch-second timestamp onto a real point in time. A zero or
/// out-of-range value yields `None` rather than a manufactured epoch date.
pub(crate) fn timestamp(raw: u64) -> Option<DateTime<Utc>> {
    if raw == 0 {
        return None;
    }

    DateTime::from_timestamp(i64::try_from(raw).ok()?, 0)
}
