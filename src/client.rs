use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{
    error::{Error, Result},
    list::{EntryFilter, ListOptions, Listing, Walk},
    path::ShareLocation,
    provider::{OpenFlags, ShareProvider},
};

/// High-level client for one remote share.
///
/// Composes UNC paths for its [`ShareLocation`], drives the enumeration
/// walker and delegates the thin mutation operations to the provider. All
/// calls are sequential and blocking in the async sense: an operation runs
/// to completion or failure before the next one starts, and no state is
/// kept between calls.
pub struct ShareClient<P> {
    location: ShareLocation,
    provider: P,
}

impl<P: ShareProvider> ShareClient<P> {
    pub fn new(location: ShareLocation, provider: P) -> Self {
        Self { location, provider }
    }

    pub fn location(&self) -> &ShareLocation {
        &self.location
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Best-effort listing of a subtree.
    ///
    /// Never fails: any provider error anywhere in the walk (including a
    /// nonexistent root) yields an empty listing of the requested shape,
    /// with the cause logged. This is the deliberate fail-soft counterpart
    /// to [`list_folders`](Self::list_folders); callers that need the
    /// error must use the folder inventory instead.
    pub async fn list_files(&self, path_in_share: &str, opts: &ListOptions) -> Listing {
        let filter = if opts.files_only {
            EntryFilter::FilesOnly
        } else {
            EntryFilter::All
        };

        match self.walk(path_in_share, filter, opts).await {
            Ok(listing) => listing,
            Err(err) => {
                warn!("best-effort listing of {path_in_share:?} failed: {err}");
                Listing::empty(opts)
            }
        }
    }

    /// Authoritative directory inventory of a subtree.
    ///
    /// Emits directories only and propagates the first provider error
    /// encountered (fail-hard). With metadata requested, every record is
    /// tagged `is_dir = Some(true)`. The `files_only` option is meaningless
    /// here and ignored.
    pub async fn list_folders(&self, path_in_share: &str, opts: &ListOptions) -> Result<Listing> {
        self.walk(path_in_share, EntryFilter::DirsOnly, opts).await
    }

    async fn walk(
        &self,
        path_in_share: &str,
        filter: EntryFilter,
        opts: &ListOptions,
    ) -> Result<Listing> {
        Walk {
            provider: &self.provider,
            location: &self.location,
            root: path_in_share,
            filter,
            opts,
        }
        .run()
        .await
    }

    /// Reads the contents of a remote file to the end.
    pub async fn read(&self, path_in_share: &str) -> Result<Vec<u8>> {
        require(path_in_share, "source path")?;

        let mut stream = self
            .provider
            .open_read(&self.location.unc_path(path_in_share))
            .await?;
        let mut buffer = Vec::new();
        let _ = stream.read_to_end(&mut buffer).await?;

        Ok(buffer)
    }

    /// Reads a remote file as UTF-8 text.
    pub async fn read_to_string(&self, path_in_share: &str) -> Result<String> {
        Ok(String::from_utf8(self.read(path_in_share).await?)?)
    }

    /// Writes the contents to a remote file, creating it if missing and
    /// truncating it otherwise. The stream is released on every exit path.
    pub async fn write(&self, path_in_share: &str, data: &[u8]) -> Result<()> {
        require(path_in_share, "target path")?;

        let mut stream = self
            .provider
            .open_write(
                &self.location.unc_path(path_in_share),
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;
        stream.write_all(data).await?;
        stream.shutdown().await?;

        Ok(())
    }

    /// Moves or renames an entry within the share.
    pub async fn move_entry(&self, source: &str, target: &str) -> Result<()> {
        require(source, "source path")?;
        require(target, "target path")?;

        self.provider
            .rename(
                &self.location.unc_path(source),
                &self.location.unc_path(target),
            )
            .await
    }

    /// Creates a new empty directory.
    pub async fn create_dir(&self, path_in_share: &str) -> Result<()> {
        require(path_in_share, "directory path")?;

        self.provider
            .create_dir(&self.location.unc_path(path_in_share))
            .await
    }

    /// Creates the directory unless it already exists.
    pub async fn ensure_dir(&self, path_in_share: &str) -> Result<()> {
        match self.create_dir(path_in_share).await {
            Err(Error::AlreadyExists(_)) => Ok(()),
            other => other,
        }
    }

    /// Removes a file or an empty directory.
    pub async fn remove(&self, path_in_share: &str) -> Result<()> {
        require(path_in_share, "path")?;

        self.provider
            .remove(&self.location.unc_path(path_in_share))
            .await
    }

    /// Checks whether an entry exists at the given path.
    pub async fn exists(&self, path_in_share: &str) -> Result<bool> {
        match self
            .provider
            .stat(&self.location.unc_path(path_in_share))
            .await
        {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} missing")));
    }

    Ok(())
}
