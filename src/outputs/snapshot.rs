//! Snapshot storage for the last observed news listing of each region.
//!
//! A snapshot is the full ordered list of [`NewsEntry`] values extracted on
//! the most recent run. Only the set of `relative_url`s matters when reading
//! it back; the whole entry is stored so the file stays readable.
//!
//! # Replacement, not merge
//!
//! [`SnapshotStore::save`] replaces the previous snapshot wholesale. Entries
//! that fall off the listing are forgotten.
//!
//! # Crash Safety
//!
//! [`JsonFileStore`] writes to a sibling `.tmp` file, syncs it, and renames it
//! over the target, so a reader never sees a half-written snapshot.

use crate::error::{Error, Result};
use crate::models::{NewsEntry, Region};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Key-value storage of snapshots, keyed by region.
pub trait SnapshotStore {
    /// The `relative_url`s of the last saved snapshot for `region`.
    ///
    /// A region that was never saved yields an empty set.
    async fn load(&self, region: Region) -> Result<HashSet<String>>;

    /// Replace the snapshot for `region` with `entries`.
    async fn save(&self, region: Region, entries: &[NewsEntry]) -> Result<()>;
}

/// Snapshots stored as indented JSON arrays, one file per region.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file for `region`.
    pub fn path_for(&self, region: Region) -> PathBuf {
        self.dir.join(region.snapshot_file_name())
    }
}

impl SnapshotStore for JsonFileStore {
    #[instrument(level = "info", skip_all, fields(%region))]
    async fn load(&self, region: Region) -> Result<HashSet<String>> {
        let path = self.path_for(region);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No previous snapshot; every entry is new");
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<NewsEntry> =
            serde_json::from_slice(&bytes).map_err(|source| Error::Snapshot {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), count = entries.len(), "Loaded previous snapshot");
        Ok(entries.into_iter().map(|e| e.relative_url).collect())
    }

    #[instrument(level = "info", skip_all, fields(%region, count = entries.len()))]
    async fn save(&self, region: Region, entries: &[NewsEntry]) -> Result<()> {
        let path = self.path_for(region);
        let json = serde_json::to_vec_pretty(entries).map_err(|source| Error::Snapshot {
            path: path.clone(),
            source,
        })?;
        write_replace(&path, &json).await?;
        info!(path = %path.display(), "Wrote snapshot");
        Ok(())
    }
}

/// Write `contents` to a temporary sibling of `path`, then rename it into place.
///
/// The temporary file is synced before the rename so the target never points
/// at data that has not reached the disk.
async fn write_replace(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
