//! Artifact packaging onto cluster-shared storage.
//!
//! Each submission's compiled units are serialized into a single tar archive
//! at a path derived from the submission identity. The archive is written to
//! a staging file and atomically renamed into place only after it has been
//! finalized and synced, so a path the distributor can see never holds a
//! partial archive.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{compiler::CompiledUnits, identity::ScriptIdentity};

/// File suffix for a compiled unit entry inside an archive.
pub const UNIT_SUFFIX: &str = ".rhaic";

/// File suffix for an artifact archive on shared storage.
pub const ARCHIVE_SUFFIX: &str = ".tar";

/// Errors raised while packaging an archive.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// Writing the archive failed.
    #[error("failed to write artifact archive: {0}")]
    Io(#[from] std::io::Error),

    /// The archive write task ended without completing.
    #[error("archive write was interrupted: {0}")]
    Interrupted(String),
}

/// Writes one archive per submission under a cluster-shared root.
#[derive(Debug, Clone)]
pub struct ArtifactPackager {
    shared_root: PathBuf,
}

impl ArtifactPackager {
    /// Creates a packager rooted at the given cluster-shared directory.
    pub fn new(shared_root: impl Into<PathBuf>) -> Self {
        Self { shared_root: shared_root.into() }
    }

    /// The archive path for a submission identity.
    pub fn archive_path(&self, identity: &ScriptIdentity) -> PathBuf {
        self.shared_root.join(format!("{identity}{ARCHIVE_SUFFIX}"))
    }

    /// Serializes `units` into an archive at `archive_path`.
    ///
    /// Missing intermediate directories are created. On any failure the
    /// target path is left untouched.
    pub async fn package(
        &self,
        units: &CompiledUnits,
        archive_path: &Path,
    ) -> Result<(), PackagingError> {
        let units = units.clone();
        let archive_path = archive_path.to_path_buf();

        tokio::task::spawn_blocking(move || write_archive(&units, &archive_path))
            .await
            .map_err(|join_error| PackagingError::Interrupted(join_error.to_string()))?
    }
}

fn write_archive(units: &CompiledUnits, archive_path: &Path) -> Result<(), PackagingError> {
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(archive_path);
    let result = write_entries(units, &staging)
        .and_then(|()| fs::rename(&staging, archive_path).map_err(PackagingError::from));

    if result.is_err() {
        // Discard the staging file; the final path was never populated.
        let _ = fs::remove_file(&staging);
    }

    result
}

fn write_entries(units: &CompiledUnits, staging: &Path) -> Result<(), PackagingError> {
    let file = fs::File::create(staging)?;
    let mut builder = tar::Builder::new(file);

    for (name, payload) in units.iter() {
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, format!("{name}{UNIT_SUFFIX}"), payload)?;
    }

    let mut file = builder.into_inner()?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

fn staging_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
