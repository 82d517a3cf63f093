//! On-disk snapshot format.
//!
//! A snapshot file is the `CTKR` magic followed by a `bincode` encoding of
//! `SnapshotFile`. Files are replaced whole: the new content goes to a uniquely
//! named sibling temporary file that is then renamed over the target, so
//! concurrent writers never share a temporary file.
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use bincode::config;
use ctkr_common::defaults::{SNAPSHOT_FORMAT_VERSION, SNAPSHOT_MAGIC};
use ctkr_common::{CtkrError, Result, SnapshotFile};
use log::debug;
use tempfile::NamedTempFile;

/// Encode a snapshot file, magic header included.
pub fn encode(file: &SnapshotFile) -> Result<Vec<u8>> {
    let mut bytes = SNAPSHOT_MAGIC.to_vec();
    bytes.extend(bincode::encode_to_vec(file, config::standard())?);
    Ok(bytes)
}

/// Decode bytes produced by [`encode`].
///
/// Any mismatch (header, version, truncated or trailing data) is reported as
/// `CtkrError::CorruptSnapshot`.
pub fn decode(bytes: &[u8]) -> Result<SnapshotFile> {
    let payload = bytes
        .strip_prefix(SNAPSHOT_MAGIC.as_slice())
        .ok_or_else(|| CtkrError::CorruptSnapshot("missing snapshot header".to_string()))?;

    let (file, read): (SnapshotFile, usize) =
        bincode::decode_from_slice(payload, config::standard())
            .map_err(|e| CtkrError::CorruptSnapshot(e.to_string()))?;

    if read != payload.len() {
        return Err(CtkrError::CorruptSnapshot(format!(
            "{} trailing bytes after snapshot",
            payload.len() - read
        )));
    }
    if file.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(CtkrError::CorruptSnapshot(format!(
            "unsupported format version {}",
            file.format_version
        )));
    }
    Ok(file)
}

/// Write `file` to `path`, creating parent directories as needed.
pub fn save(path: &Path, file: &SnapshotFile) -> Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    let bytes = encode(file)?;

    // Dropped (and deleted) on any error before `persist`.
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Read a snapshot file.
///
/// A missing file is `CtkrError::SnapshotNotFound`, distinct from unreadable
/// (`Io`) and undecodable (`CorruptSnapshot`) files.
pub fn load(path: &Path) -> Result<SnapshotFile> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CtkrError::SnapshotNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    decode(&bytes)
}
