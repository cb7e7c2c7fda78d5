//! Snapshot sink writing one JSON file per step into a directory.
//!
//! Each snapshot is written to a temporary file inside the target directory
//! and renamed to `<step>.json` only after the write succeeds, so a failed
//! step never leaves a partial file behind.
use std::io::Write as _;
use std::path::{Path, PathBuf};

use linkage_core::{SinkError, Snapshot, SnapshotSink};

use crate::error::CliError;

/// Writes snapshots as `<dir>/<step>.json`.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    pretty: bool,
}

impl DirectorySink {
    /// Prepares `dir` for snapshots, creating it (and its parents) if needed.
    ///
    /// An existing directory is reused only if it holds no `<step>.json`
    /// snapshot files, so snapshots from different runs never mix.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::OutputDirUnusable`] when the directory cannot be
    /// created, the path exists but is not a directory, or it already holds
    /// snapshot files.
    pub fn create(dir: &Path, pretty: bool) -> Result<Self, CliError> {
        std::fs::create_dir_all(dir).map_err(|e| CliError::OutputDirUnusable {
            path: dir.to_path_buf(),
            detail: e.to_string(),
        })?;
        if !dir.is_dir() {
            return Err(CliError::OutputDirUnusable {
                path: dir.to_path_buf(),
                detail: "not a directory".to_owned(),
            });
        }
        if let Some(name) = existing_snapshot(dir)? {
            return Err(CliError::OutputDirUnusable {
                path: dir.to_path_buf(),
                detail: format!("already contains snapshot {name} from an earlier run"),
            });
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            pretty,
        })
    }

    /// Path the snapshot for `step` is written to.
    pub fn path_for(&self, step: usize) -> PathBuf {
        self.dir.join(format!("{step}.json"))
    }

    fn write(&self, snapshot: &Snapshot) -> Result<(), String> {
        let mut bytes = snapshot
            .to_json(self.pretty)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        bytes.push(b'\n');

        let target = self.path_for(snapshot.step);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| format!("cannot create temporary file: {e}"))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.flush())
            .map_err(|e| format!("cannot write {}: {e}", target.display()))?;
        tmp.persist(&target)
            .map_err(|e| format!("cannot move snapshot into {}: {}", target.display(), e.error))?;
        Ok(())
    }
}

/// Returns the name of the first `<step>.json` regular file in `dir`, if any.
fn existing_snapshot(dir: &Path) -> Result<Option<String>, CliError> {
    let unusable = |e: std::io::Error| CliError::OutputDirUnusable {
        path: dir.to_path_buf(),
        detail: e.to_string(),
    };
    for entry in std::fs::read_dir(dir).map_err(unusable)? {
        let entry = entry.map_err(unusable)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_snapshot_name(&name) && entry.file_type().map_err(unusable)?.is_file() {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

fn is_snapshot_name(name: &str) -> bool {
    name.strip_suffix(".json")
        .is_some_and(|step| !step.is_empty() && step.bytes().all(|b| b.is_ascii_digit()))
}

impl SnapshotSink for DirectorySink {
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        self.write(&snapshot).map_err(SinkError::new)
    }
}
