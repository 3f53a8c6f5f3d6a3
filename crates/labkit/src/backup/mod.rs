//! Source snapshot helper for experiment run directories
//!
//! Research code changes between runs; a run directory is only
//! reproducible if it carries the sources that produced it. This module
//! copies the registered source files of a run into a `source/` subtree of
//! the run's storage directory, preserving their relative layout, and
//! removes the temporary staging directory the tracking tooling left
//! behind.

use std::io;
use std::path::{Path, PathBuf};
use std::{fs, path};

use thiserror::Error;
use tracing::{debug, info};

/// Error type for source snapshots.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("source path `{0}` is absolute; register sources relative to the project root")]
    AbsoluteSource(PathBuf),

    #[error("source path `{0}` contains `..`; it would escape the snapshot directory")]
    EscapingSource(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What a snapshot actually did.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SnapshotReport {
    /// Destination paths of the copied files.
    pub copied: Vec<PathBuf>,
    /// Whether a staging directory existed and was removed.
    pub staging_removed: bool,
}

/// Copy each registered source file into `run_dir/source/`, keeping its
/// path relative to `project_root`, then remove `staging` if it exists.
///
/// Source paths must be relative; an absolute path cannot be re-rooted
/// under `source/` and fails the whole snapshot before any copy happens.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::{Path, PathBuf};
///
/// use labkit::backup::snapshot_sources;
///
/// let report = snapshot_sources(
///     Path::new("runs/exp01"),
///     Path::new("."),
///     &[PathBuf::from("train.py"), PathBuf::from("models/resnet.py")],
///     Some(Path::new("runs/_sources")),
/// )
/// .unwrap();
/// assert_eq!(report.copied.len(), 2);
/// ```
pub fn snapshot_sources(
    run_dir: &Path,
    project_root: &Path,
    sources: &[PathBuf],
    staging: Option<&Path>,
) -> Result<SnapshotReport, BackupError> {
    if let Some(absolute) = sources.iter().find(|src| src.is_absolute()) {
        return Err(BackupError::AbsoluteSource(absolute.clone()));
    }
    if let Some(escaping) = sources.iter().find(|src| has_parent_components(src)) {
        return Err(BackupError::EscapingSource(escaping.clone()));
    }

    let dest_root = run_dir.join("source");
    let mut report = SnapshotReport::default();

    for src in sources {
        let dest = dest_root.join(src);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(project_root.join(src), &dest)?;
        debug!(source = %src.display(), "backed up source file");
        report.copied.push(dest);
    }

    if let Some(staging) = staging {
        if staging.exists() {
            fs::remove_dir_all(staging)?;
            report.staging_removed = true;
        }
    }

    info!(
        files = report.copied.len(),
        run_dir = %run_dir.display(),
        "source snapshot complete"
    );
    Ok(report)
}

fn has_parent_components(src: &Path) -> bool {
    src.components().any(|c| matches!(c, path::Component::ParentDir))
}

#[cfg(test)]
mod tests {
    //! Unit tests for the backup module.
    use super::*;

    #[test]
    fn test_absolute_sources_are_rejected_before_any_copy() {
        let run = tempfile::tempdir().unwrap();
        let err = snapshot_sources(
            run.path(),
            Path::new("."),
            &[PathBuf::from("/etc/hostname")],
            None,
        )
        .unwrap_err();

        assert!(matches!(err, BackupError::AbsoluteSource(_)));
        assert!(!run.path().join("source").exists());
    }

    #[test]
    fn test_parent_traversal_is_rejected() {
        let run = tempfile::tempdir().unwrap();
        let err = snapshot_sources(
            run.path(),
            Path::new("."),
            &[PathBuf::from("../outside.py")],
            None,
        )
        .unwrap_err();

        assert!(matches!(err, BackupError::EscapingSource(_)));
    }

    #[test]
    fn test_missing_source_file_surfaces_io_error() {
        let run = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let err = snapshot_sources(
            run.path(),
            project.path(),
            &[PathBuf::from("train.py")],
            None,
        )
        .unwrap_err();

        assert!(matches!(err, BackupError::Io(_)));
    }
}
