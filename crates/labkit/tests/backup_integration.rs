//! Integration tests for the `backup` module.

use std::fs;
use std::path::PathBuf;

use labkit::backup::{snapshot_sources, BackupError};

#[test]
fn test_snapshot_preserves_relative_layout_and_removes_staging() {
    let project = tempfile::tempdir().unwrap();
    let run = tempfile::tempdir().unwrap();

    fs::write(project.path().join("train.py"), "print('train')").unwrap();
    fs::create_dir_all(project.path().join("models")).unwrap();
    fs::write(project.path().join("models/resnet.py"), "class ResNet: pass").unwrap();

    let staging = run.path().join("_sources");
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("leftover"), "tmp").unwrap();

    let report = snapshot_sources(
        run.path(),
        project.path(),
        &[PathBuf::from("train.py"), PathBuf::from("models/resnet.py")],
        Some(&staging),
    )
    .unwrap();

    assert_eq!(report.copied.len(), 2);
    assert!(report.staging_removed);
    assert!(!staging.exists());

    let copied_root = run.path().join("source/train.py");
    let copied_nested = run.path().join("source/models/resnet.py");
    assert_eq!(fs::read_to_string(copied_root).unwrap(), "print('train')");
    assert_eq!(fs::read_to_string(copied_nested).unwrap(), "class ResNet: pass");
}

#[test]
fn test_snapshot_without_staging_directory() {
    let project = tempfile::tempdir().unwrap();
    let run = tempfile::tempdir().unwrap();
    fs::write(project.path().join("main.py"), "pass").unwrap();

    // No staging given at all.
    let report =
        snapshot_sources(run.path(), project.path(), &[PathBuf::from("main.py")], None).unwrap();
    assert!(!report.staging_removed);

    // Staging given but absent on disk: not an error.
    let ghost = run.path().join("_sources");
    let report = snapshot_sources(
        run.path(),
        project.path(),
        &[PathBuf::from("main.py")],
        Some(&ghost),
    )
    .unwrap();
    assert!(!report.staging_removed);
}

#[test]
fn test_snapshot_is_rejected_for_unsafe_paths() {
    let run = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();

    let absolute = snapshot_sources(
        run.path(),
        project.path(),
        &[PathBuf::from("/etc/hostname")],
        None,
    );
    assert!(matches!(absolute, Err(BackupError::AbsoluteSource(_))));

    let escaping = snapshot_sources(
        run.path(),
        project.path(),
        &[PathBuf::from("ok.py"), PathBuf::from("../escape.py")],
        None,
    );
    assert!(matches!(escaping, Err(BackupError::EscapingSource(_))));

    // Rejection happens before any filesystem work.
    assert!(!run.path().join("source").exists());
}
