use std::fs;

use vidjob_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_artifact() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("frames_a.mp4_1.zip", b"PK-one").unwrap();
    assert_eq!(first.file_name().unwrap(), "frames_a.mp4_1.zip");
    assert_eq!(fs::read(&first).unwrap(), b"PK-one");

    let second = writer.write("frames_a.mp4_1.zip", b"PK-two").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"PK-two");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("session.ron", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("session.ron").exists());
}

#[test]
fn remove_reports_missing_files() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    writer.write("session.ron", b"(token: \"t\")").unwrap();

    assert!(writer.remove("session.ron").unwrap());
    assert!(!writer.remove("session.ron").unwrap());
    assert!(!temp.path().join("session.ron").exists());
}
