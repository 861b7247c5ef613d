use super::*;

use crate::store::model::{Photo, Subject};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!("relens_{name}_{}_{nanos}", std::process::id()))
}

fn sample_snapshot() -> AppSnapshot {
    let subject = Subject::new("Fern");
    let photo = Photo::new("abc.jpg", Some(subject.id));
    AppSnapshot {
        subjects: vec![subject],
        photos: vec![photo],
    }
}

#[test]
fn absent_snapshot_loads_empty() {
    let loaded = load_snapshot(&temp_dir("snap_absent").join("state.json"));
    assert_eq!(loaded, AppSnapshot::default());
}

#[test]
fn corrupt_snapshot_loads_empty() {
    let path = temp_dir("snap_corrupt").join("state.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();
    assert_eq!(load_snapshot(&path), AppSnapshot::default());
}

#[test]
fn write_then_load_roundtrips() {
    let path = temp_dir("snap_roundtrip").join("nested").join("state.json");
    let snapshot = sample_snapshot();
    write_snapshot(&path, &snapshot).unwrap();
    assert_eq!(load_snapshot(&path), snapshot);
}

#[test]
fn write_leaves_no_temp_file() {
    let dir = temp_dir("snap_tmp");
    let path = dir.join("state.json");
    write_snapshot(&path, &sample_snapshot()).unwrap();
    assert!(!dir.join("state.tmp").exists());
}

#[test]
fn writer_persists_submitted_snapshots() {
    let path = temp_dir("snap_writer").join("state.json");
    let mut writer = SnapshotWriter::spawn(path.clone());

    writer.submit(sample_snapshot());
    writer.flush(Duration::from_secs(5)).unwrap();
    assert_eq!(load_snapshot(&path).subjects.len(), 1);
}

#[test]
fn writer_last_submission_wins() {
    let path = temp_dir("snap_coalesce").join("state.json");
    let mut writer = SnapshotWriter::spawn(path.clone());

    for i in 0..10 {
        let mut snapshot = AppSnapshot::default();
        snapshot.subjects.push(Subject::new(format!("subject {i}")));
        writer.submit(snapshot);
    }
    writer.flush(Duration::from_secs(5)).unwrap();

    let loaded = load_snapshot(&path);
    assert_eq!(loaded.subjects.len(), 1);
    assert_eq!(loaded.subjects[0].name, "subject 9");
}

#[test]
fn flush_with_nothing_pending_is_immediate() {
    let writer = SnapshotWriter::spawn(temp_dir("snap_idle").join("state.json"));
    writer.flush(Duration::from_millis(1)).unwrap();
}

#[test]
fn flush_surfaces_write_failures() {
    // Point the snapshot at an existing directory so the commit rename fails.
    let path = temp_dir("snap_fail");
    std::fs::create_dir_all(&path).unwrap();

    let mut writer = SnapshotWriter::spawn(path);
    writer.submit(sample_snapshot());
    let err = writer.flush(Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, RelensError::Io(_)));
}
