use std::io::Cursor;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!("relens_{name}_{}_{nanos}", std::process::id()))
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 60, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn save_generates_unique_jpeg_names() {
    let repo = PhotoFileRepository::open(temp_dir("repo_save")).unwrap();
    let a = repo.save(&png_bytes(6, 4)).unwrap();
    let b = repo.save(&png_bytes(6, 4)).unwrap();
    assert_ne!(a, b);
    assert!(a.ends_with(".jpg"));

    let payload = repo.load(&a).unwrap();
    let img = codec::decode_image(&payload).unwrap();
    assert_eq!((img.width, img.height), (6, 4));
}

#[test]
fn save_writes_a_companion_thumbnail() {
    let repo = PhotoFileRepository::open(temp_dir("repo_thumb")).unwrap();
    let name = repo.save(&png_bytes(6, 4)).unwrap();
    let thumb = repo.load_thumbnail(&name).unwrap();
    let img = codec::decode_image(&thumb).unwrap();
    assert!(img.width <= THUMBNAIL_PAYLOAD_DIMENSION);
    assert!(img.height <= THUMBNAIL_PAYLOAD_DIMENSION);
}

#[test]
fn save_rejects_undecodable_bytes() {
    let repo = PhotoFileRepository::open(temp_dir("repo_garbage")).unwrap();
    assert!(repo.save(b"not an image").is_err());
}

#[test]
fn load_missing_payload_is_not_found() {
    let repo = PhotoFileRepository::open(temp_dir("repo_missing")).unwrap();
    let err = repo.load("gone.jpg").unwrap_err();
    assert!(matches!(err, RelensError::NotFound(_)));
    assert!(repo.load_thumbnail("gone.jpg").is_none());
}

#[test]
fn delete_is_idempotent_and_removes_the_companion() {
    let repo = PhotoFileRepository::open(temp_dir("repo_delete")).unwrap();
    let name = repo.save(&png_bytes(6, 4)).unwrap();

    repo.delete(&name).unwrap();
    assert!(matches!(repo.load(&name), Err(RelensError::NotFound(_))));
    assert!(repo.load_thumbnail(&name).is_none());

    // Deleting again is fine.
    repo.delete(&name).unwrap();
}

#[test]
fn path_traversal_names_are_rejected() {
    let repo = PhotoFileRepository::open(temp_dir("repo_traversal")).unwrap();
    for name in ["", "..", "a/b.jpg", "a\\b.jpg"] {
        assert!(repo.load(name).is_err(), "name {name:?}");
        assert!(repo.delete(name).is_err(), "name {name:?}");
    }
}

#[test]
fn no_temp_files_survive_a_save() {
    let root = temp_dir("repo_tmp");
    let repo = PhotoFileRepository::open(&root).unwrap();
    repo.save(&png_bytes(6, 4)).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
