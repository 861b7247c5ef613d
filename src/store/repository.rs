use std::path::{Path, PathBuf};

use anyhow::Context;
use uuid::Uuid;

use crate::{
    foundation::error::{RelensError, RelensResult},
    imaging::codec,
};

/// Longest side a stored payload may have; larger captures are downscaled.
pub const MAX_PAYLOAD_DIMENSION: u32 = 4096;
/// JPEG quality of the primary payload.
pub const PAYLOAD_JPEG_QUALITY: u8 = 80;
/// Longest side of the companion thumbnail payload.
pub const THUMBNAIL_PAYLOAD_DIMENSION: u32 = 512;
/// JPEG quality of the companion thumbnail payload.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 60;

const THUMB_SUFFIX: &str = ".thumb.jpg";

/// Maps opaque photo file names to byte payloads on disk.
///
/// Owns payload bytes exclusively; the snapshot references them by name but
/// never embeds them. Every save also writes a lower-quality companion
/// thumbnail under a derived name for fast thumbnail loads.
#[derive(Debug)]
pub struct PhotoFileRepository {
    root: PathBuf,
}

impl PhotoFileRepository {
    /// Open (and create if needed) a repository rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> RelensResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create photo repository at '{}'", root.display()))?;
        Ok(Self { root })
    }

    /// Root directory payloads are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-encode and persist image bytes, returning the generated file name.
    ///
    /// Oversized captures are downscaled so the longest side is at most
    /// [`MAX_PAYLOAD_DIMENSION`] before encoding at [`PAYLOAD_JPEG_QUALITY`].
    pub fn save(&self, image_bytes: &[u8]) -> RelensResult<String> {
        let decoded = codec::decode_image(image_bytes)?;
        let bounded = codec::fit_within(&decoded, MAX_PAYLOAD_DIMENSION)?;
        let payload = codec::encode_jpeg(&bounded, PAYLOAD_JPEG_QUALITY)?;

        let file_name = format!("{}.jpg", Uuid::new_v4());
        self.write_atomic(&file_name, &payload)?;

        let thumb = codec::fit_within(&bounded, THUMBNAIL_PAYLOAD_DIMENSION)
            .and_then(|img| codec::encode_jpeg(&img, THUMBNAIL_JPEG_QUALITY));
        match thumb {
            Ok(bytes) => self.write_atomic(&thumb_name(&file_name), &bytes)?,
            // The companion is an optimization; a failed thumbnail never
            // fails the save.
            Err(e) => tracing::warn!(file_name, error = %e, "companion thumbnail skipped"),
        }

        Ok(file_name)
    }

    /// Load the primary payload bytes for `file_name`.
    pub fn load(&self, file_name: &str) -> RelensResult<Vec<u8>> {
        let path = self.path_for(file_name)?;
        if !path.is_file() {
            return Err(RelensError::not_found(format!(
                "photo payload '{file_name}'"
            )));
        }
        std::fs::read(&path)
            .with_context(|| format!("read photo payload '{}'", path.display()))
            .map_err(RelensError::from)
    }

    /// Load the companion thumbnail bytes, if the repository has one.
    pub fn load_thumbnail(&self, file_name: &str) -> Option<Vec<u8>> {
        let path = self.path_for(&thumb_name(file_name)).ok()?;
        std::fs::read(path).ok()
    }

    /// Delete the payload and its companion. Idempotent: deleting an absent
    /// name succeeds.
    pub fn delete(&self, file_name: &str) -> RelensResult<()> {
        for name in [file_name.to_string(), thumb_name(file_name)] {
            let path = self.path_for(&name)?;
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(RelensError::io(format!(
                        "delete photo payload '{}': {e}",
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve a file name inside the root, rejecting anything that is not a
    /// single plain path segment.
    fn path_for(&self, file_name: &str) -> RelensResult<PathBuf> {
        if file_name.is_empty()
            || file_name == ".."
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(RelensError::io(format!(
                "invalid photo file name '{file_name}'"
            )));
        }
        Ok(self.root.join(file_name))
    }

    fn write_atomic(&self, file_name: &str, bytes: &[u8]) -> RelensResult<()> {
        let path = self.path_for(file_name)?;
        let tmp = self.root.join(format!("{file_name}.tmp"));
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("write photo payload '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("commit photo payload '{}'", path.display()))?;
        Ok(())
    }
}

fn thumb_name(file_name: &str) -> String {
    format!("{}{THUMB_SUFFIX}", file_name.trim_end_matches(".jpg"))
}

#[cfg(test)]
#[path = "../../tests/unit/store/repository.rs"]
mod tests;
