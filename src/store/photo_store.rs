use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    cache::image_cache::ImageCache,
    foundation::error::RelensResult,
    store::model::{AppSnapshot, Photo, PhotoId, Subject, SubjectId},
    store::repository::PhotoFileRepository,
    store::snapshot::{SnapshotWriter, load_snapshot},
};

/// Authoritative in-memory collections of subjects and photos.
///
/// Mutations are synchronous: their effects are visible to the next read on
/// this value immediately, while durable persistence happens on the snapshot
/// writer thread afterwards. In-memory state is the source of truth for the
/// running process; the durable snapshot exists for restart recovery.
///
/// Concurrency discipline: all mutations and reads go through `&mut self` /
/// `&self` on a single owner. Image codec work runs on workers against
/// immutable copies and never touches these collections.
pub struct PhotoStore {
    subjects: Vec<Subject>,
    photos: Vec<Photo>,
    repo: Arc<PhotoFileRepository>,
    cache: Arc<ImageCache>,
    writer: SnapshotWriter,
}

impl PhotoStore {
    /// Load the store from the durable snapshot at `snapshot_path`.
    ///
    /// A missing or undecodable snapshot starts empty (first run).
    pub fn load(
        snapshot_path: impl Into<PathBuf>,
        repo: Arc<PhotoFileRepository>,
        cache: Arc<ImageCache>,
    ) -> Self {
        let snapshot_path = snapshot_path.into();
        let AppSnapshot { subjects, photos } = load_snapshot(&snapshot_path);
        Self {
            subjects,
            photos,
            repo,
            cache,
            writer: SnapshotWriter::spawn(snapshot_path),
        }
    }

    /// Append a subject and persist.
    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.push(subject);
        self.persist();
    }

    /// Append a photo and persist.
    pub fn add_photo(&mut self, photo: Photo) {
        self.photos.push(photo);
        self.persist();
    }

    /// Rename a subject in place; absent ids are a no-op.
    pub fn update_subject_name(&mut self, subject_id: SubjectId, name: impl Into<String>) {
        if let Some(subject) = self.subjects.iter_mut().find(|s| s.id == subject_id) {
            subject.name = name.into();
            self.persist();
        }
    }

    /// Edit a photo's note in place; absent ids are a no-op.
    pub fn update_photo_note(&mut self, photo_id: PhotoId, note: Option<String>) {
        if let Some(photo) = self.photos.iter_mut().find(|p| p.id == photo_id) {
            photo.note = note;
            self.persist();
        }
    }

    /// Set or clear a subject's explicit cover override.
    ///
    /// Absent subject ids are a no-op, as is a cover that does not resolve to
    /// one of the subject's own photos. Only valid pointers reach the
    /// snapshot.
    pub fn update_subject_cover(&mut self, subject_id: SubjectId, cover: Option<PhotoId>) {
        if let Some(photo_id) = cover {
            let owned = self
                .photos
                .iter()
                .any(|p| p.id == photo_id && p.subject_id == Some(subject_id));
            if !owned {
                return;
            }
        }
        if let Some(subject) = self.subjects.iter_mut().find(|s| s.id == subject_id) {
            subject.cover_photo_id = cover;
            self.persist();
        }
    }

    /// Delete a subject and cascade to all of its photos.
    ///
    /// Payloads and cache entries go first, then the photos and the subject
    /// leave the collections in the same mutation, so no reader of this store
    /// can observe the subject gone while its photos remain (or vice versa).
    pub fn delete_subject(&mut self, subject_id: SubjectId) {
        let before = self.subjects.len();
        self.subjects.retain(|s| s.id != subject_id);
        if self.subjects.len() == before {
            return;
        }

        for photo in self.photos.iter().filter(|p| p.subject_id == Some(subject_id)) {
            self.discard_payload(&photo.file_name);
        }
        self.photos.retain(|p| p.subject_id != Some(subject_id));
        self.persist();
    }

    /// Delete one photo, clearing its subject's cover pointer when it was
    /// the cover. Absent ids are a no-op.
    pub fn delete_photo(&mut self, photo_id: PhotoId) {
        let Some(index) = self.photos.iter().position(|p| p.id == photo_id) else {
            return;
        };
        let photo = self.photos.remove(index);

        if let Some(subject_id) = photo.subject_id {
            if let Some(subject) = self.subjects.iter_mut().find(|s| s.id == subject_id) {
                if subject.cover_photo_id == Some(photo_id) {
                    subject.cover_photo_id = None;
                }
            }
        }

        self.discard_payload(&photo.file_name);
        self.persist();
    }

    /// Photos of a subject, most recently taken first.
    pub fn photos_for_subject(&self, subject_id: SubjectId) -> Vec<&Photo> {
        let mut photos: Vec<&Photo> = self
            .photos
            .iter()
            .filter(|p| p.subject_id == Some(subject_id))
            .collect();
        photos.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        photos
    }

    /// The subject's cover: the explicit override when it still resolves,
    /// else the most recently taken photo, else none.
    pub fn cover_photo(&self, subject_id: SubjectId) -> Option<&Photo> {
        let subject = self.subjects.iter().find(|s| s.id == subject_id)?;
        if let Some(cover_id) = subject.cover_photo_id {
            let resolved = self
                .photos
                .iter()
                .find(|p| p.id == cover_id && p.subject_id == Some(subject_id));
            if resolved.is_some() {
                return resolved;
            }
        }
        self.photos
            .iter()
            .filter(|p| p.subject_id == Some(subject_id))
            .max_by_key(|p| p.taken_at)
    }

    /// Earliest photo of a subject by capture time.
    pub fn first_photo(&self, subject_id: SubjectId) -> Option<&Photo> {
        self.photos
            .iter()
            .filter(|p| p.subject_id == Some(subject_id))
            .min_by_key(|p| p.taken_at)
    }

    /// Subjects ordered by creation time, newest first.
    pub fn sorted_subjects(&self) -> Vec<&Subject> {
        let mut subjects: Vec<&Subject> = self.subjects.iter().collect();
        subjects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        subjects
    }

    /// Current collections as a snapshot value.
    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            subjects: self.subjects.clone(),
            photos: self.photos.clone(),
        }
    }

    /// Wait until every mutation so far is durable; see
    /// [`SnapshotWriter::flush`].
    pub fn flush(&self, timeout: Duration) -> RelensResult<()> {
        self.writer.flush(timeout)
    }

    /// Best-effort removal of a photo's byte payload and cache entries.
    /// Failures are logged, never abort the mutation that triggered them.
    fn discard_payload(&self, file_name: &str) {
        if let Err(e) = self.repo.delete(file_name) {
            tracing::warn!(file_name, error = %e, "photo payload delete failed");
        }
        self.cache.invalidate(file_name);
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        self.writer.submit(snapshot);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/photo_store.rs"]
mod tests;
