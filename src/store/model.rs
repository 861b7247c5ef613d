use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stable identifier of a tracked subject.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Stable identifier of a captured photo.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PhotoId(pub Uuid);

impl PhotoId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One tracked thing the user repeatedly photographs over time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Explicit cover override. When it stops resolving (cover photo
    /// deleted) the store clears it and falls back to the latest photo.
    pub cover_photo_id: Option<PhotoId>,
}

impl Subject {
    /// New subject created now with no cover override.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubjectId::generate(),
            name: name.into(),
            created_at: Utc::now(),
            cover_photo_id: None,
        }
    }
}

/// One captured or imported image plus metadata.
///
/// `file_name` is a content pointer into the file repository, not ownership:
/// the byte payload lives and dies with the repository entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub file_name: String,
    pub taken_at: DateTime<Utc>,
    pub note: Option<String>,
    /// Absent for unassigned captures.
    pub subject_id: Option<SubjectId>,
}

impl Photo {
    /// New photo record taken now for the given payload and subject.
    pub fn new(file_name: impl Into<String>, subject_id: Option<SubjectId>) -> Self {
        Self {
            id: PhotoId::generate(),
            file_name: file_name.into(),
            taken_at: Utc::now(),
            note: None,
            subject_id,
        }
    }
}

/// The sole unit of durable state, written as a whole-file overwrite after
/// every mutation and read once at startup.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AppSnapshot {
    pub subjects: Vec<Subject>,
    pub photos: Vec<Photo>,
}
