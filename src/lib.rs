//! Relens is the comparison core of a personal photo-journaling app: the
//! user photographs a fixed subject over time and compares two captures
//! side by side with independent zoom/rotate/pan, exporting a composited
//! image that matches the on-screen preview pixel-for-pixel.
//!
//! # Pipeline overview
//!
//! 1. **Store**: [`PhotoStore`] owns the authoritative subject/photo
//!    collections and persists an [`AppSnapshot`] asynchronously after every
//!    mutation; [`PhotoFileRepository`] owns the byte payloads on disk.
//! 2. **Cache**: [`ImageCache`] keeps bounded full-size and thumbnail tiers
//!    of decoded buffers, repopulated from the repository on demand.
//! 3. **Transform**: [`transform`] applies
//!    scale, rotation and translation deterministically at any resolution.
//! 4. **Compose**: [`CompareCompositor`] lays both transformed sides into
//!    fixed-aspect cells with labels and renders the export canvas.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Premultiplied RGBA8** end-to-end: every pixel buffer is an
//!   [`ImageRgba`].
//! - **No ambient globals**: caches, repositories and stores are constructed
//!   explicitly and passed by reference from the composition root.
//! - **Single-owner store**: mutations and reads of the collections go
//!   through one owner; codec work runs on workers against immutable copies.
#![forbid(unsafe_code)]

mod cache;
mod compare;
mod foundation;
mod imaging;
mod store;

pub use cache::image_cache::{FULL_CAPACITY, ImageCache, THUMBNAIL_CAPACITY};
pub use compare::compositor::{CompareCompositor, CompareSideParams, CompositorConfig, LabelBrush};
pub use compare::layout::{CompareLayout, FitMode, ResolvedLayout};
pub use foundation::core::{ImageRgba, TransformParams, Vec2};
pub use foundation::error::{RelensError, RelensResult};
pub use imaging::codec::{decode_image, encode_jpeg, encode_png, fit_within, resize_exact};
pub use imaging::transform::transform;
pub use store::model::{AppSnapshot, Photo, PhotoId, Subject, SubjectId};
pub use store::photo_store::PhotoStore;
pub use store::repository::{
    MAX_PAYLOAD_DIMENSION, PAYLOAD_JPEG_QUALITY, PhotoFileRepository,
    THUMBNAIL_JPEG_QUALITY, THUMBNAIL_PAYLOAD_DIMENSION,
};
pub use store::snapshot::{SnapshotWriter, load_snapshot, write_snapshot};
