use std::fmt;

use tracing::{info, warn};

use super::error::SyncError;
use super::model::{CourseId, Curriculum};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    File,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Video => f.write_str("video"),
            AssetKind::File => f.write_str("file"),
        }
    }
}

/// File picked by the author, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalAsset {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Asset after upload, addressed by the URL the media host handed back.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct HostedAsset {
    pub hosted_url: String,
}

/// Persistence and media hosting for curricula. All writes replace the
/// whole curriculum.
pub trait CurriculumBackend {
    /// `Ok(None)` when the course has no saved curriculum yet.
    fn fetch(&self, course_id: &CourseId) -> Result<Option<Curriculum>, SyncError>;

    fn replace(&self, course_id: &CourseId, curriculum: &Curriculum) -> Result<(), SyncError>;

    fn replace_draft(&self, course_id: &CourseId, curriculum: &Curriculum)
        -> Result<(), SyncError>;

    fn upload(&self, kind: AssetKind, asset: &LocalAsset) -> Result<HostedAsset, SyncError>;
}

impl<B: CurriculumBackend + ?Sized> CurriculumBackend for &B {
    fn fetch(&self, course_id: &CourseId) -> Result<Option<Curriculum>, SyncError> {
        (**self).fetch(course_id)
    }

    fn replace(&self, course_id: &CourseId, curriculum: &Curriculum) -> Result<(), SyncError> {
        (**self).replace(course_id, curriculum)
    }

    fn replace_draft(
        &self,
        course_id: &CourseId,
        curriculum: &Curriculum,
    ) -> Result<(), SyncError> {
        (**self).replace_draft(course_id, curriculum)
    }

    fn upload(&self, kind: AssetKind, asset: &LocalAsset) -> Result<HostedAsset, SyncError> {
        (**self).upload(kind, asset)
    }
}

/// Translates between the editor's tree and a [`CurriculumBackend`].
pub struct SyncGateway<B> {
    backend: B,
}

impl<B: CurriculumBackend> SyncGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// A course without a curriculum, or with an empty one, starts from the
    /// default single blank section.
    pub fn load(&self, course_id: &CourseId) -> Result<Curriculum, SyncError> {
        match self.backend.fetch(course_id) {
            Ok(Some(curriculum)) if !curriculum.sections.is_empty() => {
                info!(course = %course_id, sections = curriculum.sections.len(), "curriculum loaded");
                Ok(curriculum)
            }
            Ok(_) => {
                info!(course = %course_id, "no curriculum yet, starting empty");
                Ok(Curriculum::empty())
            }
            Err(e) => {
                warn!(course = %course_id, error = %e, "failed to load curriculum");
                Err(e)
            }
        }
    }

    pub fn save_final(&self, course_id: &CourseId, curriculum: &Curriculum) -> Result<(), SyncError> {
        self.backend
            .replace(course_id, curriculum)
            .inspect(|_| info!(course = %course_id, "curriculum saved"))
            .inspect_err(|e| warn!(course = %course_id, error = %e, "failed to save curriculum"))
    }

    pub fn save_draft(&self, course_id: &CourseId, curriculum: &Curriculum) -> Result<(), SyncError> {
        self.backend
            .replace_draft(course_id, curriculum)
            .inspect(|_| info!(course = %course_id, "curriculum draft saved"))
            .inspect_err(|e| warn!(course = %course_id, error = %e, "failed to save draft"))
    }

    pub fn upload_asset(&self, kind: AssetKind, asset: &LocalAsset) -> Result<HostedAsset, SyncError> {
        self.backend
            .upload(kind, asset)
            .inspect(|hosted| info!(%kind, file = %asset.file_name, url = %hosted.hosted_url, "asset uploaded"))
            .inspect_err(|e| warn!(%kind, file = %asset.file_name, error = %e, "asset upload failed"))
    }
}
