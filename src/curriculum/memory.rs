//! In-process backend for offline editing and tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::error::SyncError;
use super::gateway::{AssetKind, CurriculumBackend, HostedAsset, LocalAsset};
use super::model::{CourseId, Curriculum};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    curricula: RefCell<HashMap<CourseId, Curriculum>>,
    drafts: RefCell<HashMap<CourseId, Curriculum>>,
    uploads: RefCell<Vec<(AssetKind, String)>>,
    failing_saves: Cell<usize>,
    failing_uploads: Cell<usize>,
    rejected_token: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds a curriculum for `course_id`.
    pub fn with_curriculum(course_id: CourseId, curriculum: Curriculum) -> Self {
        let backend = Self::new();
        backend.curricula.borrow_mut().insert(course_id, curriculum);
        backend
    }

    /// Makes the next `n` saves (final or draft) fail with a transport error.
    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.set(n);
    }

    /// Makes the next `n` uploads fail with a transport error.
    pub fn fail_next_uploads(&self, n: usize) {
        self.failing_uploads.set(n);
    }

    /// Answers every call as if the access token had expired.
    pub fn reject_token(&self, rejected: bool) {
        self.rejected_token.set(rejected);
    }

    pub fn saved(&self, course_id: &CourseId) -> Option<Curriculum> {
        self.curricula.borrow().get(course_id).cloned()
    }

    pub fn draft(&self, course_id: &CourseId) -> Option<Curriculum> {
        self.drafts.borrow().get(course_id).cloned()
    }

    /// Successful uploads so far, as `(kind, file name)`.
    pub fn uploads(&self) -> Vec<(AssetKind, String)> {
        self.uploads.borrow().clone()
    }

    fn check_token(&self) -> Result<(), SyncError> {
        if self.rejected_token.get() {
            return Err(SyncError::Unauthorized { status: 401 });
        }
        Ok(())
    }

    fn take_failure(counter: &Cell<usize>, what: &str) -> Result<(), SyncError> {
        let left = counter.get();
        if left > 0 {
            counter.set(left - 1);
            return Err(SyncError::Transport(format!("{what}: connection reset")));
        }
        Ok(())
    }
}

impl CurriculumBackend for MemoryBackend {
    fn fetch(&self, course_id: &CourseId) -> Result<Option<Curriculum>, SyncError> {
        self.check_token()?;
        Ok(self.curricula.borrow().get(course_id).cloned())
    }

    fn replace(&self, course_id: &CourseId, curriculum: &Curriculum) -> Result<(), SyncError> {
        self.check_token()?;
        Self::take_failure(&self.failing_saves, "save")?;
        self.curricula
            .borrow_mut()
            .insert(course_id.clone(), curriculum.clone());
        Ok(())
    }

    fn replace_draft(
        &self,
        course_id: &CourseId,
        curriculum: &Curriculum,
    ) -> Result<(), SyncError> {
        self.check_token()?;
        Self::take_failure(&self.failing_saves, "save draft")?;
        self.drafts
            .borrow_mut()
            .insert(course_id.clone(), curriculum.clone());
        Ok(())
    }

    fn upload(&self, kind: AssetKind, asset: &LocalAsset) -> Result<HostedAsset, SyncError> {
        self.check_token()?;
        Self::take_failure(&self.failing_uploads, "upload")?;

        let mut uploads = self.uploads.borrow_mut();
        uploads.push((kind, asset.file_name.clone()));
        let hosted_url = match kind {
            AssetKind::Video => format!("https://vimeo.com/{}", 100_000 + uploads.len()),
            AssetKind::File => format!("https://files.local/{}/{}", uploads.len(), asset.file_name),
        };
        Ok(HostedAsset { hosted_url })
    }
}
