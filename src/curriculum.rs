mod api;
mod editor;
mod error;
mod files;
mod gateway;
mod memory;
mod modal;
mod model;
mod outline;
mod store;

pub use api::{HttpBackend, DEFAULT_BASE_URL};
pub use editor::{ContentDraft, ContentInput, CurriculumEditor};
pub use error::{ModalError, SyncError, ValidationError};
pub use files::{read_curriculum, write_curriculum};
pub use gateway::{AssetKind, CurriculumBackend, HostedAsset, LocalAsset, SyncGateway};
pub use memory::MemoryBackend;
pub use modal::{Modal, ModalController, Target};
pub use model::{
    allowed_kinds, AttachPoint, ContentBody, ContentId, ContentItem, ContentKind, CourseId,
    Curriculum, Lecture, LectureId, Section, SectionId,
};
pub use outline::render as render_outline;
pub use store::{ContentPatch, NewContent};
