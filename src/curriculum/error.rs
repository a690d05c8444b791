use thiserror::Error;

use super::model::{AttachPoint, ContentId, ContentKind, LectureId, SectionId};

/// Local rejection of an edit. Never leaves the tree half-changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} title must not be blank")]
    BlankTitle(&'static str),

    #[error("link URL must not be blank")]
    BlankUrl,

    #[error("no section with id {0}")]
    UnknownSection(SectionId),

    #[error("no lecture with id {0}")]
    UnknownLecture(LectureId),

    #[error("no content item with id {0}")]
    UnknownContent(ContentId),

    #[error("{kind} content cannot be attached to a {attach}")]
    KindNotAllowed { kind: ContentKind, attach: AttachPoint },

    #[error("a curriculum must keep at least one section")]
    LastSection,
}

/// Failure talking to the curriculum backend or a media host.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend rejected the access token (status {status})")]
    Unauthorized { status: u16 },

    #[error("Server returned an error: {status}")]
    Server { status: u16 },

    #[error("Asset cannot be uploaded: {0}")]
    InvalidAsset(String),
}

impl SyncError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Unauthorized { .. })
    }

    /// Error for a non-2xx response.
    pub(crate) fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => SyncError::Unauthorized { status },
            _ => SyncError::Server { status },
        }
    }
}

impl From<ureq::Error> for SyncError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, _) => SyncError::from_status(status),
            other => SyncError::Transport(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => SyncError::from_status(status.as_u16()),
            None => SyncError::Transport(e.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    #[error("no content-type picker is open")]
    NotChoosing,

    #[error("no content form is open")]
    NotEditing,

    #[error("no title form is open")]
    NoTitleForm,

    #[error("{kind} is not offered for a {attach}")]
    KindNotOffered { kind: ContentKind, attach: AttachPoint },

    #[error("form expects {expected} content, got {got}")]
    DraftMismatch { expected: ContentKind, got: ContentKind },
}
