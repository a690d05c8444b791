//! Which authoring dialog is open, and what it is attached to.
//!
//! Only one dialog exists at a time. Opening a dialog replaces whatever was
//! open before, including any unsaved form input.

use tracing::debug;

use super::error::ModalError;
use super::model::{allowed_kinds, AttachPoint, ContentKind, LectureId, SectionId};

/// Tree location a content dialog adds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub section_id: SectionId,
    pub lecture_id: Option<LectureId>,
}

impl Target {
    pub fn attach_point(&self) -> AttachPoint {
        match self.lecture_id {
            Some(_) => AttachPoint::Lecture,
            None => AttachPoint::Section,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    Closed,
    AddingSection {
        after_index: Option<usize>,
    },
    AddingLecture {
        section_id: SectionId,
    },
    ChoosingContentType {
        target: Target,
    },
    EditingContent {
        target: Target,
        kind: ContentKind,
    },
}

impl Modal {
    fn name(&self) -> &'static str {
        match self {
            Modal::Closed => "closed",
            Modal::AddingSection { .. } => "adding-section",
            Modal::AddingLecture { .. } => "adding-lecture",
            Modal::ChoosingContentType { .. } => "choosing-content-type",
            Modal::EditingContent { .. } => "editing-content",
        }
    }
}

#[derive(Debug, Default)]
pub struct ModalController {
    state: Modal,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Modal {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != Modal::Closed
    }

    /// Options for the content-type picker, empty unless it is showing.
    pub fn options(&self) -> &'static [ContentKind] {
        match &self.state {
            Modal::ChoosingContentType { target } => allowed_kinds(target.attach_point()),
            _ => &[],
        }
    }

    pub fn open_add_section(&mut self, after_index: Option<usize>) {
        self.set(Modal::AddingSection { after_index });
    }

    pub fn open_add_lecture(&mut self, section_id: SectionId) {
        self.set(Modal::AddingLecture { section_id });
    }

    /// "Add Content" on a section.
    pub fn open_add_content(&mut self, section_id: SectionId) {
        self.set(Modal::ChoosingContentType {
            target: Target {
                section_id,
                lecture_id: None,
            },
        });
    }

    /// "Add Resources" on a lecture.
    pub fn open_add_resources(&mut self, section_id: SectionId, lecture_id: LectureId) {
        self.set(Modal::ChoosingContentType {
            target: Target {
                section_id,
                lecture_id: Some(lecture_id),
            },
        });
    }

    pub fn choose(&mut self, kind: ContentKind) -> Result<(), ModalError> {
        let target = match &self.state {
            Modal::ChoosingContentType { target } => target.clone(),
            _ => return Err(ModalError::NotChoosing),
        };

        let attach = target.attach_point();
        if !allowed_kinds(attach).contains(&kind) {
            return Err(ModalError::KindNotOffered { kind, attach });
        }

        self.set(Modal::EditingContent { target, kind });
        Ok(())
    }

    /// Target and kind of the open content form.
    pub fn editing(&self) -> Result<(&Target, ContentKind), ModalError> {
        match &self.state {
            Modal::EditingContent { target, kind } => Ok((target, *kind)),
            _ => Err(ModalError::NotEditing),
        }
    }

    pub fn close(&mut self) {
        self.set(Modal::Closed);
    }

    fn set(&mut self, next: Modal) {
        if self.state != Modal::Closed && next != Modal::Closed {
            debug!(from = self.state.name(), to = next.name(), "modal replaced");
        } else {
            debug!(from = self.state.name(), to = next.name(), "modal transition");
        }
        self.state = next;
    }
}
