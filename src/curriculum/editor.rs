//! The curriculum step of the wizard: tree store, dialogs and sync wired
//! together behind user-level actions.
//!
//! Nothing here panics or returns a hard error for bad input or a failed
//! request. Validation and network failures become [`Notice`]s and the tree
//! stays exactly as it was. Only misuse of the dialog sequence (saving a
//! form that is not open) is reported as a [`ModalError`].

use std::collections::HashSet;

use tracing::{info, warn};

use super::error::{ModalError, SyncError, ValidationError};
use super::gateway::{AssetKind, CurriculumBackend, LocalAsset, SyncGateway};
use super::modal::{Modal, ModalController, Target};
use super::model::{ContentBody, ContentId, ContentKind, CourseId, Curriculum, LectureId, SectionId};
use super::store::{require_title, ContentPatch, NewContent};
use crate::notice::Notice;
use crate::wizard::{Navigation, WizardSession, WizardStep};

/// Kind-specific form input, before any upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentInput {
    Video {
        asset: LocalAsset,
        duration: Option<String>,
    },
    Quiz {
        points: Option<String>,
    },
    Article {
        body: String,
    },
    File {
        asset: LocalAsset,
    },
    Link {
        url: String,
    },
}

impl ContentInput {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentInput::Video { .. } => ContentKind::LectureVideo,
            ContentInput::Quiz { .. } => ContentKind::Quiz,
            ContentInput::Article { .. } => ContentKind::Article,
            ContentInput::File { .. } => ContentKind::FileAttachment,
            ContentInput::Link { .. } => ContentKind::ExternalLink,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDraft {
    pub title: String,
    pub description: String,
    pub input: ContentInput,
}

pub struct CurriculumEditor<B> {
    gateway: SyncGateway<B>,
    course_id: CourseId,
    session: Option<WizardSession>,
    tree: Curriculum,
    modal: ModalController,
    expanded: HashSet<SectionId>,
    notices: Vec<Notice>,
}

impl<B: CurriculumBackend> CurriculumEditor<B> {
    /// Loads the course's curriculum. A failed load still yields a usable
    /// editor on the default tree, plus an error notice.
    pub fn open(gateway: SyncGateway<B>, session: WizardSession) -> (Self, Navigation) {
        let course_id = session.course_id().clone();
        let mut notices = Vec::new();
        let mut navigation = Navigation::Stay;

        let tree = match gateway.load(&course_id) {
            Ok(tree) => tree,
            Err(e) => {
                navigation = Self::failure(&mut notices, "Failed to fetch curriculum", &e);
                Curriculum::empty()
            }
        };

        let mut session = session;
        session.go_to(WizardStep::Curriculum);

        let editor = Self {
            gateway,
            course_id,
            session: Some(session),
            expanded: tree.sections.iter().map(|s| s.id.clone()).collect(),
            tree,
            modal: ModalController::new(),
            notices,
        };
        (editor, navigation)
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn session(&self) -> Option<&WizardSession> {
        self.session.as_ref()
    }

    /// Current snapshot, as it would be saved.
    pub fn curriculum(&self) -> &Curriculum {
        &self.tree
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_expanded(&self, id: &SectionId) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle_section(&mut self, id: &SectionId) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
    }

    pub fn add_section(&mut self, after_index: Option<usize>) -> SectionId {
        let (next, id) = self.tree.add_section(after_index);
        self.tree = next;
        self.expanded.insert(id.clone());
        id
    }

    pub fn add_lecture(&mut self, section_id: &SectionId, title: &str) -> Option<LectureId> {
        let result = self.tree.add_lecture(section_id, title);
        self.apply_with_id(result)
    }

    pub fn rename_section(&mut self, id: &SectionId, title: &str) -> bool {
        let result = self.tree.rename_section(id, title);
        self.apply(result)
    }

    pub fn rename_lecture(&mut self, id: &LectureId, title: &str) -> bool {
        let result = self.tree.rename_lecture(id, title);
        self.apply(result)
    }

    pub fn update_content_item(&mut self, id: &ContentId, patch: ContentPatch) -> bool {
        let result = self.tree.update_content_item(id, patch);
        self.apply(result)
    }

    pub fn remove_section(&mut self, id: &SectionId) -> bool {
        let result = self.tree.remove_section(id);
        let removed = self.apply(result);
        if removed {
            self.expanded.remove(id);
        }
        removed
    }

    pub fn remove_lecture(&mut self, id: &LectureId) -> bool {
        let result = self.tree.remove_lecture(id);
        self.apply(result)
    }

    pub fn remove_content_item(&mut self, id: &ContentId) -> bool {
        let result = self.tree.remove_content_item(id);
        self.apply(result)
    }

    pub fn begin_add_section(&mut self, after_index: Option<usize>) {
        self.modal.open_add_section(after_index);
    }

    pub fn begin_add_lecture(&mut self, section_id: SectionId) {
        self.modal.open_add_lecture(section_id);
    }

    /// Submits the open section or lecture title form. Returns `Ok(false)`
    /// when the title was rejected; the form then stays open.
    pub fn submit_title(&mut self, title: &str) -> Result<bool, ModalError> {
        match self.modal.state().clone() {
            Modal::AddingSection { after_index } => {
                let (next, id) = self.tree.add_named_section(after_index, title);
                self.tree = next;
                self.expanded.insert(id);
            }
            Modal::AddingLecture { section_id } => {
                if self.add_lecture(&section_id, title).is_none() {
                    return Ok(false);
                }
            }
            _ => return Err(ModalError::NoTitleForm),
        }

        self.modal.close();
        Ok(true)
    }

    /// "Add Content" on a section: lecture, quiz or article.
    pub fn begin_add_content(&mut self, section_id: SectionId) {
        self.modal.open_add_content(section_id);
    }

    /// "Add Resources" on a lecture: downloadable file or external link.
    pub fn begin_add_resources(&mut self, section_id: SectionId, lecture_id: LectureId) {
        self.modal.open_add_resources(section_id, lecture_id);
    }

    pub fn choose_content_type(&mut self, kind: ContentKind) -> Result<(), ModalError> {
        self.modal.choose(kind)
    }

    pub fn cancel(&mut self) {
        self.modal.close();
    }

    /// Saves the open content form. Video and file drafts are uploaded first;
    /// the tree only changes once the upload has succeeded. On any failure
    /// the form stays open with the author's input intact, except when its
    /// section or lecture has been removed meanwhile: that form is closed.
    pub fn save_content(&mut self, draft: ContentDraft) -> Result<Navigation, ModalError> {
        let (target, kind) = self.modal.editing()?;
        let target = target.clone();
        if draft.input.kind() != kind {
            return Err(ModalError::DraftMismatch {
                expected: kind,
                got: draft.input.kind(),
            });
        }

        if let Err(e) = self.check_target(&target) {
            self.modal.close();
            self.reject(e);
            return Ok(Navigation::Stay);
        }
        if let Err(e) = require_title(kind.label(), &draft.title) {
            self.reject(e);
            return Ok(Navigation::Stay);
        }
        if let ContentInput::Link { url } = &draft.input {
            if url.trim().is_empty() {
                self.reject(ValidationError::BlankUrl);
                return Ok(Navigation::Stay);
            }
        }

        let (duration, body) = match draft.input {
            ContentInput::Video { asset, duration } => {
                let hosted = match self.gateway.upload_asset(AssetKind::Video, &asset) {
                    Ok(hosted) => hosted,
                    Err(e) => return Ok(self.upload_failed(&e)),
                };
                (
                    Some(duration.unwrap_or_else(|| "00:00".to_string())),
                    ContentBody::LectureVideo {
                        video_url: hosted.hosted_url,
                    },
                )
            }
            ContentInput::File { asset } => {
                let hosted = match self.gateway.upload_asset(AssetKind::File, &asset) {
                    Ok(hosted) => hosted,
                    Err(e) => return Ok(self.upload_failed(&e)),
                };
                (
                    None,
                    ContentBody::FileAttachment {
                        file_url: hosted.hosted_url,
                        file_name: asset.file_name,
                    },
                )
            }
            ContentInput::Quiz { points } => (
                Some(points.unwrap_or_else(|| "0".to_string())),
                ContentBody::Quiz { quiz_ref: None },
            ),
            ContentInput::Article { body } => (None, ContentBody::Article { body }),
            ContentInput::Link { url } => (
                None,
                ContentBody::ExternalLink {
                    url: url.trim().to_string(),
                },
            ),
        };

        let content = NewContent {
            title: draft.title,
            description: draft.description,
            duration,
            body,
        };
        let result = self.tree.add_content_item(
            &target.section_id,
            target.lecture_id.as_ref(),
            content,
        );
        let Some(content_id) = self.apply_with_id(result) else {
            return Ok(Navigation::Stay);
        };

        self.modal.close();
        self.notices
            .push(Notice::success(format!("{} added", kind.label())));

        if kind == ContentKind::Quiz {
            self.notices
                .push(Notice::info("Continue in the quiz editor to add questions"));
            return Ok(Navigation::QuizAuthoring {
                course_id: self.course_id.clone(),
                section_id: target.section_id,
                content_id,
            });
        }
        Ok(Navigation::Stay)
    }

    /// "Save & Continue": replaces the saved curriculum and moves on to
    /// pricing.
    pub fn save(&mut self) -> Navigation {
        match self.gateway.save_final(&self.course_id, &self.tree) {
            Ok(()) => {
                self.notices
                    .push(Notice::success("Curriculum saved successfully!"));
                let next = match self.session.as_mut() {
                    Some(session) => session.complete(WizardStep::Curriculum),
                    None => WizardStep::Pricing,
                };
                info!(course = %self.course_id, next = next.slug(), "curriculum step complete");
                Navigation::Step(next)
            }
            Err(e) => Self::failure(&mut self.notices, "Failed to save curriculum", &e),
        }
    }

    /// "Save as Draft": replaces the saved draft and leaves the wizard.
    pub fn save_draft(&mut self) -> Navigation {
        match self.gateway.save_draft(&self.course_id, &self.tree) {
            Ok(()) => {
                self.notices.push(Notice::success("Curriculum saved as draft!"));
                if let Some(session) = self.session.take() {
                    session.exit();
                }
                Navigation::CourseList
            }
            Err(e) => Self::failure(&mut self.notices, "Failed to save draft", &e),
        }
    }

    fn check_target(&self, target: &Target) -> Result<(), ValidationError> {
        match &target.lecture_id {
            Some(lecture_id) => match self.tree.lecture(lecture_id) {
                Some((section, _)) if section.id == target.section_id => Ok(()),
                _ => Err(ValidationError::UnknownLecture(lecture_id.clone())),
            },
            None => match self.tree.section(&target.section_id) {
                Some(_) => Ok(()),
                None => Err(ValidationError::UnknownSection(target.section_id.clone())),
            },
        }
    }

    fn upload_failed(&mut self, e: &SyncError) -> Navigation {
        Self::failure(&mut self.notices, "Upload failed", e)
    }

    fn failure(notices: &mut Vec<Notice>, what: &str, e: &SyncError) -> Navigation {
        if e.is_auth() {
            notices.push(Notice::error("Your session has expired. Please log in again."));
            return Navigation::Login;
        }
        notices.push(Notice::error(format!("{what}: {e}")));
        Navigation::Stay
    }

    fn reject(&mut self, e: ValidationError) -> bool {
        warn!(course = %self.course_id, error = %e, "edit rejected");
        self.notices.push(Notice::error(e.to_string()));
        false
    }

    fn apply(&mut self, result: Result<Curriculum, ValidationError>) -> bool {
        match result {
            Ok(next) => {
                self.tree = next;
                true
            }
            Err(e) => self.reject(e),
        }
    }

    fn apply_with_id<T>(&mut self, result: Result<(Curriculum, T), ValidationError>) -> Option<T> {
        match result {
            Ok((next, id)) => {
                self.tree = next;
                Some(id)
            }
            Err(e) => {
                self.reject(e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::memory::MemoryBackend;

    fn editor(backend: &MemoryBackend) -> CurriculumEditor<&MemoryBackend> {
        let session = WizardSession::begin(CourseId::new("42"));
        let (editor, navigation) = CurriculumEditor::open(SyncGateway::new(backend), session);
        assert_eq!(navigation, Navigation::Stay);
        editor
    }

    #[test]
    fn blank_lecture_title_notifies_without_change() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        let section = editor.curriculum().sections[0].id.clone();

        assert!(editor.add_lecture(&section, "").is_none());
        assert!(editor.curriculum().sections[0].lectures.is_empty());
        assert!(editor.notices()[0].is_error());
    }

    #[test]
    fn section_form_creates_titled_expanded_section() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);

        editor.begin_add_section(Some(0));
        assert!(editor.submit_title("Advanced topics").unwrap());

        let section = &editor.curriculum().sections[1];
        assert_eq!(section.title, "Advanced topics");
        assert_eq!(section.order, 2);
        assert!(editor.is_expanded(&section.id));
        assert!(!editor.modal().is_open());
    }

    #[test]
    fn lecture_form_stays_open_on_blank_title() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        let section = editor.curriculum().sections[0].id.clone();

        editor.begin_add_lecture(section.clone());
        assert!(!editor.submit_title("  ").unwrap());
        assert!(editor.modal().is_open());

        assert!(editor.submit_title("Getting started").unwrap());
        assert_eq!(editor.curriculum().sections[0].lectures.len(), 1);
    }

    #[test]
    fn submit_title_without_form_is_misuse() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        assert_eq!(
            editor.submit_title("x").unwrap_err(),
            ModalError::NoTitleForm
        );
    }

    #[test]
    fn draft_must_match_chosen_kind() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        let section = editor.curriculum().sections[0].id.clone();

        editor.begin_add_content(section);
        editor.choose_content_type(ContentKind::Article).unwrap();
        let err = editor
            .save_content(ContentDraft {
                title: "Q".into(),
                description: String::new(),
                input: ContentInput::Quiz { points: None },
            })
            .unwrap_err();

        assert_eq!(
            err,
            ModalError::DraftMismatch {
                expected: ContentKind::Article,
                got: ContentKind::Quiz,
            }
        );
    }

    #[test]
    fn quiz_hands_off_to_quiz_authoring() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        let section = editor.curriculum().sections[0].id.clone();

        editor.begin_add_content(section.clone());
        editor.choose_content_type(ContentKind::Quiz).unwrap();
        let navigation = editor
            .save_content(ContentDraft {
                title: "Checkpoint".into(),
                description: "Ten questions".into(),
                input: ContentInput::Quiz { points: None },
            })
            .unwrap();

        let item = &editor.curriculum().sections[0].items[0];
        assert_eq!(item.duration.as_deref(), Some("0"));
        assert_eq!(
            navigation,
            Navigation::QuizAuthoring {
                course_id: CourseId::new("42"),
                section_id: section,
                content_id: item.id.clone(),
            }
        );
    }

    #[test]
    fn failed_save_keeps_tree_and_stays() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        backend.fail_next_saves(1);

        let before = editor.curriculum().clone();
        assert_eq!(editor.save(), Navigation::Stay);
        assert_eq!(editor.curriculum(), &before);
        assert!(editor.take_notices().iter().any(Notice::is_error));

        assert_eq!(editor.save(), Navigation::Step(WizardStep::Pricing));
    }

    #[test]
    fn expired_token_routes_to_login() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        backend.reject_token(true);

        assert_eq!(editor.save_draft(), Navigation::Login);
        assert!(editor.session().is_some());
    }

    #[test]
    fn removed_lecture_closes_its_resource_form() {
        let backend = MemoryBackend::new();
        let mut editor = editor(&backend);
        let section = editor.curriculum().sections[0].id.clone();
        let lecture = editor.add_lecture(&section, "Basics").unwrap();

        editor.begin_add_resources(section, lecture.clone());
        editor.choose_content_type(ContentKind::FileAttachment).unwrap();
        assert!(editor.remove_lecture(&lecture));

        let navigation = editor
            .save_content(ContentDraft {
                title: "Slides".into(),
                description: String::new(),
                input: ContentInput::File {
                    asset: LocalAsset::new("slides.pdf", "application/pdf", b"%PDF".to_vec()),
                },
            })
            .unwrap();

        assert_eq!(navigation, Navigation::Stay);
        assert!(!editor.modal().is_open());
        assert!(backend.uploads().is_empty());
        assert_eq!(
            editor.notices().last().unwrap().message,
            format!("no lecture with id {lecture}")
        );
    }

    #[test]
    fn load_failure_still_opens_default_tree() {
        let backend = MemoryBackend::new();
        backend.reject_token(true);
        let session = WizardSession::begin(CourseId::new("42"));

        let (editor, navigation) = CurriculumEditor::open(SyncGateway::new(&backend), session);
        assert_eq!(navigation, Navigation::Login);
        assert_eq!(editor.curriculum().sections.len(), 1);
        assert_eq!(editor.notices().len(), 1);
    }
}
