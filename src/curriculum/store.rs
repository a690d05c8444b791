//! Tree store: edits on a [`Curriculum`] snapshot.
//!
//! Every operation borrows the current snapshot and returns a new one, so a
//! caller holding an older snapshot never sees it change. Rejected edits
//! return a [`ValidationError`] and produce no snapshot at all.

use tracing::debug;

use super::error::ValidationError;
use super::model::{
    allowed_kinds, AttachPoint, ContentBody, ContentId, ContentItem, Curriculum, Lecture,
    LectureId, Section, SectionId,
};

/// Input for a new content item once any asset has been uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub title: String,
    pub description: String,
    pub duration: Option<String>,
    pub body: ContentBody,
}

/// Partial update of a content item; `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
}

pub(crate) fn require_title(what: &'static str, title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::BlankTitle(what));
    }
    Ok(())
}

impl Curriculum {
    /// Starting tree for a course without a saved curriculum.
    pub fn empty() -> Self {
        Self {
            sections: vec![Section::blank(1)],
        }
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Lecture together with its owning section.
    pub fn lecture(&self, id: &LectureId) -> Option<(&Section, &Lecture)> {
        self.sections.iter().find_map(|s| {
            s.lectures
                .iter()
                .find(|l| &l.id == id)
                .map(|lecture| (s, lecture))
        })
    }

    pub fn content_item(&self, id: &ContentId) -> Option<&ContentItem> {
        self.sections.iter().find_map(|s| {
            s.items.iter().find(|c| &c.id == id).or_else(|| {
                s.lectures
                    .iter()
                    .find_map(|l| l.content.iter().find(|c| &c.id == id))
            })
        })
    }

    /// Number of content items anywhere in the tree.
    pub fn item_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.items.len() + s.lectures.iter().map(|l| l.content.len()).sum::<usize>())
            .sum()
    }

    /// Inserts a blank section after `after_index` (0-based), or at the end.
    pub fn add_section(&self, after_index: Option<usize>) -> (Self, SectionId) {
        self.add_named_section(after_index, "")
    }

    /// Like [`Curriculum::add_section`], with a title. Blank is allowed.
    pub fn add_named_section(&self, after_index: Option<usize>, title: &str) -> (Self, SectionId) {
        let mut next = self.clone();
        let mut section = Section::blank(0);
        section.title = title.trim().to_string();
        let id = section.id.clone();

        let at = match after_index {
            Some(index) => index.saturating_add(1).min(next.sections.len()),
            None => next.sections.len(),
        };
        next.sections.insert(at, section);
        next.renumber_sections();

        debug!(section = %id, position = at + 1, "section added");
        (next, id)
    }

    /// Titles may be blank here: a fresh section starts untitled.
    pub fn rename_section(&self, id: &SectionId, title: &str) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        next.section_mut(id)?.title = title.to_string();
        Ok(next)
    }

    pub fn remove_section(&self, id: &SectionId) -> Result<Self, ValidationError> {
        if self.section(id).is_none() {
            return Err(ValidationError::UnknownSection(id.clone()));
        }
        if self.sections.len() == 1 {
            return Err(ValidationError::LastSection);
        }

        let mut next = self.clone();
        next.sections.retain(|s| &s.id != id);
        next.renumber_sections();

        debug!(section = %id, "section removed");
        Ok(next)
    }

    pub fn add_lecture(
        &self,
        section_id: &SectionId,
        title: &str,
    ) -> Result<(Self, LectureId), ValidationError> {
        require_title("lecture", title)?;

        let mut next = self.clone();
        let section = next.section_mut(section_id)?;
        let lecture = Lecture {
            id: LectureId::generate(),
            title: title.trim().to_string(),
            order: section.lectures.len() as u32 + 1,
            content: Vec::new(),
        };
        let id = lecture.id.clone();
        section.lectures.push(lecture);

        debug!(section = %section_id, lecture = %id, "lecture added");
        Ok((next, id))
    }

    pub fn rename_lecture(&self, id: &LectureId, title: &str) -> Result<Self, ValidationError> {
        require_title("lecture", title)?;

        let mut next = self.clone();
        next.lecture_mut(id)?.title = title.trim().to_string();
        Ok(next)
    }

    /// Leaves sibling lectures' order untouched; uploaded assets stay on
    /// their media host.
    pub fn remove_lecture(&self, id: &LectureId) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        let section = next
            .sections
            .iter_mut()
            .find(|s| s.lectures.iter().any(|l| &l.id == id))
            .ok_or_else(|| ValidationError::UnknownLecture(id.clone()))?;
        section.lectures.retain(|l| &l.id != id);

        debug!(lecture = %id, "lecture removed");
        Ok(next)
    }

    /// Appends a content item to the section itself (`lecture_id` = `None`)
    /// or to one of its lectures. The variant must be legal for that spot.
    pub fn add_content_item(
        &self,
        section_id: &SectionId,
        lecture_id: Option<&LectureId>,
        content: NewContent,
    ) -> Result<(Self, ContentId), ValidationError> {
        let kind = content.body.kind();
        let attach = match lecture_id {
            Some(_) => AttachPoint::Lecture,
            None => AttachPoint::Section,
        };

        if !allowed_kinds(attach).contains(&kind) {
            return Err(ValidationError::KindNotAllowed { kind, attach });
        }
        require_title(kind.label(), &content.title)?;
        if let ContentBody::ExternalLink { url } = &content.body {
            if url.trim().is_empty() {
                return Err(ValidationError::BlankUrl);
            }
        }

        let mut next = self.clone();
        let section = next.section_mut(section_id)?;
        let list = match lecture_id {
            None => &mut section.items,
            Some(lecture_id) => {
                &mut section
                    .lectures
                    .iter_mut()
                    .find(|l| &l.id == lecture_id)
                    .ok_or_else(|| ValidationError::UnknownLecture(lecture_id.clone()))?
                    .content
            }
        };

        let item = ContentItem {
            id: ContentId::generate(),
            title: content.title.trim().to_string(),
            description: content.description,
            order: list.len() as u32 + 1,
            duration: content.duration,
            body: content.body,
        };
        let id = item.id.clone();
        list.push(item);

        debug!(section = %section_id, kind = %kind, item = %id, "content item added");
        Ok((next, id))
    }

    pub fn update_content_item(
        &self,
        id: &ContentId,
        patch: ContentPatch,
    ) -> Result<Self, ValidationError> {
        if let Some(title) = &patch.title {
            require_title("content", title)?;
        }

        let mut next = self.clone();
        let item = next.item_mut(id)?;
        if let Some(title) = patch.title {
            item.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(duration) = patch.duration {
            item.duration = Some(duration);
        }
        Ok(next)
    }

    /// Removes the item from whichever list owns it. Siblings keep their
    /// ids and order.
    pub fn remove_content_item(&self, id: &ContentId) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        let mut removed = false;

        for section in next.sections.iter_mut() {
            let before = section.items.len();
            section.items.retain(|c| &c.id != id);
            removed |= section.items.len() != before;

            for lecture in section.lectures.iter_mut() {
                let before = lecture.content.len();
                lecture.content.retain(|c| &c.id != id);
                removed |= lecture.content.len() != before;
            }
        }

        if !removed {
            return Err(ValidationError::UnknownContent(id.clone()));
        }

        debug!(item = %id, "content item removed");
        Ok(next)
    }

    fn renumber_sections(&mut self) {
        for (index, section) in self.sections.iter_mut().enumerate() {
            section.order = index as u32 + 1;
        }
    }

    fn section_mut(&mut self, id: &SectionId) -> Result<&mut Section, ValidationError> {
        self.sections
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| ValidationError::UnknownSection(id.clone()))
    }

    fn lecture_mut(&mut self, id: &LectureId) -> Result<&mut Lecture, ValidationError> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.lectures.iter_mut())
            .find(|l| &l.id == id)
            .ok_or_else(|| ValidationError::UnknownLecture(id.clone()))
    }

    fn item_mut(&mut self, id: &ContentId) -> Result<&mut ContentItem, ValidationError> {
        self.sections
            .iter_mut()
            .flat_map(|s| {
                s.items
                    .iter_mut()
                    .chain(s.lectures.iter_mut().flat_map(|l| l.content.iter_mut()))
            })
            .find(|c| &c.id == id)
            .ok_or_else(|| ValidationError::UnknownContent(id.clone()))
    }
}
