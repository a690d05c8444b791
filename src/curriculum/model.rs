use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts either a JSON string or a JSON integer, since saved curricula may
/// come back with numeric ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde(deserialize_with = "string_or_number")] String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Fresh client-side id, unique for the lifetime of the editor.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type!(
    /// Course identifier, owned by the backend.
    CourseId
);
id_type!(SectionId);
id_type!(LectureId);
id_type!(ContentId);

/// Full curriculum of one course, in wire shape: `{ "sections": [...] }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    #[serde(default)]
    pub title: String,

    /// 1-based, contiguous across the curriculum
    pub order: u32,

    #[serde(default)]
    pub lectures: Vec<Lecture>,

    /// content attached to the section itself: videos, quizzes, articles
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

impl Section {
    pub(crate) fn blank(order: u32) -> Self {
        Self {
            id: SectionId::generate(),
            title: String::new(),
            order,
            lectures: Vec::new(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub title: String,
    pub order: u32,

    /// resources attached to the lecture: files and links
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: u32,

    /// video length ("00:00") or quiz points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(flatten)]
    pub body: ContentBody,
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        self.body.kind()
    }
}

/// Variant payload, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentBody {
    LectureVideo {
        video_url: String,
    },
    Quiz {
        /// id handed back by the quiz authoring flow, once it exists
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quiz_ref: Option<String>,
    },
    Article {
        body: String,
    },
    FileAttachment {
        file_url: String,
        file_name: String,
    },
    ExternalLink {
        url: String,
    },
}

impl ContentBody {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentBody::LectureVideo { .. } => ContentKind::LectureVideo,
            ContentBody::Quiz { .. } => ContentKind::Quiz,
            ContentBody::Article { .. } => ContentKind::Article,
            ContentBody::FileAttachment { .. } => ContentKind::FileAttachment,
            ContentBody::ExternalLink { .. } => ContentKind::ExternalLink,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    LectureVideo,
    Quiz,
    Article,
    FileAttachment,
    ExternalLink,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::LectureVideo => "lecture-video",
            ContentKind::Quiz => "quiz",
            ContentKind::Article => "article",
            ContentKind::FileAttachment => "file-attachment",
            ContentKind::ExternalLink => "external-link",
        }
    }

    /// Human label used in the content-type picker.
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::LectureVideo => "Lecture",
            ContentKind::Quiz => "Quiz",
            ContentKind::Article => "Article",
            ContentKind::FileAttachment => "Downloadable File",
            ContentKind::ExternalLink => "External Resource",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a content item hangs in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachPoint {
    Section,
    Lecture,
}

impl fmt::Display for AttachPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachPoint::Section => f.write_str("section"),
            AttachPoint::Lecture => f.write_str("lecture"),
        }
    }
}

const SECTION_KINDS: &[ContentKind] = &[
    ContentKind::LectureVideo,
    ContentKind::Quiz,
    ContentKind::Article,
];
const LECTURE_KINDS: &[ContentKind] = &[ContentKind::FileAttachment, ContentKind::ExternalLink];

pub fn allowed_kinds(attach: AttachPoint) -> &'static [ContentKind] {
    match attach {
        AttachPoint::Section => SECTION_KINDS,
        AttachPoint::Lecture => LECTURE_KINDS,
    }
}
