use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::model::{ContentBody, ContentItem, CourseId, Curriculum};

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Frontmatter<'a> {
    Course(&'a str),
    Count(usize),
    Sections(Vec<SectionMeta<'a>>),
}

#[derive(Serialize, Debug)]
struct SectionMeta<'a> {
    title: &'a str,
    slug: String,
    order: u32,
    lectures: usize,
    items: usize,
}

fn vimeo_id(url: &str) -> Option<&str> {
    static VIMEO: OnceLock<Regex> = OnceLock::new();
    let re = VIMEO.get_or_init(|| {
        Regex::new(r"vimeo\.com/(?:video/|videos/)?(\d+)").expect("static regex compiles")
    });
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Title as a single Markdown line: whitespace runs collapse to one space
/// and inline syntax is backslash-escaped.
fn inline(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for (i, word) in title.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for c in word.chars() {
            if matches!(c, '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '<' | '>' | '#') {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out
}

fn render_item(item: &ContentItem, out: &mut String) {
    let label = item.kind().label();
    let title = inline(&item.title);
    let line = match &item.body {
        ContentBody::LectureVideo { video_url } => match vimeo_id(video_url) {
            Some(id) => format!(
                "- {label}: {title}\n\n  <i-vimeo videoid=\"{id}\" width=\"100%\"></i-vimeo>\n"
            ),
            None => format!("- {label}: [{title}]({video_url})\n"),
        },
        ContentBody::FileAttachment { file_url, file_name } => {
            format!("- {label}: [{title}]({file_url}) ({})\n", inline(file_name))
        }
        ContentBody::ExternalLink { url } => format!("- {label}: [{title}]({url})\n"),
        ContentBody::Quiz { .. } | ContentBody::Article { .. } => {
            format!("- {label}: {title}\n")
        }
    };
    out.push_str(&line);
}

/// Markdown outline with YAML front matter: one `##` per section, one `###`
/// per lecture, one bullet per content item.
pub fn render(course_id: &CourseId, curriculum: &Curriculum) -> anyhow::Result<String> {
    let mut slugger = github_slugger::Slugger::default();
    let mut sections = Vec::with_capacity(curriculum.sections.len());
    let mut body = String::with_capacity(200 * curriculum.sections.len());

    for section in &curriculum.sections {
        let title = if section.title.trim().is_empty() {
            "Untitled section"
        } else {
            section.title.as_str()
        };
        let slug = slugger.slug(title);

        body.push_str(&format!(
            "## {}. {} {{#{}}}\n\n",
            section.order,
            inline(title),
            slug
        ));
        for item in &section.items {
            render_item(item, &mut body);
        }
        for lecture in &section.lectures {
            body.push_str(&format!("\n### {}\n\n", inline(&lecture.title)));
            for item in &lecture.content {
                render_item(item, &mut body);
            }
        }
        body.push('\n');

        sections.push(SectionMeta {
            title,
            slug,
            order: section.order,
            lectures: section.lectures.len(),
            items: section.items.len()
                + section.lectures.iter().map(|l| l.content.len()).sum::<usize>(),
        });
    }

    let mut fm: BTreeMap<&str, Frontmatter> = BTreeMap::new();
    fm.insert("course", Frontmatter::Course(course_id.as_str()));
    fm.insert("total_items", Frontmatter::Count(curriculum.item_count()));
    fm.insert("sections", Frontmatter::Sections(sections));

    Ok(format!(
        r#"---
{}---

{}"#,
        serde_yaml_ng::to_string(&fm)?,
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::store::NewContent;

    #[test]
    fn extracts_vimeo_ids() {
        assert_eq!(vimeo_id("https://vimeo.com/123456"), Some("123456"));
        assert_eq!(vimeo_id("https://player.vimeo.com/video/987"), Some("987"));
        assert_eq!(vimeo_id("https://example.com/clip.mp4"), None);
    }

    #[test]
    fn outline_lists_sections_and_content() {
        let tree = Curriculum::empty();
        let first = tree.sections[0].id.clone();
        let tree = tree.rename_section(&first, "Getting Started").unwrap();
        let (tree, _) = tree
            .add_content_item(
                &first,
                None,
                NewContent {
                    title: "Welcome".into(),
                    description: String::new(),
                    duration: Some("03:10".into()),
                    body: ContentBody::LectureVideo {
                        video_url: "https://vimeo.com/42".into(),
                    },
                },
            )
            .unwrap();
        let (tree, _) = tree.add_lecture(&first, "Setup").unwrap();
        let (tree, _) = tree.add_section(None);

        let out = render(&CourseId::new("5"), &tree).unwrap();

        assert!(out.starts_with("---\n"));
        assert!(out.contains("total_items: 1"));
        assert!(out.contains("slug: getting-started"));
        assert!(out.contains("## 1. Getting Started {#getting-started}"));
        assert!(out.contains("<i-vimeo videoid=\"42\""));
        assert!(out.contains("### Setup"));
        assert!(out.contains("## 2. Untitled section {#untitled-section}"));
    }

    #[test]
    fn heading_syntax_in_titles_is_escaped() {
        assert_eq!(inline("Intro {#bad}\nnext  line"), "Intro \\{\\#bad\\} next line");

        let tree = Curriculum::empty();
        let first = tree.sections[0].id.clone();
        let tree = tree.rename_section(&first, "Intro {#bad}\nnext").unwrap();
        let (tree, _) = tree.add_lecture(&first, "Part *one*\r\n## two").unwrap();

        let out = render(&CourseId::new("5"), &tree).unwrap();
        let body = out.splitn(3, "---\n").nth(2).unwrap();

        assert!(body.contains("## 1. Intro \\{\\#bad\\} next {#"));
        assert!(body.contains("### Part \\*one\\* \\#\\# two\n"));
        assert!(!body.lines().any(|line| line.starts_with("next")));
        assert!(!body.lines().any(|line| line.starts_with("## two")));
    }
}
