//! Markup parsing for the course site.
//!
//! Two page shapes exist. The course outline lists chapters (`div.chapter`),
//! each holding one `li` per lesson. A lesson page carries its sequences in
//! elements whose id starts with `seq_contents_`; their text content is itself
//! escaped HTML holding the video and document anchors.

use crate::naming;
use moocmirror_scanner::AdapterError;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Anchor label of the 720p rendition of a lesson video.
pub const HD_VIDEO_LABEL: &str = "Haute définition (720p)";

pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".ppt", ".pptx", ".txt", ".odp", ".odt", ".doc", ".docx", ".dat", ".zip", ".gz", ".py",
    ".r",
];

/// Field order matches the sorted keys of the exported JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub subtitle: String,
    pub title: String,
    pub url: String,
}

/// Chapter name (as displayed) to its lessons, in page order.
pub type TableOfContents = BTreeMap<String, Vec<TocEntry>>;

/// Slugified location of a lesson in the mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub chap_name: String,
    pub title: String,
}

impl CourseEntry {
    pub fn new(chapter: &str, title: &str) -> Self {
        Self {
            chap_name: naming::path_component(chapter),
            title: naming::path_component(title),
        }
    }
}

/// Lesson URL to its slugified location.
pub type CourseIndex = BTreeMap<String, CourseEntry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub title: String,
    pub subtitle: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub name: String,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    pub chapters: Vec<Chapter>,
}

impl Outline {
    /// Every lesson in page order, with where it will be mirrored.
    pub fn courses(&self) -> impl Iterator<Item = (&Course, CourseEntry)> {
        self.chapters.iter().flat_map(|chapter| {
            chapter
                .courses
                .iter()
                .map(move |course| (course, CourseEntry::new(&chapter.name, &course.title)))
        })
    }

    pub fn table_of_contents(&self) -> TableOfContents {
        let mut toc = TableOfContents::new();
        for chapter in &self.chapters {
            toc.entry(chapter.name.clone())
                .or_default()
                .extend(chapter.courses.iter().map(|course| TocEntry {
                    subtitle: course.subtitle.clone(),
                    title: course.title.clone(),
                    url: course.url.clone(),
                }));
        }
        toc
    }

    /// A lesson listed under several chapters keeps its first location,
    /// which is where the traversal mirrors it.
    pub fn course_index(&self) -> CourseIndex {
        let mut index = CourseIndex::new();
        for (course, entry) in self.courses() {
            index.entry(course.url.clone()).or_insert(entry);
        }
        index
    }
}

/// An HD video anchor. `number` counts every HD anchor of the lesson from 1,
/// including ones whose link could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    pub number: usize,
    pub url: String,
}

/// Downloadable links of one lesson page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lesson {
    pub videos: Vec<VideoLink>,
    pub documents: Vec<String>,
}

fn selector(css: &str) -> Result<Selector, AdapterError> {
    Selector::parse(css).map_err(|e| AdapterError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href.starts_with('#') {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

fn first_text(element: ElementRef<'_>) -> String {
    element.text().next().unwrap_or_default().trim().to_string()
}

fn all_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn is_document(href: &str) -> bool {
    let href = href.to_lowercase();
    DOCUMENT_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
}

pub fn parse_outline(html: &str, page_url: &Url) -> Result<Outline, AdapterError> {
    let document = Html::parse_document(html);
    let chapter_selector = selector("div.chapter")?;
    let heading_selector = selector("h3")?;
    let heading_link_selector = selector("h3 a")?;
    let item_selector = selector("li")?;
    let anchor_selector = selector("a")?;
    let paragraph_selector = selector("p")?;
    let subtitle_selector = selector("p.subtitle")?;

    let mut chapters = Vec::new();
    for chapter_div in document.select(&chapter_selector) {
        let name = chapter_div
            .select(&heading_link_selector)
            .next()
            .or_else(|| chapter_div.select(&heading_selector).next())
            .map(all_text)
            .unwrap_or_default();

        let mut courses = Vec::new();
        for item in chapter_div.select(&item_selector) {
            let Some(anchor) = item.select(&anchor_selector).next() else {
                debug!("Skipping lesson without link in chapter '{}'", name);
                continue;
            };
            let Some(url) = anchor.value().attr("href").and_then(|href| resolve(page_url, href)) else {
                debug!("Skipping lesson with unusable link in chapter '{}'", name);
                continue;
            };

            let title = anchor
                .select(&paragraph_selector)
                .next()
                .map(first_text)
                .unwrap_or_default();
            let subtitle = anchor
                .select(&subtitle_selector)
                .last()
                .map(all_text)
                .unwrap_or_default();

            courses.push(Course {
                title,
                subtitle,
                url,
            });
        }

        chapters.push(Chapter { name, courses });
    }

    if chapters.is_empty() {
        return Err(AdapterError::MissingStructure {
            url: page_url.to_string(),
            reason: "no chapter found in course outline".to_string(),
        });
    }

    Ok(Outline { chapters })
}

pub fn parse_lesson(html: &str, page_url: &Url) -> Result<Lesson, AdapterError> {
    let document = Html::parse_document(html);
    let sequence_selector = selector(r#"[id^="seq_contents_"]"#)?;
    let anchor_selector = selector("a")?;

    let mut lesson = Lesson::default();
    let mut video_number = 0;
    for sequence in document.select(&sequence_selector) {
        debug!("Sequence {}", sequence.value().id().unwrap_or_default());

        let embedded = sequence.text().collect::<String>();
        let fragment = Html::parse_fragment(&embedded);

        for anchor in fragment.select(&anchor_selector) {
            let href = anchor.value().attr("href");

            if all_text(anchor) == HD_VIDEO_LABEL {
                video_number += 1;
                match href.and_then(|href| resolve(page_url, href)) {
                    Some(url) => lesson.videos.push(VideoLink {
                        number: video_number,
                        url,
                    }),
                    None => debug!("HD video {} has no usable link", video_number),
                }
            }

            if let Some(href) = href
                && is_document(href)
                && let Some(url) = resolve(page_url, href)
            {
                lesson.documents.push(url);
            }
        }
    }

    Ok(lesson)
}
