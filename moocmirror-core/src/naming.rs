// On-disk naming of everything the mirror writes

use std::path::{Path, PathBuf};
use url::Url;

pub const TOC_FILE: &str = "toc.json";
pub const COURSES_FILE: &str = "courses.json";

const FALLBACK_NAME: &str = "untitled";

/// Lowercase, spaces to underscores, drop anything outside `[a-z0-9_]`,
/// then collapse `__` pairs.
pub fn slugify(text: &str) -> String {
    let slug: String = text
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();
    slug.replace("__", "_")
}

/// Like [`slugify`], but never empty, so it can name a file or directory.
pub fn path_component(text: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() || slug == "_" {
        FALLBACK_NAME.to_string()
    } else {
        slug
    }
}

pub fn chapter_dir(output_dir: &Path, chap_name: &str) -> PathBuf {
    output_dir.join(chap_name)
}

pub fn lesson_html_path(output_dir: &Path, chap_name: &str, title: &str) -> PathBuf {
    chapter_dir(output_dir, chap_name).join(format!("{}.html", title))
}

/// `number` starts at 1 for the first HD video of a lesson.
pub fn video_path(output_dir: &Path, chap_name: &str, title: &str, number: usize) -> PathBuf {
    chapter_dir(output_dir, chap_name).join(format!("{}_video_{}.mp4", title, number))
}

/// Documents keep the last segment of their URL path.
pub fn document_path(output_dir: &Path, chap_name: &str, url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    let name = parsed.path_segments()?.next_back()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(chapter_dir(output_dir, chap_name).join(name))
}
