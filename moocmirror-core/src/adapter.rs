use crate::courseware::{self, CourseEntry, Lesson, Outline};
use crate::naming;
use async_trait::async_trait;
use moocmirror_scanner::artifact::write_atomically;
use moocmirror_scanner::error::Result;
use moocmirror_scanner::{
    AdapterError, ArtifactRequest, ChildLink, CrawlContext, Headers, Node, ScanError, SiteAdapter,
    VisitOutcome,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

/// Headers sent when no header file is configured: a desktop Firefox.
pub fn default_headers() -> Headers {
    Headers::new()
        .with(
            "User-Agent",
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        )
        .with(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .with("Accept-Language", "fr-FR,fr;q=0.8,en-US;q=0.5,en;q=0.3")
}

#[derive(Debug)]
pub enum CoursePage {
    Outline(Outline),
    Lesson(Lesson),
}

/// Adapter for the FUN MOOC layout: the root is the course outline and every
/// child is a lesson page. Lessons have no children.
pub struct FunMoocAdapter {
    output_dir: PathBuf,
}

impl FunMoocAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    async fn export_metadata(&self, outline: &Outline) -> Result<()> {
        let metadata_error = |path: PathBuf| move |source| ScanError::Metadata { path, source };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(metadata_error(self.output_dir.clone()))?;

        let toc_path = self.output_dir.join(naming::TOC_FILE);
        write_json(&toc_path, &outline.table_of_contents())
            .await
            .map_err(metadata_error(toc_path.clone()))?;
        info!("Wrote {}", toc_path.display());

        let courses_path = self.output_dir.join(naming::COURSES_FILE);
        write_json(&courses_path, &outline.course_index())
            .await
            .map_err(metadata_error(courses_path.clone()))?;
        info!("Wrote {}", courses_path.display());

        Ok(())
    }

    async fn mirror_lesson(
        &self,
        node: &Node<CoursePage, CourseEntry>,
        lesson: &Lesson,
        ctx: &CrawlContext,
    ) -> Result<VisitOutcome> {
        let entry = node
            .meta()
            .ok_or_else(|| AdapterError::MissingMetadata(node.url().to_string()))?;

        if !ctx.is_dry_run() {
            let html_path = naming::lesson_html_path(&self.output_dir, &entry.chap_name, &entry.title);
            match write_atomically(&html_path, node.body()).await {
                Ok(()) => info!("Wrote {}", html_path.display()),
                Err(e) => warn!("Failed to write {}: {}", html_path.display(), e),
            }
        }

        let mut outcome = VisitOutcome::new();
        for request in self.artifact_requests(entry, lesson) {
            let result = ctx.download_artifact(&request).await;
            outcome.record(request, result);
        }
        Ok(outcome)
    }

    /// Videos first, under their HD anchor number, then documents under their own name.
    pub fn artifact_requests(&self, entry: &CourseEntry, lesson: &Lesson) -> Vec<ArtifactRequest> {
        let videos = lesson.videos.iter().map(|video| {
            ArtifactRequest::new(
                video.url.clone(),
                naming::video_path(&self.output_dir, &entry.chap_name, &entry.title, video.number),
            )
        });

        let documents = lesson.documents.iter().filter_map(|url| {
            match naming::document_path(&self.output_dir, &entry.chap_name, url) {
                Some(destination) => Some(ArtifactRequest::new(url.clone(), destination)),
                None => {
                    warn!("No file name in {}, skipping", url);
                    None
                }
            }
        });

        videos.chain(documents).collect()
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).map_err(std::io::Error::other)?;
    buf.push(b'\n');
    tokio::fs::write(path, buf).await
}

#[async_trait]
impl SiteAdapter for FunMoocAdapter {
    type Page = CoursePage;
    type Meta = CourseEntry;

    fn parse(&self, url: &str, depth: usize, body: &[u8]) -> std::result::Result<CoursePage, AdapterError> {
        let page_url = Url::parse(url).map_err(|_| AdapterError::InvalidUrl(url.to_string()))?;
        let html = String::from_utf8_lossy(body);

        if depth == 0 {
            courseware::parse_outline(&html, &page_url).map(CoursePage::Outline)
        } else {
            courseware::parse_lesson(&html, &page_url).map(CoursePage::Lesson)
        }
    }

    fn children(&self, _node: &Node<CoursePage, CourseEntry>, page: &CoursePage) -> Vec<ChildLink<CourseEntry>> {
        match page {
            CoursePage::Outline(outline) => outline
                .courses()
                .map(|(course, entry)| ChildLink::new(course.url.clone(), entry))
                .collect(),
            CoursePage::Lesson(_) => Vec::new(),
        }
    }

    async fn visit(&self, node: &Node<CoursePage, CourseEntry>, ctx: &CrawlContext) -> Result<VisitOutcome> {
        match node.page() {
            None => {
                info!("Skipping {}: nothing to process", node.url());
                Ok(VisitOutcome::new())
            }
            Some(CoursePage::Outline(outline)) => {
                info!("Visiting the root node...");
                self.export_metadata(outline).await?;
                Ok(VisitOutcome::new())
            }
            Some(CoursePage::Lesson(lesson)) => self.mirror_lesson(node, lesson, ctx).await,
        }
    }
}
