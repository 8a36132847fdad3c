// End-to-end mirror tests against a local mock course site

use moocmirror_core::mirror::{
    MirrorOptions, ReportFormat, execute_mirror, extract_url_path, generate_json_report,
    generate_mirror_report, render_report, save_report,
};
use indicatif::{MultiProgress, ProgressDrawTarget};
use moocmirror_core::{CourseIndex, TableOfContents};
use moocmirror_scanner::{CrawlerConfig, DownloadLog, NodeStatus, ScanError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OUTLINE: &str = include_str!("fixtures/outline.html");
const LESSON_INTRO: &str = include_str!("fixtures/lesson_intro.html");
const LESSON_BASICS: &str = include_str!("fixtures/lesson_basics.html");
const LESSON_FURTHER: &str = include_str!("fixtures/lesson_further.html");

const ROOT_PATH: &str = "/courses/demo/courseware/";

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_course(server: &MockServer) {
    mount_page(server, ROOT_PATH, OUTLINE).await;
    mount_page(server, "/courses/demo/courseware/week1/intro/", LESSON_INTRO).await;
    mount_page(server, "/courses/demo/courseware/week1/basics/", LESSON_BASICS).await;
    mount_page(server, "/courses/demo/courseware/week2/further/", LESSON_FURTHER).await;
}

async fn mount_artifact(server: &MockServer, artifact: &str, body: &'static [u8], expected: u64) {
    Mock::given(method("GET"))
        .and(path(artifact))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_all_artifacts(server: &MockServer, expected: u64) {
    mount_artifact(server, "/media/intro_hd.mp4", b"intro video", expected).await;
    mount_artifact(server, "/assets/slides.pdf", b"%PDF slides", expected).await;
    mount_artifact(server, "/media/basics_hd.mp4", b"basics video", expected).await;
    mount_artifact(server, "/assets/exercises.zip", b"PK exercises", expected).await;
}

fn options(server: &MockServer, output: &Path, dry_run: bool) -> MirrorOptions {
    MirrorOptions {
        url: format!("{}{}", server.uri(), ROOT_PATH),
        output_dir: output.to_path_buf(),
        dry_run,
        config: CrawlerConfig::unpaced(),
        progress: None,
    }
}

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_ignores_query_and_fragment() {
    assert_eq!(
        extract_url_path("https://www.fun-mooc.fr/courses/x/courseware/?a=1#top"),
        "/courses/x/courseware/"
    );
}

#[test]
fn test_extract_url_path_invalid_url() {
    assert_eq!(extract_url_path("not a url"), "not a url");
}

// ============================================================================
// Mirroring
// ============================================================================

#[tokio::test]
async fn test_mirror_downloads_every_artifact() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    assert_eq!(report.records.len(), 4);
    assert!(report.failures().is_empty());
    assert_eq!(report.artifact_totals().downloaded, 4);

    let week1 = out.path().join("semaine_1");
    assert_eq!(
        std::fs::read(week1.join("introduction_video_1.mp4")).unwrap(),
        b"intro video"
    );
    assert_eq!(std::fs::read(week1.join("slides.pdf")).unwrap(), b"%PDF slides");
    assert!(week1.join("les_bases_video_1.mp4").exists());
    assert!(out.path().join("semaine_2/exercises.zip").exists());

    // Raw lesson markup is kept next to its artifacts
    let html = std::fs::read_to_string(week1.join("introduction.html")).unwrap();
    assert_eq!(html, LESSON_INTRO);
}

#[tokio::test]
async fn test_mirror_visits_root_before_lessons_in_page_order() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    let paths: Vec<String> = report
        .visited_identities()
        .iter()
        .map(|url| extract_url_path(url))
        .collect();
    assert_eq!(
        paths,
        vec![
            "/courses/demo/courseware/",
            "/courses/demo/courseware/week1/intro/",
            "/courses/demo/courseware/week1/basics/",
            "/courses/demo/courseware/week2/further/",
        ]
    );
    assert_eq!(report.records[0].depth, 0);
    assert_eq!(report.records[0].children_found, 3);
    assert!(report.records[1..].iter().all(|r| r.depth == 1));
}

#[tokio::test]
async fn test_mirror_writes_metadata_with_four_space_indent() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();

    execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    let toc_raw = std::fs::read_to_string(out.path().join("toc.json")).unwrap();
    assert!(toc_raw.starts_with("{\n    \"Semaine 1\""));
    let toc: TableOfContents = serde_json::from_str(&toc_raw).unwrap();
    assert_eq!(toc["Semaine 1"][0].title, "Introduction");

    let courses_raw = std::fs::read_to_string(out.path().join("courses.json")).unwrap();
    let courses: CourseIndex = serde_json::from_str(&courses_raw).unwrap();
    let intro = &courses[&format!("{}/courses/demo/courseware/week1/intro/", server.uri())];
    assert_eq!(intro.chap_name, "semaine_1");
    assert_eq!(intro.title, "introduction");
}

#[tokio::test]
async fn test_mirror_logs_each_download() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();

    execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    let log = DownloadLog::new(out.path().join("downloads.log"));
    let entries = log.entries().await.unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(
        entries[0].destination,
        out.path().join("semaine_1/introduction_video_1.mp4")
    );
    assert_eq!(
        entries[0].source_url,
        format!("{}/media/intro_hd.mp4", server.uri())
    );
}

#[tokio::test]
async fn test_dry_run_only_exports_metadata() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 0).await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), true), None)
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.records.len(), 4);
    let totals = report.artifact_totals();
    assert_eq!(totals.planned, 4);
    assert_eq!(totals.downloaded, 0);

    assert!(out.path().join("toc.json").exists());
    assert!(out.path().join("courses.json").exists());
    assert!(!out.path().join("semaine_1").exists());
    assert!(!out.path().join("semaine_2").exists());
    assert!(!out.path().join("downloads.log").exists());
}

#[tokio::test]
async fn test_second_run_fetches_no_artifacts() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    // Exactly one fetch per artifact across both runs
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();

    execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();
    let second = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    let totals = second.artifact_totals();
    assert_eq!(totals.skipped, 4);
    assert_eq!(totals.downloaded, 0);

    let log = DownloadLog::new(out.path().join("downloads.log"));
    assert_eq!(log.entries().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_existing_file_is_left_untouched() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_artifact(&server, "/media/intro_hd.mp4", b"intro video", 1).await;
    mount_artifact(&server, "/assets/slides.pdf", b"%PDF slides", 0).await;
    mount_artifact(&server, "/media/basics_hd.mp4", b"basics video", 1).await;
    mount_artifact(&server, "/assets/exercises.zip", b"PK exercises", 1).await;
    let out = TempDir::new().unwrap();

    let slides = out.path().join("semaine_1/slides.pdf");
    std::fs::create_dir_all(slides.parent().unwrap()).unwrap();
    std::fs::write(&slides, b"my annotated copy").unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&slides).unwrap(), b"my annotated copy");
    assert_eq!(report.artifact_totals().skipped, 1);
    assert_eq!(report.artifact_totals().downloaded, 3);
}

#[tokio::test]
async fn test_failed_artifact_does_not_stop_the_run() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_artifact(&server, "/media/intro_hd.mp4", b"intro video", 1).await;
    mount_artifact(&server, "/assets/slides.pdf", b"%PDF slides", 1).await;
    mount_artifact(&server, "/assets/exercises.zip", b"PK exercises", 1).await;
    Mock::given(method("GET"))
        .and(path("/media/basics_hd.mp4"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    let totals = report.artifact_totals();
    assert_eq!(totals.failed, 1);
    assert_eq!(totals.downloaded, 3);
    assert!(!out.path().join("semaine_1/les_bases_video_1.mp4").exists());

    let log = DownloadLog::new(out.path().join("downloads.log"));
    assert_eq!(log.entries().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_unreachable_lesson_is_recorded_and_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, ROOT_PATH, OUTLINE).await;
    mount_page(&server, "/courses/demo/courseware/week1/intro/", LESSON_INTRO).await;
    mount_page(&server, "/courses/demo/courseware/week2/further/", LESSON_FURTHER).await;
    mount_artifact(&server, "/media/intro_hd.mp4", b"intro video", 1).await;
    mount_artifact(&server, "/assets/slides.pdf", b"%PDF slides", 1).await;
    mount_artifact(&server, "/media/basics_hd.mp4", b"basics video", 0).await;
    mount_artifact(&server, "/assets/exercises.zip", b"PK exercises", 1).await;
    // basics is not mounted, so wiremock answers 404
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    let basics = &report.records[2];
    assert!(matches!(basics.status, NodeStatus::FetchFailed(_)));
    assert_eq!(report.failures().len(), 1);
    assert!(!out.path().join("semaine_1/les_bases.html").exists());
    assert!(out.path().join("semaine_2/aller_plus_loin_.html").exists());
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let result = execute_mirror(options(&server, out.path(), false), None).await;

    assert!(matches!(result, Err(ScanError::RootUnavailable { .. })));
    assert!(!out.path().join("toc.json").exists());
}

#[tokio::test]
async fn test_root_without_outline_is_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, ROOT_PATH, "<html><body>Maintenance</body></html>").await;
    let out = TempDir::new().unwrap();

    let result = execute_mirror(options(&server, out.path(), false), None).await;

    assert!(matches!(result, Err(ScanError::RootUnparseable { .. })));
}

#[tokio::test]
async fn test_invalid_root_url_is_rejected() {
    let out = TempDir::new().unwrap();
    let options = MirrorOptions {
        url: "not a url".to_string(),
        output_dir: out.path().to_path_buf(),
        dry_run: false,
        config: CrawlerConfig::unpaced(),
        progress: None,
    };

    let result = execute_mirror(options, None).await;
    assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_unwritable_toc_is_fatal() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 0).await;
    let out = TempDir::new().unwrap();
    std::fs::create_dir_all(out.path().join("toc.json")).unwrap();

    let result = execute_mirror(options(&server, out.path(), false), None).await;

    match result {
        Err(ScanError::Metadata { path, .. }) => assert_eq!(path, out.path().join("toc.json")),
        other => panic!("expected a metadata error, got {:?}", other.map(|r| r.records.len())),
    }
    assert!(!out.path().join("semaine_1").exists());
}

#[tokio::test]
async fn test_unwritable_lesson_html_still_downloads_artifacts() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();
    let week1 = out.path().join("semaine_1");
    std::fs::create_dir_all(week1.join("introduction.html")).unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();

    assert!(report.failures().is_empty());
    assert_eq!(report.artifact_totals().downloaded, 4);
    assert!(week1.join("introduction.html").is_dir());
    assert!(!week1.join(".introduction.html.part").exists());
    assert_eq!(
        std::fs::read(week1.join("introduction_video_1.mp4")).unwrap(),
        b"intro video"
    );
    assert!(week1.join("slides.pdf").exists());
}

#[tokio::test]
async fn test_lesson_listed_twice_is_indexed_where_it_is_mirrored() {
    let outline = r#"
        <div class="chapter"><h3><a>Semaine 1</a></h3>
          <ul><li><a href="/c/shared/"><p>Intro</p></a></li></ul></div>
        <div class="chapter"><h3><a>Semaine 2</a></h3>
          <ul><li><a href="/c/shared/"><p>Rappel</p></a></li></ul></div>
    "#;
    let server = MockServer::start().await;
    mount_page(&server, ROOT_PATH, outline).await;
    mount_page(&server, "/c/shared/", LESSON_INTRO).await;
    mount_artifact(&server, "/media/intro_hd.mp4", b"intro video", 1).await;
    mount_artifact(&server, "/assets/slides.pdf", b"%PDF slides", 1).await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), false), None)
        .await
        .unwrap();
    assert_eq!(report.duplicates_skipped, 1);

    let courses: CourseIndex =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("courses.json")).unwrap())
            .unwrap();
    let entry = &courses[&format!("{}/c/shared/", server.uri())];
    let mirrored = out
        .path()
        .join(&entry.chap_name)
        .join(format!("{}_video_1.mp4", entry.title));
    assert!(mirrored.exists());
    assert!(!out.path().join("semaine_2").exists());
}

#[tokio::test]
async fn test_mirror_with_spinner_completes() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 1).await;
    let out = TempDir::new().unwrap();

    let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
    let mut options = options(&server, out.path(), false);
    options.progress = Some(multi);

    let report = execute_mirror(options, None).await.unwrap();

    assert_eq!(report.artifact_totals().downloaded, 4);
}

#[tokio::test]
async fn test_progress_messages_are_reported() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 0).await;
    let out = TempDir::new().unwrap();

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    let callback = Arc::new(move |msg: String| sink.lock().unwrap().push(msg));

    execute_mirror(options(&server, out.path(), true), Some(callback))
        .await
        .unwrap();

    let messages = messages.lock().unwrap();
    assert_eq!(
        messages.first().map(String::as_str),
        Some("Fetching /courses/demo/courseware/ (depth 0)")
    );
    assert!(messages.iter().any(|m| m.starts_with("Visited 4 pages")));
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_reports_list_every_visited_node() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 0).await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), true), None)
        .await
        .unwrap();

    let text = generate_mirror_report(&report);
    assert!(text.contains("Nodes visited: 4"));
    for identity in report.visited_identities() {
        assert!(text.contains(identity));
    }

    let json = generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["records"].as_array().unwrap().len(), 4);
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["records"][0]["status"]["status"], "visited");
}

#[tokio::test]
async fn test_save_report_creates_parent_dirs() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    mount_all_artifacts(&server, 0).await;
    let out = TempDir::new().unwrap();

    let report = execute_mirror(options(&server, out.path(), true), None)
        .await
        .unwrap();

    let target = out.path().join("reports/run.json");
    let content = render_report(&report, ReportFormat::Json).unwrap();
    save_report(&content, &target).unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), content);
}

#[test]
fn test_report_format_parsing() {
    assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
    assert!("csv".parse::<ReportFormat>().is_err());
}
