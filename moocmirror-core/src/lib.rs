pub mod adapter;
pub mod courseware;
pub mod mirror;
pub mod naming;

use colored::Colorize;

pub use adapter::{CoursePage, FunMoocAdapter, default_headers};
pub use courseware::{
    CourseEntry, CourseIndex, Lesson, Outline, TableOfContents, TocEntry, VideoLink,
};
pub use mirror::{
    MirrorOptions, MirrorProgressCallback, ReportFormat, execute_mirror, extract_url_path,
    generate_json_report, generate_mirror_report, render_report, save_report,
};

const BANNER: &str = r#"
                             _
  _ __  ___  ___  ___ _ __ (_)_ _ _ _ ___ _ _
 | '  \/ _ \/ _ \/ _| '  \| | '_| '_/ _ \ '_|
 |_|_|_\___/\___/\__|_|_|_|_|_| |_| \___/_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "polite course mirroring".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
