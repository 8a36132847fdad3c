use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::MultiProgress;
use moocmirror_core::mirror::{
    MirrorOptions, ReportFormat, execute_mirror, render_report, save_report,
};
use moocmirror_scanner::{CrawlerConfig, Headers};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Expand a leading `~` in a user supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Load the crawler configuration, falling back to defaults when no file is given
pub fn load_config(path: Option<&str>) -> Result<CrawlerConfig> {
    match path {
        Some(raw) => {
            let path = expand_path(raw);
            let config = CrawlerConfig::from_json_file(&path)
                .with_context(|| format!("Could not load configuration from {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(CrawlerConfig::default()),
    }
}

pub fn load_headers(path: &str) -> Result<Headers> {
    let path = expand_path(path);
    Headers::from_json_file(&path)
        .with_context(|| format!("Could not load headers from {}", path.display()))
}

/// Build mirror options from `mirror` subcommand arguments. The spinner is
/// hosted on `progress` unless `--no-progress` is given.
pub fn mirror_options(args: &ArgMatches, progress: Option<MultiProgress>) -> Result<MirrorOptions> {
    let url = args
        .get_one::<Url>("URL")
        .context("A course URL is required")?;
    let output_dir = args
        .get_one::<String>("output")
        .map(|raw| expand_path(raw))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = load_config(args.get_one::<String>("config").map(String::as_str))?;
    if let Some(headers_file) = args.get_one::<String>("headers") {
        config = config.with_headers(load_headers(headers_file)?);
    }

    Ok(MirrorOptions {
        url: url.as_str().to_string(),
        output_dir,
        dry_run: args.get_flag("dry"),
        config,
        progress: progress.filter(|_| !args.get_flag("no-progress")),
    })
}

/// Write the default configuration into `dir`. Returns the file written.
pub fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite it",
            config_path.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    let content = CrawlerConfig::default().to_json_pretty()?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  MOOCMIRROR INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(crate::commands::DEFAULT_CONFIG_DIR);
    let config_dir = expand_path(raw_dir);
    let mut force = args.get_flag("force");

    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );
    println!();

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("A configuration file already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            config_path.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Do you want to overwrite it? [y/N]:")?;
        println!();

        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return Ok(());
        }
        force = true;
    }

    let written = write_default_config(&config_dir, force)?;

    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Config: {}",
        "✓".green().bold(),
        written.display().to_string().bright_white()
    );
    println!(
        "{} Use it with: moocmirror mirror --config {} <URL>",
        "ℹ".blue(),
        written.display()
    );
    println!();
    Ok(())
}

pub async fn handle_mirror(args: &ArgMatches, quiet: bool, progress: MultiProgress) -> Result<()> {
    let options = mirror_options(args, (!quiet).then_some(progress))?;
    let format: ReportFormat = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let report_path = args.get_one::<PathBuf>("report").cloned();

    if !quiet {
        println!("\n📚 Mirroring {}", options.url.bright_white());
        println!("Output: {}", options.output_dir.display());
        if options.dry_run {
            println!("{}", "Dry run: nothing will be downloaded".yellow());
        }
        println!();
    }

    // The spinner already shows progress; plain messages are only printed without it
    let progress_callback = if options.progress.is_some() || quiet {
        None
    } else {
        Some(Arc::new(|msg: String| println!("{}", msg)) as moocmirror_core::MirrorProgressCallback)
    };

    let url = options.url.clone();
    let report = execute_mirror(options, progress_callback)
        .await
        .with_context(|| format!("Mirror of {} failed", url))?;

    if !quiet {
        println!("\n{} Mirror complete!\n", "✓".green().bold());
    }

    let rendered = render_report(&report, format).context("Failed to render report")?;
    match report_path {
        Some(path) => {
            let path = expand_path(&path.to_string_lossy());
            save_report(&rendered, &path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
