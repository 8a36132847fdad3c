use clap::{arg, command};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/moocmirror/";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("moocmirror")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("moocmirror")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a default configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to store the configuration in")
                        .default_value(DEFAULT_CONFIG_DIR),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing configuration file without asking")
                        .required(false),
                ),
        )
        .subcommand(
            command!("mirror")
                .about(
                    "Mirror a course: walk the outline, save every lesson page and download its \
                videos and documents. Files already on disk are never fetched again.",
                )
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("URL of the course outline")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-d --"dry")
                        .required(false)
                        .help("Walk the course and export metadata, but download nothing")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory the mirror is written to")
                        .default_value("."),
                )
                .arg(
                    arg!(-c --"config" <FILE>)
                        .required(false)
                        .help("JSON configuration file (pacing, timeouts, download log)"),
                )
                .arg(
                    arg!(-H --"headers" <FILE>)
                        .required(false)
                        .help("JSON object of request headers, replacing the defaults"),
                )
                .arg(
                    arg!(--"format" <FORMAT>)
                        .required(false)
                        .help("Report format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"report" <FILE>)
                        .required(false)
                        .help("Save the report to a file instead of printing it")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
