use colored::Colorize;
use indicatif::MultiProgress;
use moocmirror::command_argument_builder;
use moocmirror::handlers::{handle_init, handle_mirror};
use moocmirror::logging::init_tracing;
use moocmirror_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("mirror", primary_command)) => {
            // Log lines and the spinner share stderr
            let progress = MultiProgress::new();
            init_tracing(progress.clone());
            handle_mirror(primary_command, quiet, progress).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
