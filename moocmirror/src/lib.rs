pub mod commands;
pub mod handlers;
pub mod logging;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    expand_path, load_config, load_headers, mirror_options, write_default_config,
};

// Re-export mirror functionality from moocmirror-core
pub use moocmirror_core::mirror::{
    MirrorOptions, MirrorProgressCallback, execute_mirror, extract_url_path,
    generate_mirror_report,
};
