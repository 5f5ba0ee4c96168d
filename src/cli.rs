//! Command-line interface for fortdeps.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::directive::DirectiveKind;

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to scan
    pub inputs: Vec<PathBuf>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Custom Fortran file extensions (in addition to defaults)
    pub fortran_extensions: Vec<String>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Do not scan files named by `include` lines
    pub no_follow_includes: bool,

    /// Only report these directive kinds (empty = all)
    pub kinds: Vec<DirectiveKind>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (errors only)
    pub silent: bool,
}

impl CliArgs {
    /// Whether a directive kind should be reported
    #[must_use]
    pub fn reports(&self, kind: DirectiveKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

fn parse_kind(value: &str) -> Result<DirectiveKind, String> {
    DirectiveKind::from_keyword(value).ok_or_else(|| {
        format!("unknown directive kind {value:?} (expected include, module, submodule or use)")
    })
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("fortdeps")
        .version(env!("CARGO_PKG_VERSION"))
        .about("List include, module, submodule and use directives in Fortran sources")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to scan (- reads stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively scan directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("fortran")
                .short('f')
                .long("fortran")
                .help("Additional Fortran file extension (can be repeated, e.g., -f inc -f fi)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("no-follow-includes")
                .long("no-follow-includes")
                .help("Do not scan files named by include lines")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("kind")
                .short('k')
                .long("kind")
                .help("Only report this directive kind: include, module, submodule, use (can be repeated)")
                .value_name("KIND")
                .action(ArgAction::Append)
                .value_parser(parse_kind),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config, matched lines, skipped includes)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (only errors are printed to stderr)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        recursive: matches.get_flag("recursive"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        fortran_extensions: matches
            .get_many::<String>("fortran")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        no_follow_includes: matches.get_flag("no-follow-includes"),
        kinds: matches
            .get_many::<DirectiveKind>("kind")
            .map(|vals| vals.copied().collect())
            .unwrap_or_default(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}
