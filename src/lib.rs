//! fortdeps - Fortran dependency directive scanner
//!
//! Finds the `include`, `module`, `submodule` and `use` statements a build
//! system needs to order Fortran compilation.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod parser;
pub mod process;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use directive::{
    find_directive, is_directive_line, match_directive, DirectiveKind, DirectiveMatch,
    INTRINSIC_SENTINEL,
};
pub use error::Result;
pub use process::{scan_file, scan_reader, scan_str, ScanOptions, SourceDirectives, SubmoduleDecl};
