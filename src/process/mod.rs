//! Source scanning.
//!
//! This module applies the directive matcher to whole sources:
//! - [`scan_reader`] / [`scan_str`]: scan text line by line
//! - [`scan_file`]: scan a file on disk, optionally following `include` lines
//!
//! The result is a [`SourceDirectives`] with lower-cased module names and
//! `use, intrinsic` imports removed.

pub mod scan;

pub use scan::{scan_file, scan_reader, scan_str, ScanOptions, SourceDirectives, SubmoduleDecl};
