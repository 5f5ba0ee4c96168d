/// Source scanning - turns a Fortran source into its dependency facts
///
/// This module handles:
/// - Reading physical lines (non-UTF-8 bytes are replaced, never fatal)
/// - Matching each line against the directive patterns
/// - Lower-casing module names and dropping `use, intrinsic` imports
/// - Following `include` files relative to the including file
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::{debug, warn};

use crate::config::is_fortran_path;
use crate::directive::{find_directive, DirectiveKind, DirectiveMatch};
use crate::error::Result;

/// A `submodule (ancestor:parent) name` declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmoduleDecl {
    /// Lower-cased ancestor chain, outermost module first
    pub ancestors: Vec<String>,
    /// Lower-cased submodule name
    pub name: String,
}

impl SubmoduleDecl {
    /// Build from the raw captures of a submodule match
    #[must_use]
    pub fn new(ancestors: &str, name: &str) -> Self {
        Self {
            ancestors: ancestors
                .split(':')
                .map(|part| part.trim().to_lowercase())
                .filter(|part| !part.is_empty())
                .collect(),
            name: name.to_lowercase(),
        }
    }

    /// The module at the top of the ancestry
    #[must_use]
    pub fn root(&self) -> &str {
        self.ancestors.first().map_or("", String::as_str)
    }

    /// The direct parent (module or submodule)
    #[must_use]
    pub fn parent(&self) -> &str {
        self.ancestors.last().map_or("", String::as_str)
    }

    /// Ancestors joined back with `:`
    #[must_use]
    pub fn ancestor_chain(&self) -> String {
        self.ancestors.join(":")
    }
}

impl fmt::Display for SubmoduleDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ancestor_chain(), self.name)
    }
}

/// Directives found in one source file (and, if followed, its includes)
///
/// Each list keeps first-seen order and holds no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDirectives {
    /// Modules declared by `module name`
    pub modules: Vec<String>,
    /// Submodules declared by `submodule (...) name`
    pub submodules: Vec<SubmoduleDecl>,
    /// Modules imported by `use`, intrinsic imports excluded
    pub uses: Vec<String>,
    /// File names from `include` lines, case preserved
    pub includes: Vec<String>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    if list.contains(&item) {
        false
    } else {
        list.push(item);
        true
    }
}

impl SourceDirectives {
    /// Record one match. Returns false if it was discarded or already known.
    pub fn record(&mut self, found: &DirectiveMatch<'_>) -> bool {
        match *found {
            DirectiveMatch::Include { file } => push_unique(&mut self.includes, file.to_string()),
            DirectiveMatch::Module { name } => push_unique(&mut self.modules, name.to_lowercase()),
            DirectiveMatch::Submodule { ancestors, name } => {
                push_unique(&mut self.submodules, SubmoduleDecl::new(ancestors, name))
            }
            DirectiveMatch::Use { .. } if found.is_intrinsic_use() => false,
            DirectiveMatch::Use { name } => push_unique(&mut self.uses, name.to_lowercase()),
        }
    }

    /// Used modules that this source does not declare itself
    pub fn external_uses(&self) -> impl Iterator<Item = &str> + '_ {
        self.uses
            .iter()
            .filter(|name| !self.modules.contains(*name))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
            && self.submodules.is_empty()
            && self.uses.is_empty()
            && self.includes.is_empty()
    }

    /// Fold the directives of an included file into this one
    ///
    /// An include is textual, so everything it declares or uses belongs to
    /// the including source.
    pub fn merge_included(&mut self, included: SourceDirectives) {
        for name in included.modules {
            push_unique(&mut self.modules, name);
        }
        for decl in included.submodules {
            push_unique(&mut self.submodules, decl);
        }
        for name in included.uses {
            push_unique(&mut self.uses, name);
        }
        for file in included.includes {
            push_unique(&mut self.includes, file);
        }
    }

    /// All facts as `(kind, text)` pairs, grouped by kind
    ///
    /// Submodules render as `<ancestor-chain> <name>`.
    #[must_use]
    pub fn entries(&self) -> Vec<(DirectiveKind, String)> {
        let mut entries = Vec::new();
        entries.extend(
            self.includes
                .iter()
                .map(|f| (DirectiveKind::Include, f.clone())),
        );
        entries.extend(self.modules.iter().map(|m| (DirectiveKind::Module, m.clone())));
        entries.extend(
            self.submodules
                .iter()
                .map(|s| (DirectiveKind::Submodule, s.to_string())),
        );
        entries.extend(self.uses.iter().map(|u| (DirectiveKind::Use, u.clone())));
        entries
    }
}

/// Options controlling [`scan_file`]
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Scan included files and merge their directives
    pub follow_includes: bool,
    /// Maximum include nesting below the scanned file
    pub max_include_depth: usize,
    /// Files larger than this many bytes are rejected
    pub max_file_size: u64,
    /// Extra extensions that make an included file worth scanning
    pub fortran_extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_includes: true,
            max_include_depth: 16,
            max_file_size: 100 * 1024 * 1024,
            fortran_extensions: Vec::new(),
        }
    }
}

/// Scan Fortran source from a reader
///
/// # Arguments
/// * `reader` - The source text, one physical line at a time
pub fn scan_reader<R: BufRead>(mut reader: R) -> Result<SourceDirectives> {
    let mut directives = SourceDirectives::default();
    let mut buffer = Vec::new();
    let mut line_number = 0usize;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        line_number += 1;

        let text = String::from_utf8_lossy(&buffer);
        let line = text.trim_end_matches(['\n', '\r']);
        if let Some(found) = find_directive(line) {
            if directives.record(&found) {
                debug!("line {line_number}: {} {}", found.kind(), found.name());
            }
        }
    }

    Ok(directives)
}

/// Scan Fortran source held in memory
#[must_use]
pub fn scan_str(source: &str) -> SourceDirectives {
    let mut directives = SourceDirectives::default();
    for line in source.lines() {
        if let Some(found) = find_directive(line) {
            directives.record(&found);
        }
    }
    directives
}

/// Scan a Fortran file, following its includes if enabled
pub fn scan_file(path: &Path, options: &ScanOptions) -> Result<SourceDirectives> {
    let mut visited = HashSet::new();
    scan_file_nested(path, options, 0, &mut visited)
}

fn visit_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn scan_file_nested(
    path: &Path,
    options: &ScanOptions,
    depth: usize,
    visited: &mut HashSet<PathBuf>,
) -> Result<SourceDirectives> {
    visited.insert(visit_key(path));

    let size = std::fs::metadata(path)
        .with_context(|| format!("failed to read {}", path.display()))?
        .len();
    if size > options.max_file_size {
        bail!(
            "{} is {} bytes, exceeding the limit of {} bytes",
            path.display(),
            size,
            options.max_file_size
        );
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut directives = scan_reader(BufReader::new(file))
        .with_context(|| format!("failed to scan {}", path.display()))?;

    if !options.follow_includes {
        return Ok(directives);
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    for include in directives.includes.clone() {
        let include_path = base_dir.join(&include);
        if !include_path.is_file() {
            debug!(
                "{}: include {include} not found next to source, skipping",
                path.display()
            );
            continue;
        }
        if !is_fortran_path(&include_path, &options.fortran_extensions) {
            debug!("{}: include {include} is not Fortran, skipping", path.display());
            continue;
        }
        if visited.contains(&visit_key(&include_path)) {
            debug!("{}: include {include} already scanned", path.display());
            continue;
        }
        if depth >= options.max_include_depth {
            warn!(
                "{}: include {include} exceeds nesting limit of {}",
                path.display(),
                options.max_include_depth
            );
            continue;
        }

        let nested = scan_file_nested(&include_path, options, depth + 1, visited)?;
        directives.merge_included(nested);
    }

    Ok(directives)
}
