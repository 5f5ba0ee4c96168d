//! Directive matching for single Fortran source lines
//!
//! Recognizes the four statements a build backend needs for dependency
//! ordering:
//! `include "file.inc"`, `module name`, `submodule (ancestor:parent) name`
//! and `use name`.
//!
//! Matching is case-insensitive and anchored at the start of the line.
//! Commented-out statements and statements preceded by other tokens never
//! match. Captured identifiers keep their original case.

use std::fmt;

use regex::Regex;

use crate::parser::patterns::{INCLUDE_RE, MODULE_RE, SUBMODULE_RE, USE_RE};

/// Word captured by `use, intrinsic :: name` in place of the module name.
pub const INTRINSIC_SENTINEL: &str = "intrinsic";

/// `module procedure` introduces a procedure interface, not a module.
const RESERVED_MODULE_NAME: &str = "procedure";

/// Kind of dependency directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectiveKind {
    Include,
    Module,
    Submodule,
    Use,
}

impl DirectiveKind {
    /// All kinds, in the order [`find_directive`] tries them.
    pub const ALL: [DirectiveKind; 4] = [
        DirectiveKind::Include,
        DirectiveKind::Module,
        DirectiveKind::Submodule,
        DirectiveKind::Use,
    ];

    /// Lower-case keyword used in reports and on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Include => "include",
            DirectiveKind::Module => "module",
            DirectiveKind::Submodule => "submodule",
            DirectiveKind::Use => "use",
        }
    }

    /// Parse a keyword (case-insensitive)
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(keyword.trim()))
    }

    fn pattern(self) -> &'static Regex {
        match self {
            DirectiveKind::Include => &*INCLUDE_RE,
            DirectiveKind::Module => &*MODULE_RE,
            DirectiveKind::Submodule => &*SUBMODULE_RE,
            DirectiveKind::Use => &*USE_RE,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful match, borrowing the captured text from the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveMatch<'a> {
    /// `include "file"`: the quoted `name.ext`
    Include { file: &'a str },
    /// `module name`
    Module { name: &'a str },
    /// `submodule (ancestors) name`: ancestors is `parent` or `ancestor:parent`
    Submodule { ancestors: &'a str, name: &'a str },
    /// `use name`: `intrinsic` for `use, intrinsic :: name`
    Use { name: &'a str },
}

impl<'a> DirectiveMatch<'a> {
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        match self {
            DirectiveMatch::Include { .. } => DirectiveKind::Include,
            DirectiveMatch::Module { .. } => DirectiveKind::Module,
            DirectiveMatch::Submodule { .. } => DirectiveKind::Submodule,
            DirectiveMatch::Use { .. } => DirectiveKind::Use,
        }
    }

    /// The primary identifier: file name, module name, submodule name or used module
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            DirectiveMatch::Include { file } => file,
            DirectiveMatch::Module { name }
            | DirectiveMatch::Submodule { name, .. }
            | DirectiveMatch::Use { name } => name,
        }
    }

    /// The raw ancestor chain of a submodule
    #[must_use]
    pub fn ancestors(&self) -> Option<&'a str> {
        match *self {
            DirectiveMatch::Submodule { ancestors, .. } => Some(ancestors),
            _ => None,
        }
    }

    /// Whether this is the `use, intrinsic` sentinel that callers discard
    #[must_use]
    pub fn is_intrinsic_use(&self) -> bool {
        matches!(self, DirectiveMatch::Use { name } if name.eq_ignore_ascii_case(INTRINSIC_SENTINEL))
    }
}

/// Match `line` against the pattern for `kind`
///
/// # Returns
/// * `Some(DirectiveMatch)` if the line is an uncommented directive of that kind
/// * `None` otherwise
#[must_use]
pub fn match_directive(kind: DirectiveKind, line: &str) -> Option<DirectiveMatch<'_>> {
    let caps = kind.pattern().captures(line)?;
    let first = caps.get(1)?.as_str();

    match kind {
        DirectiveKind::Include => Some(DirectiveMatch::Include { file: first }),
        DirectiveKind::Module => {
            if first.eq_ignore_ascii_case(RESERVED_MODULE_NAME) {
                None
            } else {
                Some(DirectiveMatch::Module { name: first })
            }
        }
        DirectiveKind::Submodule => Some(DirectiveMatch::Submodule {
            ancestors: first,
            name: caps.get(2)?.as_str(),
        }),
        DirectiveKind::Use => Some(DirectiveMatch::Use { name: first }),
    }
}

/// Check if a line is a directive of the given kind
#[must_use]
pub fn is_directive_line(kind: DirectiveKind, line: &str) -> bool {
    match_directive(kind, line).is_some()
}

/// Try every kind in [`DirectiveKind::ALL`] order and return the first match
#[must_use]
pub fn find_directive(line: &str) -> Option<DirectiveMatch<'_>> {
    DirectiveKind::ALL
        .into_iter()
        .find_map(|kind| match_directive(kind, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_keywords() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_keyword(kind.as_str()), Some(kind));
        }
        assert_eq!(DirectiveKind::from_keyword("USE"), Some(DirectiveKind::Use));
        assert_eq!(DirectiveKind::from_keyword("program"), None);
        assert_eq!(DirectiveKind::Submodule.to_string(), "submodule");
    }

    #[test]
    fn test_match_module() {
        let m = match_directive(DirectiveKind::Module, "module Fruit").unwrap();
        assert_eq!(m, DirectiveMatch::Module { name: "Fruit" });
        assert_eq!(m.kind(), DirectiveKind::Module);
        assert_eq!(m.ancestors(), None);
    }

    #[test]
    fn test_module_procedure_is_not_a_module() {
        assert!(match_directive(DirectiveKind::Module, "module procedure").is_none());
        assert!(match_directive(DirectiveKind::Module, "  MODULE PROCEDURE  ! iface").is_none());
        assert!(match_directive(DirectiveKind::Module, "module procedure fruit").is_none());
        // A name that only starts with `procedure` is fine
        assert!(match_directive(DirectiveKind::Module, "module procedures").is_some());
    }

    #[test]
    fn test_match_submodule() {
        let m = match_directive(DirectiveKind::Submodule, "submodule (ancestor:parent) foo").unwrap();
        assert_eq!(m.name(), "foo");
        assert_eq!(m.ancestors(), Some("ancestor:parent"));
    }

    #[test]
    fn test_intrinsic_sentinel() {
        let m = match_directive(DirectiveKind::Use, "use, intrinsic :: iso_fortran_env").unwrap();
        assert!(m.is_intrinsic_use());
        let m = match_directive(DirectiveKind::Use, "use iso_fortran_env").unwrap();
        assert!(!m.is_intrinsic_use());
    }

    #[test]
    fn test_find_directive() {
        assert_eq!(
            find_directive("include 'a.inc'").map(|m| m.kind()),
            Some(DirectiveKind::Include)
        );
        assert_eq!(
            find_directive("submodule (a) b").map(|m| m.kind()),
            Some(DirectiveKind::Submodule)
        );
        assert_eq!(find_directive("  use b").map(|m| m.kind()), Some(DirectiveKind::Use));
        assert!(find_directive("x = 1").is_none());
        assert!(find_directive("! module a").is_none());
        assert!(find_directive("").is_none());
    }

    #[test]
    fn test_is_directive_line() {
        assert!(is_directive_line(DirectiveKind::Use, "use fruit"));
        assert!(!is_directive_line(DirectiveKind::Module, "use fruit"));
    }
}
