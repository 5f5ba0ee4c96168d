/// Regex patterns for Fortran dependency directives
///
/// All patterns are compiled once on first use via `LazyLock` and are
/// read-only afterwards, so they can be shared freely across threads.
///
/// All regexes use case-insensitive + unicode flags
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a case-insensitive regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. All patterns in this module are
/// compile-time constants covered by the tests below, so the panic can only
/// happen at first access of the `LazyLock` static during development.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// Anchor patterns
const SOL_STR: &str = r"^\s*"; // Start of line
const EOL_STR: &str = r"\s*$"; // End of line

// Trailing `!` comment, possibly empty
const COMMENT_STR: &str = r"(?:!.*)?";

// INCLUDE / #include: group 1 is the quoted `name.ext`
pub static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r#"{SOL_STR}#?INCLUDE\s*['"](\w+\.\w+)['"]"#)));

// MODULE: group 1 is the module name, only a comment may follow it
pub static MODULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}\bMODULE\b\s+(\w+)\s*{COMMENT_STR}{EOL_STR}"
    ))
});

// SUBMODULE: group 1 is the ancestor chain (`parent` or `ancestor:parent`), group 2 the name
pub static SUBMODULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}\bSUBMODULE\b\s*\(\s*(\w+(?::\w+)?)\s*\)\s*(\w+)"
    ))
});

// USE: group 1 is the first identifier after the optional `non_intrinsic` and `::`.
// `, intrinsic` is not stripped, so intrinsic imports capture the word `intrinsic`.
pub static USE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"{SOL_STR}USE\b,?\s*(?:NON_INTRINSIC\b)?\s*(?:::)?\s*(\w+)"
    ))
});

#[cfg(test)]
mod tests {
    use super::*;

    fn group<'a>(re: &Regex, line: &'a str, idx: usize) -> Option<&'a str> {
        re.captures(line)
            .and_then(|caps| caps.get(idx))
            .map(|m| m.as_str())
    }

    #[test]
    fn test_patterns_compile() {
        for re in [&*INCLUDE_RE, &*MODULE_RE, &*SUBMODULE_RE, &*USE_RE] {
            assert!(!re.as_str().is_empty());
        }
    }

    #[test]
    fn test_include_regex() {
        assert_eq!(group(&INCLUDE_RE, r#"include "foo.f90""#, 1), Some("foo.f90"));
        assert_eq!(group(&INCLUDE_RE, "INCLUDE 'foo.inc'", 1), Some("foo.inc"));
        assert_eq!(group(&INCLUDE_RE, r#"#include "foo.h""#, 1), Some("foo.h"));
        // No extension
        assert!(!INCLUDE_RE.is_match(r#"include "foo""#));
        // Missing quote
        assert!(!INCLUDE_RE.is_match("include foo.f90"));
    }

    #[test]
    fn test_module_regex() {
        assert_eq!(group(&MODULE_RE, "module my_module", 1), Some("my_module"));
        assert_eq!(group(&MODULE_RE, "MODULE MyModule", 1), Some("MyModule"));
        assert_eq!(group(&MODULE_RE, "module fruit !! doc", 1), Some("fruit"));
        // Anything other than a comment after the name
        assert!(!MODULE_RE.is_match("module procedure fruit"));
        assert!(!MODULE_RE.is_match("module fruit extra"));
        // `end module` and `submodule` are not module declarations
        assert!(!MODULE_RE.is_match("end module fruit"));
        assert!(!MODULE_RE.is_match("submodule (fruit) pear"));
    }

    #[test]
    fn test_module_regex_line_terminators() {
        assert_eq!(group(&MODULE_RE, "module fruit\n", 1), Some("fruit"));
        assert_eq!(group(&MODULE_RE, "module fruit ! hi\r\n", 1), Some("fruit"));
    }

    #[test]
    fn test_submodule_regex() {
        let caps = SUBMODULE_RE.captures("submodule ( ancestor:parent ) child").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "ancestor:parent");
        assert_eq!(caps.get(2).unwrap().as_str(), "child");
        // Single-character ancestors are allowed
        assert_eq!(group(&SUBMODULE_RE, "submodule (a) b", 1), Some("a"));
        assert!(!SUBMODULE_RE.is_match("submodule parent child"));
        assert!(!SUBMODULE_RE.is_match("end submodule child"));
    }

    #[test]
    fn test_use_regex() {
        assert_eq!(group(&USE_RE, "use foo", 1), Some("foo"));
        assert_eq!(group(&USE_RE, "use :: foo", 1), Some("foo"));
        assert_eq!(group(&USE_RE, "use,non_intrinsic::foo", 1), Some("foo"));
        assert_eq!(group(&USE_RE, "use, intrinsic :: iso_c_binding", 1), Some("intrinsic"));
        // A module whose name merely starts with `non_intrinsic`
        assert_eq!(
            group(&USE_RE, "use non_intrinsic_mod", 1),
            Some("non_intrinsic_mod")
        );
        // Identifiers that start with `use` are assignments, not imports
        assert!(!USE_RE.is_match("useful = 3"));
        assert!(!USE_RE.is_match("user_count = 0"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(MODULE_RE.is_match("MoDuLe fruit"));
        assert!(USE_RE.is_match("USE fruit"));
        assert!(SUBMODULE_RE.is_match("SubModule (fruit) pear"));
        assert!(INCLUDE_RE.is_match("Include 'fruit.inc'"));
    }
}
