//! Line-level recognition of Fortran dependency directives.
//!
//! - [`patterns`]: Precompiled regex patterns for `include`, `module`, `submodule` and `use`
//!
//! Patterns only look at a single physical line. Continuation lines,
//! semicolon-separated statements and fixed-form columns are not handled.

pub mod patterns;

pub use patterns::{INCLUDE_RE, MODULE_RE, SUBMODULE_RE, USE_RE};
