//! Error types and result aliases for fortdeps.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate
//!
//! A line that is not a directive is never an error; matching returns `Option`.

use anyhow::Result as AnyhowResult;

pub type Result<T> = AnyhowResult<T>;
