//! ui
//!
//! User-facing output utilities.
//!
//! All console output goes through this module so quiet and debug modes are
//! handled consistently.

pub mod output;
