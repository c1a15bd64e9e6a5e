//! git
//!
//! Single interface for all Git operations.
//!
//! This module is the **only doorway** to Git. All repository reads and
//! writes flow through [`Git`]; no other module imports `git2`. Errors are
//! normalized into the typed [`GitError`] categories that the squash
//! orchestrator aborts on.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - In-progress operation detection (rebase, merge, ...)
//! - Branch checkout and creation
//! - Root commit discovery
//! - Soft reset and squash commit creation

mod interface;

pub use interface::{Git, GitError, GitState, WorktreeStatus};
