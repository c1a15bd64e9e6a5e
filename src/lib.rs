//! Flatten - collapse a repository's commit history into a single commit
//!
//! Flatten is a single-binary tool that performs one maintenance operation:
//! it checks out the primary branch, creates a safety branch at the current
//! tip, and then rewrites the entire history into one commit.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to squash)
//! - [`squash`] - Orchestrates the five-step squash sequence
//! - [`core`] - Strong domain types
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User-facing output utilities
//!
//! # Correctness Invariants
//!
//! 1. The backup branch is created before the primary branch is mutated
//! 2. The reset happens before the squash commit is created
//! 3. The first failing step aborts the whole run (no retries, no rollback)

pub mod cli;
pub mod core;
pub mod git;
pub mod squash;
pub mod ui;
