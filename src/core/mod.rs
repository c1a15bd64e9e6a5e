//! core
//!
//! Domain types shared by the git interface and the squash orchestrator.

pub mod types;
