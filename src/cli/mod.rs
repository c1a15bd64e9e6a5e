//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and ambient flags
//! - Pre-flight the repository (open it, refuse mid-operation state)
//! - Delegate to [`crate::squash::run`]
//!
//! The CLI layer is thin. All repository mutations flow through the squash
//! orchestrator and the git interface.

pub mod args;

pub use args::Cli;

use anyhow::{bail, Context as _, Result};

use crate::git::Git;
use crate::squash;
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Returns an error on
/// the first failing step; `main` turns that into a non-zero exit code.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let cwd = match cli.cwd {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    output::debug(format!("opening repository at {}", cwd.display()), verbosity);
    let git = Git::open(&cwd).context("Failed to open repository")?;

    // A repository that is mid-rebase or mid-merge is incompatible with
    // resetting and committing; refuse up front.
    let state = git.state();
    if state.is_in_progress() {
        bail!("Repository has a {} in progress; finish or abort it first", state);
    }

    squash::run(&git, verbosity).context("Squash failed")?;

    Ok(())
}
