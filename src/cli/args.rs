//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! The squash operation itself takes no parameters: the primary branch, the
//! backup branch, and the commit message are compile-time constants. Only
//! ambient flags are exposed:
//!
//! - `--cwd <path>`: Run as if started in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::Parser;
use std::path::PathBuf;

/// Flatten - collapse a repository's commit history into a single commit
#[derive(Parser, Debug)]
#[command(name = "git-flatten")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if git-flatten was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_by_default() {
        let cli = Cli::try_parse_from(["git-flatten"]).unwrap();
        assert!(cli.cwd.is_none());
        assert!(!cli.debug);
        assert!(!cli.quiet);
    }

    #[test]
    fn accepts_ambient_flags() {
        let cli = Cli::try_parse_from(["git-flatten", "--cwd", "/tmp", "-q", "--debug"]).unwrap();
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp")));
        assert!(cli.debug);
        assert!(cli.quiet);
    }

    #[test]
    fn rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["git-flatten", "master"]).is_err());
    }
}
