//! squash
//!
//! The five-step history squash sequence.
//!
//! # Sequence
//!
//! 1. Checkout the primary branch
//! 2. Create the backup branch at the current tip
//! 3. Resolve the root commit
//! 4. Soft-reset the primary branch to the root
//! 5. Commit the staged changes as a single parentless commit
//!
//! # Integrity Contract
//!
//! - The backup branch is created before any mutation of the primary branch;
//!   losing that order loses the only recovery path
//! - The reset happens before the squash commit is created
//! - The first failing step aborts the run; no retries, no rollback
//!
//! Repository access goes through the narrow [`Repository`] trait so the
//! sequence can be tested against an in-memory fake.

use crate::core::types::{BranchName, Oid};
use crate::git::{Git, GitError};
use crate::ui::output::{self, Verbosity};

/// The branch whose history gets collapsed.
pub const PRIMARY_BRANCH: &str = "master";

/// The safety branch created at the pre-squash tip.
pub const BACKUP_BRANCH: &str = "backup-branch";

/// Message of the squash commit.
pub const SQUASH_MESSAGE: &str = "Squashed all previous commits into one";

/// The repository primitives the squash sequence consumes.
///
/// [`Git`] is the production implementation; tests provide an in-memory
/// fake. Every method maps to one step of the sequence, plus the tip lookup
/// needed to place the backup branch.
pub trait Repository {
    /// Point HEAD and the working tree at a local branch.
    fn checkout_branch(&self, name: &BranchName) -> Result<(), GitError>;

    /// Resolve a local branch to its tip commit.
    fn branch_tip(&self, name: &BranchName) -> Result<Oid, GitError>;

    /// Create a local branch at `target` without moving HEAD.
    fn create_branch(&self, name: &BranchName, target: &Oid) -> Result<(), GitError>;

    /// Collect every parentless commit reachable from `tip`, sorted.
    fn find_root_commits(&self, tip: &Oid) -> Result<Vec<Oid>, GitError>;

    /// Move the current branch pointer to `target`, leaving the index and
    /// working tree untouched.
    fn soft_reset(&self, target: &Oid) -> Result<(), GitError>;

    /// Commit the staged index as a single parentless commit.
    fn commit_staged(&self, message: &str) -> Result<Oid, GitError>;
}

impl Repository for Git {
    fn checkout_branch(&self, name: &BranchName) -> Result<(), GitError> {
        Git::checkout_branch(self, name)
    }

    fn branch_tip(&self, name: &BranchName) -> Result<Oid, GitError> {
        Git::branch_tip(self, name)
    }

    fn create_branch(&self, name: &BranchName, target: &Oid) -> Result<(), GitError> {
        Git::create_branch(self, name, target)
    }

    fn find_root_commits(&self, tip: &Oid) -> Result<Vec<Oid>, GitError> {
        Git::find_root_commits(self, tip)
    }

    fn soft_reset(&self, target: &Oid) -> Result<(), GitError> {
        Git::soft_reset(self, target)
    }

    fn commit_staged(&self, message: &str) -> Result<Oid, GitError> {
        Git::commit_staged(self, message)
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquashOutcome {
    /// Tip of the primary branch before the run; the backup branch points here.
    pub original_tip: Oid,
    /// The root commit the branch was reset to.
    pub root: Oid,
    /// The single commit the primary branch now consists of.
    pub squash_commit: Oid,
}

/// Run the squash sequence against a repository.
///
/// Steps run in mandatory order and the first error aborts the run. After a
/// success the primary branch consists of exactly one commit whose tree
/// equals the pre-run tip's tree, and the backup branch preserves the old
/// history.
pub fn run(repo: &impl Repository, verbosity: Verbosity) -> Result<SquashOutcome, GitError> {
    let primary = BranchName::new(PRIMARY_BRANCH)?;
    let backup = BranchName::new(BACKUP_BRANCH)?;

    output::print(format!("Checking out '{}'...", primary), verbosity);
    repo.checkout_branch(&primary)?;
    let original_tip = repo.branch_tip(&primary)?;

    output::print(
        format!("Creating backup branch '{}' at {}...", backup, original_tip.short(7)),
        verbosity,
    );
    repo.create_branch(&backup, &original_tip)?;

    output::print("Resolving root commit...", verbosity);
    let root = resolve_root(repo, &original_tip)?;

    output::print(
        format!("Soft-resetting '{}' to root {}...", primary, root.short(7)),
        verbosity,
    );
    repo.soft_reset(&root)?;

    output::print("Creating squash commit...", verbosity);
    let squash_commit = repo.commit_staged(SQUASH_MESSAGE)?;

    output::success(
        format!(
            "Squashed history of '{}' into {} (old tip saved as '{}')",
            primary,
            squash_commit.short(7),
            backup
        ),
        verbosity,
    );

    Ok(SquashOutcome {
        original_tip,
        root,
        squash_commit,
    })
}

/// Pick the reset target from the parentless commits reachable from `tip`.
///
/// Exactly one root is required. Unrelated merged histories produce several,
/// and picking one silently would make the result depend on walk order, so
/// that case is an error.
fn resolve_root(repo: &impl Repository, tip: &Oid) -> Result<Oid, GitError> {
    let mut roots = repo.find_root_commits(tip)?;

    match roots.len() {
        1 => Ok(roots.remove(0)),
        0 => Err(GitError::ObjectNotFound {
            oid: format!("root commit of {}", tip.short(7)),
        }),
        _ => Err(GitError::AmbiguousRoot {
            candidates: roots.iter().map(|oid| oid.short(7).to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    /// Calls the fake repository records, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Checkout(String),
        CreateBranch(String),
        SoftReset(Oid),
        Commit(String),
    }

    /// In-memory stand-in for a repository.
    ///
    /// Holds a tip, a set of roots, and knobs to make individual steps fail.
    struct FakeRepo {
        tip: Oid,
        roots: Vec<Oid>,
        backup_exists: bool,
        staged_matches_root: bool,
        calls: RefCell<Vec<Call>>,
    }

    fn oid(byte: char) -> Oid {
        Oid::new(byte.to_string().repeat(40)).unwrap()
    }

    impl FakeRepo {
        fn linear() -> Self {
            Self {
                tip: oid('c'),
                roots: vec![oid('a')],
                backup_exists: false,
                staged_matches_root: false,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl Repository for FakeRepo {
        fn checkout_branch(&self, name: &BranchName) -> Result<(), GitError> {
            self.calls
                .borrow_mut()
                .push(Call::Checkout(name.to_string()));
            Ok(())
        }

        fn branch_tip(&self, _name: &BranchName) -> Result<Oid, GitError> {
            Ok(self.tip.clone())
        }

        fn create_branch(&self, name: &BranchName, _target: &Oid) -> Result<(), GitError> {
            if self.backup_exists {
                return Err(GitError::RefAlreadyExists {
                    refname: name.ref_name(),
                });
            }
            self.calls
                .borrow_mut()
                .push(Call::CreateBranch(name.to_string()));
            Ok(())
        }

        fn find_root_commits(&self, _tip: &Oid) -> Result<Vec<Oid>, GitError> {
            Ok(self.roots.clone())
        }

        fn soft_reset(&self, target: &Oid) -> Result<(), GitError> {
            self.calls
                .borrow_mut()
                .push(Call::SoftReset(target.clone()));
            Ok(())
        }

        fn commit_staged(&self, message: &str) -> Result<Oid, GitError> {
            if self.staged_matches_root {
                return Err(GitError::NothingToCommit);
            }
            self.calls
                .borrow_mut()
                .push(Call::Commit(message.to_string()));
            Ok(oid('f'))
        }
    }

    #[test]
    fn success_runs_steps_in_order() {
        let repo = FakeRepo::linear();

        let outcome = run(&repo, Verbosity::Quiet).unwrap();

        assert_eq!(
            repo.calls(),
            vec![
                Call::Checkout("master".to_string()),
                Call::CreateBranch("backup-branch".to_string()),
                Call::SoftReset(oid('a')),
                Call::Commit(SQUASH_MESSAGE.to_string()),
            ]
        );
        assert_eq!(outcome.original_tip, oid('c'));
        assert_eq!(outcome.root, oid('a'));
        assert_eq!(outcome.squash_commit, oid('f'));
    }

    #[test]
    fn backup_collision_aborts_before_any_mutation() {
        let repo = FakeRepo {
            backup_exists: true,
            ..FakeRepo::linear()
        };

        let err = run(&repo, Verbosity::Quiet).unwrap_err();

        assert!(matches!(err, GitError::RefAlreadyExists { .. }));
        // Checkout happened, but no reset and no commit.
        assert_eq!(repo.calls(), vec![Call::Checkout("master".to_string())]);
    }

    #[test]
    fn ambiguous_root_aborts_before_reset() {
        let repo = FakeRepo {
            roots: vec![oid('a'), oid('b')],
            ..FakeRepo::linear()
        };

        let err = run(&repo, Verbosity::Quiet).unwrap_err();

        match err {
            GitError::AmbiguousRoot { candidates } => {
                assert_eq!(candidates, vec!["a".repeat(7), "b".repeat(7)]);
            }
            other => panic!("expected AmbiguousRoot, got {other:?}"),
        }
        assert!(!repo
            .calls()
            .iter()
            .any(|call| matches!(call, Call::SoftReset(_) | Call::Commit(_))));
    }

    #[test]
    fn empty_squash_fails_after_reset() {
        let repo = FakeRepo {
            staged_matches_root: true,
            ..FakeRepo::linear()
        };

        let err = run(&repo, Verbosity::Quiet).unwrap_err();

        assert!(matches!(err, GitError::NothingToCommit));
        // The reset already happened; the backup branch is the recovery path.
        assert_eq!(
            repo.calls(),
            vec![
                Call::Checkout("master".to_string()),
                Call::CreateBranch("backup-branch".to_string()),
                Call::SoftReset(oid('a')),
            ]
        );
    }

    #[test]
    fn backup_is_created_at_the_original_tip() {
        let repo = FakeRepo::linear();
        let outcome = run(&repo, Verbosity::Quiet).unwrap();
        assert_eq!(outcome.original_tip, repo.tip);
    }
}
