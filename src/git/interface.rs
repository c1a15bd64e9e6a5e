//! git::interface
//!
//! Git interface implementation using git2.
//!
//! The [`Git`] struct is the only way to interact with a Git repository.
//! No other module should import `git2` directly. This ensures:
//!
//! - Consistent error handling across all Git operations
//! - Strong type guarantees at the boundary
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants. The ones the squash
//! sequence aborts on:
//!
//! - [`GitError::RefNotFound`]: primary branch missing
//! - [`GitError::DirtyWorktree`]: checkout would overwrite local changes
//! - [`GitError::RefAlreadyExists`]: backup branch name collision
//! - [`GitError::AmbiguousRoot`]: more than one parentless commit
//! - [`GitError::NothingToCommit`]: squash tree identical to the root tree
//! - [`GitError::OperationInProgress`]: rebase/merge/cherry-pick in flight

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, Oid, TypeError};

/// Errors from Git operations.
///
/// The categorization mirrors the failure modes of the squash sequence,
/// so the orchestrator can abort with a diagnostic naming exactly what
/// went wrong.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// A ref with this name already exists.
    ///
    /// Raised when creating the backup branch collides with a leftover from
    /// an earlier run. The run is not idempotent; delete the branch manually
    /// to retry.
    #[error("ref already exists: {refname}")]
    RefAlreadyExists {
        /// The colliding ref
        refname: String,
    },

    /// Git operation in progress (rebase, merge, etc.).
    #[error("{operation} in progress")]
    OperationInProgress {
        /// The type of operation in progress
        operation: GitState,
    },

    /// Working tree has uncommitted changes.
    #[error("working tree is dirty: {details}")]
    DirtyWorktree {
        /// Description of what's dirty
        details: String,
    },

    /// History has more than one parentless commit.
    ///
    /// Happens when unrelated histories were merged. There is no unique
    /// reset target in that case, so the run aborts rather than picking one.
    #[error("multiple root commits found: {}", .candidates.join(", "))]
    AmbiguousRoot {
        /// Abbreviated ids of every parentless commit, sorted
        candidates: Vec<String>,
    },

    /// The staged tree is identical to the root commit's tree.
    #[error("nothing to commit: the index already matches the root commit")]
    NothingToCommit,

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context.contains("ref") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::Exists => GitError::RefAlreadyExists {
                refname: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn internal(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidBranchName(msg) => GitError::Internal { message: msg },
        }
    }
}

/// State of in-progress Git operations.
///
/// A repository that is mid-rebase or mid-merge is incompatible with the
/// squash sequence; the run refuses to start until the operation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitState {
    /// No operation in progress.
    Clean,
    /// Rebase in progress.
    Rebase,
    /// Merge in progress.
    Merge,
    /// Cherry-pick in progress.
    CherryPick,
    /// Revert in progress.
    Revert,
    /// Bisect in progress.
    Bisect,
    /// Apply mailbox in progress.
    ApplyMailbox,
}

impl GitState {
    /// Check if any operation is in progress.
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }

    /// Get a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            GitState::Clean => "clean",
            GitState::Rebase => "rebase",
            GitState::Merge => "merge",
            GitState::CherryPick => "cherry-pick",
            GitState::Revert => "revert",
            GitState::Bisect => "bisect",
            GitState::ApplyMailbox => "apply-mailbox",
        }
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Summary of working tree status.
///
/// Used to describe what exactly blocked a checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is clean (untracked files do not count).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. All repository
/// reads and writes flow through this interface.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root, so
    /// `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    // =========================================================================
    // State Detection
    // =========================================================================

    /// Get the current Git state (rebase, merge, etc.).
    pub fn state(&self) -> GitState {
        match self.repo.state() {
            git2::RepositoryState::Clean => GitState::Clean,
            git2::RepositoryState::Rebase
            | git2::RepositoryState::RebaseInteractive
            | git2::RepositoryState::RebaseMerge => GitState::Rebase,
            git2::RepositoryState::Merge => GitState::Merge,
            git2::RepositoryState::CherryPick | git2::RepositoryState::CherryPickSequence => {
                GitState::CherryPick
            }
            git2::RepositoryState::Revert | git2::RepositoryState::RevertSequence => {
                GitState::Revert
            }
            git2::RepositoryState::Bisect => GitState::Bisect,
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase => {
                GitState::ApplyMailbox
            }
        }
    }

    /// Get working tree status summary.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(GitError::internal)?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    // =========================================================================
    // Branch Operations
    // =========================================================================

    /// Check if a local branch exists.
    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.repo
            .find_branch(name.as_str(), git2::BranchType::Local)
            .is_ok()
    }

    /// Resolve a local branch to its tip commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the branch doesn't exist
    pub fn branch_tip(&self, name: &BranchName) -> Result<Oid, GitError> {
        let refname = name.ref_name();
        let reference = self
            .repo
            .find_reference(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let oid = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, &refname))?
            .id();

        Oid::new(oid.to_string()).map_err(GitError::from)
    }

    /// Checkout a local branch: update the working tree and point HEAD at it.
    ///
    /// The checkout is "safe" in git's sense: it refuses to overwrite local
    /// modifications instead of discarding them.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the branch doesn't exist
    /// - [`GitError::DirtyWorktree`] if local changes would be overwritten
    pub fn checkout_branch(&self, name: &BranchName) -> Result<(), GitError> {
        let refname = name.ref_name();
        let reference = self
            .repo
            .find_reference(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let mut opts = git2::build::CheckoutBuilder::new();
        opts.safe();

        self.repo
            .checkout_tree(commit.as_object(), Some(&mut opts))
            .map_err(|e| {
                if e.code() == git2::ErrorCode::Conflict {
                    let details = match self.worktree_status() {
                        Ok(status) => format!(
                            "{} staged, {} unstaged change(s) would be overwritten",
                            status.staged, status.unstaged
                        ),
                        Err(_) => e.message().to_string(),
                    };
                    GitError::DirtyWorktree { details }
                } else {
                    GitError::from_git2(e, &refname)
                }
            })?;

        self.repo
            .set_head(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        Ok(())
    }

    /// Create a local branch pointing at the given commit.
    ///
    /// HEAD and the working tree are left untouched.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefAlreadyExists`] if a branch of that name exists
    /// - [`GitError::ObjectNotFound`] if the target commit doesn't exist
    pub fn create_branch(&self, name: &BranchName, target: &Oid) -> Result<(), GitError> {
        let oid = git2::Oid::from_str(target.as_str())
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        match self.repo.branch(name.as_str(), &commit, false) {
            Ok(_) => Ok(()),
            Err(e) if e.code() == git2::ErrorCode::Exists => Err(GitError::RefAlreadyExists {
                refname: name.ref_name(),
            }),
            Err(e) => Err(GitError::from_git2(e, name.as_str())),
        }
    }

    // =========================================================================
    // History Queries
    // =========================================================================

    /// Find every parentless commit reachable from `tip`, sorted.
    ///
    /// A linear history has exactly one. Grafted or merged unrelated
    /// histories can have several; the caller decides what to do with the
    /// ambiguity. Sorting keeps the result stable across runs.
    pub fn find_root_commits(&self, tip: &Oid) -> Result<Vec<Oid>, GitError> {
        let tip_oid = git2::Oid::from_str(tip.as_str())
            .map_err(|e| GitError::from_git2(e, tip.as_str()))?;

        let mut revwalk = self.repo.revwalk().map_err(GitError::internal)?;
        revwalk.push(tip_oid).map_err(GitError::internal)?;

        let mut roots = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(GitError::internal)?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| GitError::from_git2(e, &oid.to_string()))?;

            if commit.parent_count() == 0 {
                roots.push(Oid::new(oid.to_string())?);
            }
        }

        roots.sort();
        Ok(roots)
    }

    // =========================================================================
    // History Mutation
    // =========================================================================

    /// Soft-reset the current branch to the given commit.
    ///
    /// Moves the branch pointer (through HEAD) without touching the index or
    /// the working tree, so every change since `target` stays staged.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the target commit doesn't exist
    pub fn soft_reset(&self, target: &Oid) -> Result<(), GitError> {
        let oid = git2::Oid::from_str(target.as_str())
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        let object = self
            .repo
            .find_object(oid, Some(git2::ObjectType::Commit))
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;

        self.repo
            .reset(&object, git2::ResetType::Soft, None)
            .map_err(GitError::internal)?;

        Ok(())
    }

    /// Commit the staged index as a single parentless commit on HEAD's branch.
    ///
    /// The branch ends up with exactly one commit whose tree is the staged
    /// tree. Author and committer come from the repository's signature
    /// (`user.name` / `user.email`).
    ///
    /// # Errors
    ///
    /// - [`GitError::NothingToCommit`] if the staged tree is identical to
    ///   the tree of the commit HEAD currently points at
    pub fn commit_staged(&self, message: &str) -> Result<Oid, GitError> {
        let mut index = self.repo.index().map_err(GitError::internal)?;
        let tree_oid = index.write_tree().map_err(GitError::internal)?;

        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        if head.tree_id() == tree_oid {
            return Err(GitError::NothingToCommit);
        }

        let tree = self
            .repo
            .find_tree(tree_oid)
            .map_err(GitError::internal)?;

        let signature = self.repo.signature().map_err(|e| GitError::Internal {
            message: format!("cannot determine commit signature: {}", e.message()),
        })?;

        let commit_oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[])
            .map_err(GitError::internal)?;

        Oid::new(commit_oid.to_string()).map_err(GitError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_state {
        use super::*;

        #[test]
        fn clean_is_not_in_progress() {
            assert!(!GitState::Clean.is_in_progress());
        }

        #[test]
        fn operations_are_in_progress() {
            assert!(GitState::Rebase.is_in_progress());
            assert!(GitState::Merge.is_in_progress());
            assert!(GitState::CherryPick.is_in_progress());
            assert!(GitState::Revert.is_in_progress());
            assert!(GitState::Bisect.is_in_progress());
            assert!(GitState::ApplyMailbox.is_in_progress());
        }

        #[test]
        fn display_formatting() {
            assert_eq!(format!("{}", GitState::Clean), "clean");
            assert_eq!(format!("{}", GitState::CherryPick), "cherry-pick");
        }
    }

    mod worktree_status {
        use super::*;

        #[test]
        fn default_is_clean() {
            assert!(WorktreeStatus::default().is_clean());
        }

        #[test]
        fn staged_changes_are_dirty() {
            let status = WorktreeStatus {
                staged: 2,
                ..Default::default()
            };
            assert!(!status.is_clean());
        }

        #[test]
        fn untracked_files_are_not_dirty() {
            let status = WorktreeStatus {
                untracked: 5,
                ..Default::default()
            };
            assert!(status.is_clean());
        }
    }

    mod git_error {
        use super::*;

        #[test]
        fn ambiguous_root_lists_candidates() {
            let err = GitError::AmbiguousRoot {
                candidates: vec!["abc123d".to_string(), "def456a".to_string()],
            };
            let text = err.to_string();
            assert!(text.contains("abc123d"));
            assert!(text.contains("def456a"));
        }

        #[test]
        fn operation_in_progress_names_operation() {
            let err = GitError::OperationInProgress {
                operation: GitState::Merge,
            };
            assert_eq!(err.to_string(), "merge in progress");
        }
    }
}
