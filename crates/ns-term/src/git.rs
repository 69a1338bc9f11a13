// SPDX-License-Identifier: MIT
//
// Git panel — a thin wrapper over the `git` binary.
//
// Every operation is one `git` invocation in the repository directory,
// run synchronously; the binary calls these from worker threads. Output
// is decoded lossily. A missing `git` binary and a non-zero exit are both
// ordinary errors the panel shows as text.
//
// `git status --porcelain` lines are `XY path`: X is the index column,
// Y the work-tree column. A file counts as modified/added/deleted if
// either column says so; `??` is untracked.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum GitError {
    /// `git` could not be run at all.
    Unavailable(io::Error),
    /// `git` ran and exited non-zero.
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The directory is not inside a repository.
    NotARepository(PathBuf),
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Git is not available: {e}"),
            Self::Failed {
                command, stderr, ..
            } => {
                write!(f, "Git {command} failed")?;
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            Self::NotARepository(dir) => write!(f, "Not in a git repository: {}", dir.display()),
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable(e) => Some(e),
            _ => None,
        }
    }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where one file stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Untracked,
    Clean,
}

/// Parsed `git status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub branch: String,
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl GitStatus {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
    }

    /// `Modified: n Added: n ...` listing only non-empty groups, or
    /// `Working directory clean`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_clean() {
            return "Working directory clean".to_string();
        }
        [
            ("Modified", &self.modified),
            ("Added", &self.added),
            ("Deleted", &self.deleted),
            ("Untracked", &self.untracked),
        ]
        .iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(label, files)| format!("{label}: {}", files.len()))
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Status of a repository-relative path.
    #[must_use]
    pub fn file_status(&self, path: &str) -> FileStatus {
        let has = |list: &[String]| list.iter().any(|p| p == path);
        if has(&self.modified) {
            FileStatus::Modified
        } else if has(&self.added) {
            FileStatus::Added
        } else if has(&self.deleted) {
            FileStatus::Deleted
        } else if has(&self.untracked) {
            FileStatus::Untracked
        } else {
            FileStatus::Clean
        }
    }
}

/// Parse `git status --porcelain` output. The branch is left empty.
#[must_use]
pub fn parse_porcelain(output: &str) -> GitStatus {
    let mut status = GitStatus::default();
    for line in output.lines() {
        if line.len() < 4 || !line.is_char_boundary(3) {
            continue;
        }
        let (code, path) = (&line[..2], line[3..].to_string());
        if code == "??" {
            status.untracked.push(path);
        } else if code.contains('M') {
            status.modified.push(path);
        } else if code.contains('A') {
            status.added.push(path);
        } else if code.contains('D') {
            status.deleted.push(path);
        }
    }
    status
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// A working directory known to be inside a git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    /// `git rev-parse --git-dir` in `dir`.
    ///
    /// # Errors
    ///
    /// [`GitError::NotARepository`] outside a repository,
    /// [`GitError::Unavailable`] without a `git` binary.
    pub fn detect(dir: &Path) -> Result<Self, GitError> {
        let git = Self {
            dir: dir.to_path_buf(),
        };
        match git.run(&["rev-parse", "--git-dir"]) {
            Ok(_) => {
                info!(dir = %dir.display(), "git repository detected");
                Ok(git)
            }
            Err(GitError::Failed { .. }) => Err(GitError::NotARepository(dir.to_path_buf())),
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current branch, `unknown` when git cannot tell (detached HEAD).
    #[must_use]
    pub fn branch(&self) -> String {
        self.run(&["branch", "--show-current"])
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Branch plus porcelain status.
    ///
    /// # Errors
    ///
    /// Any [`GitError`] from `git status`.
    pub fn status(&self) -> Result<GitStatus, GitError> {
        let out = self.run(&["status", "--porcelain"])?;
        let mut status = parse_porcelain(&out);
        status.branch = self.branch();
        Ok(status)
    }

    /// `git add .`
    ///
    /// # Errors
    ///
    /// Any [`GitError`].
    pub fn add_all(&self) -> Result<String, GitError> {
        self.run(&["add", "."])
            .map(|_| "All changes added to staging".to_string())
    }

    /// `git commit -m MESSAGE`
    ///
    /// # Errors
    ///
    /// Any [`GitError`].
    pub fn commit(&self, message: &str) -> Result<String, GitError> {
        self.run(&["commit", "-m", message])
            .map(|_| "Changes committed successfully".to_string())
    }

    /// `git pull`
    ///
    /// # Errors
    ///
    /// Any [`GitError`].
    pub fn pull(&self) -> Result<String, GitError> {
        self.run(&["pull"]).map(|out| with_default(out, "Pull completed"))
    }

    /// `git push`
    ///
    /// # Errors
    ///
    /// Any [`GitError`].
    pub fn push(&self) -> Result<String, GitError> {
        self.run(&["push"]).map(|out| with_default(out, "Push completed"))
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(?args, dir = %self.dir.display(), "git");
        let out = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .map_err(GitError::Unavailable)?;
        if out.status.success() {
            Ok(String::from_utf8_lossy(&out.stdout).into_owned())
        } else {
            let err = GitError::Failed {
                command: args.first().copied().unwrap_or_default().to_string(),
                code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            };
            warn!(error = %err, "git command failed");
            Err(err)
        }
    }
}

fn with_default(out: String, fallback: &str) -> String {
    let trimmed = out.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PORCELAIN: &str = concat!(
        " M src/lib.rs\n",
        "M  README.md\n",
        "A  new.rs\n",
        " D gone.rs\n",
        "?? scratch.txt\n",
        "R  old.rs -> renamed.rs\n",
    );

    #[test]
    fn porcelain_groups() {
        let s = parse_porcelain(PORCELAIN);
        assert_eq!(s.modified, vec!["src/lib.rs", "README.md"]);
        assert_eq!(s.added, vec!["new.rs"]);
        assert_eq!(s.deleted, vec!["gone.rs"]);
        assert_eq!(s.untracked, vec!["scratch.txt"]);
        assert_eq!(s.file_status("new.rs"), FileStatus::Added);
        assert_eq!(s.file_status("other.rs"), FileStatus::Clean);
    }

    #[test]
    fn summary_lists_non_empty_groups() {
        let s = parse_porcelain(PORCELAIN);
        assert_eq!(s.summary(), "Modified: 2 Added: 1 Deleted: 1 Untracked: 1");
        let s = parse_porcelain("?? a\n");
        assert_eq!(s.summary(), "Untracked: 1");
        assert_eq!(parse_porcelain("").summary(), "Working directory clean");
    }

    #[test]
    fn failure_display_includes_stderr() {
        let err = GitError::Failed {
            command: "push".into(),
            code: Some(1),
            stderr: "fatal: no upstream\n".into(),
        };
        assert_eq!(err.to_string(), "Git push failed: fatal: no upstream");
    }

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    #[test]
    fn detect_outside_a_repository() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        // A tempdir may itself live under a repository; only check the
        // error shape when it does not.
        if let Err(e) = Git::detect(dir.path()) {
            assert!(matches!(e, GitError::NotARepository(_)));
        }
    }

    #[test]
    fn status_of_a_fresh_repository() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let init = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(init.success());
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();

        let git = Git::detect(dir.path()).unwrap();
        let status = git.status().unwrap();
        assert_eq!(status.untracked, vec!["a.txt"]);

        git.add_all().unwrap();
        let status = git.status().unwrap();
        assert_eq!(status.added, vec!["a.txt"]);
        assert!(status.untracked.is_empty());
    }
}
