use crate::cli::CommonArgs;
use crate::git::timestamps::{DEFAULT_FIRST_COMMIT_TIMEOUT, DEFAULT_LOG_TIMEOUT};
use crate::git::GitLog;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const REGISTRY_FILE: &str = "repos.json";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Tracked repository paths are relative to this directory.
    pub repos_base: PathBuf,
    pub data_dir: PathBuf,
    /// First-run candidates, kept only if they are repositories at seeding time.
    pub bootstrap: Vec<String>,
    pub git_program: String,
    pub log_timeout: Duration,
    pub first_commit_timeout: Duration,
}

impl Settings {
    pub fn new<B: AsRef<Path>, D: AsRef<Path>>(repos_base: B, data_dir: D) -> Self {
        Self {
            repos_base: repos_base.as_ref().to_path_buf(),
            data_dir: data_dir.as_ref().to_path_buf(),
            bootstrap: Vec::new(),
            git_program: "git".to_string(),
            log_timeout: DEFAULT_LOG_TIMEOUT,
            first_commit_timeout: DEFAULT_FIRST_COMMIT_TIMEOUT,
        }
    }

    pub fn with_bootstrap<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bootstrap = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn registry_file(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE)
    }

    pub fn git_log(&self) -> GitLog {
        GitLog::new(self.git_program.clone())
            .with_timeouts(self.log_timeout, self.first_commit_timeout)
    }
}

impl From<&CommonArgs> for Settings {
    fn from(args: &CommonArgs) -> Self {
        Self {
            repos_base: args.base.clone(),
            data_dir: args.data_dir.clone(),
            bootstrap: args
                .bootstrap
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            git_program: args.git.clone(),
            log_timeout: args.log_timeout,
            first_commit_timeout: args.first_commit_timeout,
        }
    }
}
