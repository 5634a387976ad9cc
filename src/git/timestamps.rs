use crate::error::{GlyphError, Result};
use chrono::NaiveDate;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_LOG_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FIRST_COMMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads commit timestamps by running `git log` in a child process.
///
/// Each invocation is bounded by a timeout. When it elapses the child is
/// killed and the call fails with [`GlyphError::Timeout`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct GitLog {
    program: String,
    log_timeout: Duration,
    first_commit_timeout: Duration,
}

impl Default for GitLog {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitLog {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            log_timeout: DEFAULT_LOG_TIMEOUT,
            first_commit_timeout: DEFAULT_FIRST_COMMIT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, log_timeout: Duration, first_commit_timeout: Duration) -> Self {
        self.log_timeout = log_timeout;
        self.first_commit_timeout = first_commit_timeout;
        self
    }

    /// `YYYY-MM-DD HH` for every commit reachable from any ref, in `git log` order.
    pub async fn hour_stamps(&self, repo: &Path, since: Option<NaiveDate>) -> Result<Vec<String>> {
        let mut args = vec![
            "log".to_string(),
            "--all".to_string(),
            "--format=%ad".to_string(),
            "--date=format:%Y-%m-%d %H".to_string(),
        ];
        if let Some(since) = since {
            // a bare date means "that day at the current time" to git
            args.push(format!("--since={} 00:00:00", since.format("%Y-%m-%d")));
        }
        let stdout = self.run(repo, &args, self.log_timeout).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Date of the oldest commit, `None` for a repository without commits.
    pub async fn first_commit_date(&self, repo: &Path) -> Result<Option<String>> {
        let args = [
            "log".to_string(),
            "--all".to_string(),
            "--reverse".to_string(),
            "--format=%ad".to_string(),
            "--date=format:%Y-%m-%d".to_string(),
        ];
        let stdout = self.run(repo, &args, self.first_commit_timeout).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string))
    }

    async fn run(&self, repo: &Path, args: &[String], timeout: Duration) -> Result<String> {
        if !super::is_repository(repo) {
            return Err(GlyphError::NotFound(format!(
                "Repository not found: {}",
                repo.display()
            )));
        }

        let describe = format!("{} {}", self.program, args.first().map(String::as_str).unwrap_or(""));
        log::debug!("running {} -C {} {}", self.program, repo.display(), args.join(" "));

        let child = Command::new(&self.program)
            .arg("-C")
            .arg(repo)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GlyphError::ExternalTool(format!("cannot start {}: {e}", self.program)))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| GlyphError::ExternalTool(format!("{describe} failed: {e}")))?,
            Err(_) => {
                log::warn!("{describe} in {} exceeded {:?}", repo.display(), timeout);
                return Err(GlyphError::Timeout {
                    command: describe,
                    after: timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GlyphError::ExternalTool(format!(
                "{describe} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
