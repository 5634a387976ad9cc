pub mod timestamps;

pub use timestamps::GitLog;

use std::path::Path;

/// A directory is a live repository when it holds `.git` metadata
/// (a directory, or the file a worktree uses).
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}
