use super::{repo_id, Registry};
use crate::error::Result;
use crate::git::is_repository;
use crate::model::{DiscoverOutput, DiscoveredRepo};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Component, Path};

/// Deepest directory level examined, the base itself being level 0.
const MAX_DEPTH: usize = 2;

/// Walk `base` for repository roots.
///
/// Hidden directories are skipped, and nothing below a repository root is
/// visited, so nested repositories and submodules never show up.
pub fn scan(base: &Path) -> Vec<DiscoveredRepo> {
    let walker = WalkBuilder::new(base)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .max_depth(Some(MAX_DEPTH))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let below_repo = entry.depth() > 0
                && entry.path().parent().map(is_repository).unwrap_or(false);
            is_dir && !below_repo
        })
        .build();

    let mut found = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("discovery skipped an entry: {e}");
                continue;
            }
        };
        if entry.depth() == 0 || !is_repository(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        let path = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        found.push(DiscoveredRepo {
            id: repo_id(&path),
            name: entry.file_name().to_string_lossy().into_owned(),
            full_path: entry.path().to_string_lossy().into_owned(),
            path,
        });
    }
    found
}

impl Registry {
    /// Repositories under the base directory that are not registered yet.
    pub fn discover(&self) -> Result<DiscoverOutput> {
        if !self.base.is_dir() {
            log::warn!("discovery base {} does not exist", self.base.display());
            return Ok(DiscoverOutput {
                discovered: Vec::new(),
                error: Some("Base path not found".to_string()),
            });
        }

        let state = self.store.load()?;
        let registered: HashSet<&str> = state.repos.iter().map(|r| r.path.as_str()).collect();

        let discovered: Vec<DiscoveredRepo> = scan(&self.base)
            .into_iter()
            .filter(|candidate| !registered.contains(candidate.path.as_str()))
            .collect();
        log::info!(
            "discovered {} unregistered repositories under {}",
            discovered.len(),
            self.base.display()
        );

        Ok(DiscoverOutput {
            discovered,
            error: None,
        })
    }
}
