//! Registry of tracked repositories.
//!
//! The registry is one JSON document (`repos.json`): the entries in insertion
//! order plus the id of the default repository. Every mutation reloads the
//! document, applies the change and writes it back atomically while holding
//! the registry's write lock.

mod discover;
mod metadata;

pub use discover::scan;

use crate::config::Settings;
use crate::error::{GlyphError, Result};
use crate::git::is_repository;
use crate::model::{
    DefaultOutcome, DeleteOutcome, ListedRepo, RegistryState, RepoListing, RepositoryEntry,
};
use crate::store::JsonStore;
use crate::translate::Translator;
use chrono::Utc;
use parking_lot::Mutex;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub struct Registry {
    store: JsonStore<RegistryState>,
    base: PathBuf,
    bootstrap: Vec<String>,
    translator: Arc<dyn Translator>,
    write_lock: Mutex<()>,
}

/// A live registry entry together with where it sits on disk.
#[derive(Debug, Clone)]
pub struct ResolvedRepo {
    pub entry: RepositoryEntry,
    pub full_path: PathBuf,
}

impl ResolvedRepo {
    pub fn repo_name(&self) -> String {
        self.full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.entry.name.clone())
    }
}

/// Registry id for a relative path: every separator becomes `_`.
pub fn repo_id(path: &str) -> String {
    path.replace(['/', '\\'], "_")
}

fn normalize_path(path: &str) -> String {
    path.trim().trim_end_matches(['/', '\\']).to_string()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn not_found(id: &str) -> GlyphError {
    GlyphError::NotFound(format!("Repository not found: {id}"))
}

impl Registry {
    pub fn new(settings: &Settings, translator: Arc<dyn Translator>) -> Self {
        Self {
            store: JsonStore::new(settings.registry_file()),
            base: settings.repos_base.clone(),
            bootstrap: settings.bootstrap.clone(),
            translator,
            write_lock: Mutex::new(()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        self.base.join(path)
    }

    /// Seed the document from the bootstrap candidates unless it already
    /// exists. Returns whether seeding happened.
    pub fn initialize(&self) -> Result<bool> {
        let _guard = self.write_lock.lock();
        if self.store.exists() {
            return Ok(false);
        }

        let mut state = RegistryState::default();
        for candidate in &self.bootstrap {
            let path = normalize_path(candidate);
            if path.is_empty() {
                continue;
            }
            let full_path = self.full_path(&path);
            if !is_repository(&full_path) {
                log::debug!("bootstrap candidate {} is not a repository", full_path.display());
                continue;
            }
            let id = repo_id(&path);
            if state.find(&id).is_some() {
                continue;
            }
            state.repos.push(RepositoryEntry {
                id,
                name: base_name(&full_path),
                path,
                display_name: None,
                description: None,
                url: None,
                added_at: Utc::now(),
            });
        }

        log::info!(
            "seeded registry {} with {} of {} bootstrap repositories",
            self.store.path().display(),
            state.repos.len(),
            self.bootstrap.len()
        );
        self.store.save(&state)?;
        Ok(true)
    }

    pub fn state(&self) -> Result<RegistryState> {
        self.store.load()
    }

    pub fn list(&self) -> Result<RepoListing> {
        let state = self.store.load()?;
        let default_repo = state.default_repo.clone();

        let mut repos: Vec<ListedRepo> = state
            .repos
            .into_iter()
            .filter_map(|entry| {
                let full_path = self.full_path(&entry.path);
                if !is_repository(&full_path) {
                    log::debug!("skipping dead repository {}", entry.id);
                    return None;
                }
                Some(ListedRepo {
                    is_default: default_repo.as_deref() == Some(entry.id.as_str()),
                    full_path: full_path.to_string_lossy().into_owned(),
                    id: entry.id,
                    name: entry.name,
                    display_name: entry.display_name,
                    description: entry.description,
                    url: entry.url,
                    path: entry.path,
                })
            })
            .collect();

        repos.sort_by_cached_key(|r| {
            (
                !r.is_default,
                r.display_name.as_deref().unwrap_or(&r.name).to_lowercase(),
            )
        });

        Ok(RepoListing {
            repos,
            default_repo,
        })
    }

    pub fn add(&self, path: &str, name: Option<&str>) -> Result<RepositoryEntry> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(GlyphError::Validation("Repository path is required".to_string()));
        }
        let relative = Path::new(&path);
        if relative.is_absolute()
            || path.starts_with(['/', '\\'])
            || relative.components().any(|c| matches!(c, Component::ParentDir))
        {
            return Err(GlyphError::Validation(format!(
                "Repository path must stay inside {}",
                self.base.display()
            )));
        }

        let full_path = self.full_path(&path);
        if !is_repository(&full_path) {
            return Err(GlyphError::NotFound(format!(
                "No git repository at {}",
                full_path.display()
            )));
        }

        let id = repo_id(&path);
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| base_name(&full_path));

        self.mutate(|state| {
            if state.find(&id).is_some() {
                return Err(GlyphError::Conflict(format!(
                    "Repository {id} is already registered"
                )));
            }
            let entry = RepositoryEntry {
                id: id.clone(),
                path: path.clone(),
                name,
                display_name: None,
                description: None,
                url: None,
                added_at: Utc::now(),
            };
            state.repos.push(entry.clone());
            log::info!("registered repository {} at {}", entry.id, full_path.display());
            Ok(entry)
        })
    }

    pub fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        self.mutate(|state| {
            if state.repos.len() <= 1 {
                return Err(GlyphError::Validation(
                    "Cannot delete the last repository".to_string(),
                ));
            }
            let before = state.repos.len();
            state.repos.retain(|r| r.id != id);
            if state.repos.len() == before {
                return Err(not_found(id));
            }
            if state.default_repo.as_deref() == Some(id) {
                state.default_repo = state.repos.first().map(|r| r.id.clone());
            }
            log::info!("removed repository {id}");
            Ok(DeleteOutcome {
                success: true,
                new_default_repo: state.default_repo.clone(),
            })
        })
    }

    pub fn set_default(&self, id: &str) -> Result<DefaultOutcome> {
        self.mutate(|state| {
            if state.find(id).is_none() {
                return Err(not_found(id));
            }
            state.default_repo = Some(id.to_string());
            log::info!("default repository is now {id}");
            Ok(DefaultOutcome {
                success: true,
                default_repo: id.to_string(),
            })
        })
    }

    /// Look up a live entry by id.
    pub fn resolve(&self, id: &str) -> Result<ResolvedRepo> {
        let state = self.store.load()?;
        let entry = state.find(id).cloned().ok_or_else(|| not_found(id))?;
        let full_path = self.full_path(&entry.path);
        if !is_repository(&full_path) {
            return Err(not_found(id));
        }
        Ok(ResolvedRepo { entry, full_path })
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut RegistryState) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock();
        let mut state = self.store.load()?;
        let out = apply(&mut state)?;
        self.store.save(&state)?;
        Ok(out)
    }
}
