use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::heat::HeatmapStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Bilingual(BTreeMap<String, String>),
    /// Documents written before descriptions were bilingual.
    Plain(String),
}

impl Description {
    pub fn text_in(&self, lang: &str) -> &str {
        match self {
            Description::Bilingual(texts) => texts.get(lang).map(String::as_str).unwrap_or(""),
            Description::Plain(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    pub id: String,
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl RepositoryEntry {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryState {
    #[serde(default)]
    pub repos: Vec<RepositoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_repo: Option<String>,
}

impl RegistryState {
    pub fn find(&self, id: &str) -> Option<&RepositoryEntry> {
        self.repos.iter().find(|r| r.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut RepositoryEntry> {
        self.repos.iter_mut().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedRepo {
    pub id: String,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<Description>,
    pub url: Option<String>,
    pub path: String,
    pub full_path: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoListing {
    pub repos: Vec<ListedRepo>,
    pub default_repo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredRepo {
    pub id: String,
    pub path: String,
    pub name: String,
    pub full_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverOutput {
    pub discovered: Vec<DiscoveredRepo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub success: bool,
    pub new_default_repo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultOutcome {
    pub success: bool,
    pub default_repo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRepo {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial metadata edit. The outer `Option` says whether a field was sent
/// at all, the inner one carries the value; `Some(None)` and blank text
/// both clear the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataUpdate {
    #[serde(default, deserialize_with = "present")]
    pub display_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,
    #[serde(default, rename = "source_lang")]
    pub source_lang: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapOutput {
    pub repo: String,
    pub repo_name: String,
    pub since_date: String,
    pub commits: BTreeMap<String, u32>,
    pub stats: HeatmapStats,
}
