use super::{not_found, Registry};
use crate::error::Result;
use crate::model::{MetadataUpdate, RepositoryEntry};
use crate::translate::{make_bilingual, Language};

/// Trimmed text, or `None` when nothing is left to store.
fn cleaned(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Registry {
    /// Edit the optional display fields of an entry.
    ///
    /// A description that matches the stored text for its source language
    /// keeps the existing translations; a changed one is re-translated.
    /// Translation happens before the write lock is taken.
    pub fn update_metadata(&self, id: &str, update: MetadataUpdate) -> Result<RepositoryEntry> {
        let source = Language::parse_or_default(update.source_lang.as_deref());

        // outer None: leave the description as stored
        let description = match update.description {
            None => None,
            Some(value) => match cleaned(value) {
                None => Some(None),
                Some(text) => {
                    let state = self.store.load()?;
                    let entry = state.find(id).ok_or_else(|| not_found(id))?;
                    let current = entry
                        .description
                        .as_ref()
                        .map(|d| d.text_in(source.code()))
                        .unwrap_or("");
                    if text == current {
                        None
                    } else {
                        log::debug!("translating description of {id} from {}", source.code());
                        Some(Some(make_bilingual(&text, source, self.translator.as_ref())))
                    }
                }
            },
        };

        self.mutate(|state| {
            let entry = state.find_mut(id).ok_or_else(|| not_found(id))?;

            if let Some(value) = update.display_name {
                entry.display_name = cleaned(value);
            }
            if let Some(value) = description {
                entry.description = value;
            }
            if let Some(value) = update.url {
                entry.url = cleaned(value);
            }

            log::info!("updated metadata of {id}");
            Ok(entry.clone())
        })
    }
}
