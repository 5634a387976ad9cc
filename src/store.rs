use crate::error::{GlyphError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One JSON document on disk, read whole and rewritten whole.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the document, so readers never observe a partially written file.
pub struct JsonStore<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the document, or the default value if it was never written.
    pub fn load(&self) -> Result<T> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(GlyphError::Storage(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            GlyphError::Storage(format!("corrupt document {}: {e}", self.path.display()))
        })
    }

    pub fn save(&self, value: &T) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
                GlyphError::Storage(format!("cannot encode {}: {e}", self.path.display()))
            })?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            GlyphError::Storage(format!("cannot replace {}: {}", self.path.display(), e.error))
        })?;
        log::debug!("wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegistryState;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_document_loads_as_default() {
        let dir = tempdir().unwrap();
        let store: JsonStore<RegistryState> = JsonStore::new(dir.path().join("repos.json"));
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), RegistryState::default());
    }

    #[test]
    fn save_creates_parent_and_replaces_document() {
        let dir = tempdir().unwrap();
        let store: JsonStore<RegistryState> =
            JsonStore::new(dir.path().join("nested").join("repos.json"));

        let mut state = RegistryState::default();
        state.default_repo = Some("first".into());
        store.save(&state).unwrap();
        state.default_repo = Some("second".into());
        store.save(&state).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap().default_repo.as_deref(), Some("second"));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "repos.json")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn corrupt_document_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repos.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store: JsonStore<RegistryState> = JsonStore::new(&path);
        assert!(matches!(store.load(), Err(GlyphError::Storage(_))));
    }
}
