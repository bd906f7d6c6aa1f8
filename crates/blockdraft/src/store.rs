//! Diagram persistence.
//!
//! Stores hold the structured-dump bytes of each diagram, so what is read
//! back is exactly what [`Diagram::to_json_bytes`] produced. Every write
//! validates first and writes nothing on failure.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::{debug, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

use blockdraft_core::model::{Diagram, DiagramId, ModelError};

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("diagram {0} already exists")]
    AlreadyExists(DiagramId),

    #[error("diagram {0} does not exist")]
    Missing(DiagramId),

    #[error("diagram failed validation: {0}")]
    Validation(#[from] ModelError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A diagram repository keyed by [`DiagramId`].
pub trait DiagramStore: Send + Sync {
    /// Stores a new diagram.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the id is taken.
    fn insert(&self, diagram: &Diagram) -> Result<(), StoreError>;

    fn get(&self, id: DiagramId) -> Result<Option<Diagram>, StoreError>;

    /// Overwrites an existing diagram.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Missing`] if the id is unknown.
    fn save(&self, diagram: &Diagram) -> Result<(), StoreError>;

    /// Removes a diagram. Returns `false` if it did not exist.
    fn delete(&self, id: DiagramId) -> Result<bool, StoreError>;

    /// All diagrams, most recently created first.
    fn list(&self) -> Result<Vec<Diagram>, StoreError>;
}

fn encode(diagram: &Diagram) -> Result<Vec<u8>, StoreError> {
    diagram.validate()?;
    Ok(diagram.to_json_bytes()?)
}

fn newest_first(diagrams: &mut [Diagram]) {
    diagrams.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<DiagramId, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<DiagramId, Vec<u8>>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl DiagramStore for MemoryStore {
    fn insert(&self, diagram: &Diagram) -> Result<(), StoreError> {
        let bytes = encode(diagram)?;
        let mut entries = self.entries()?;
        if entries.contains_key(&diagram.id()) {
            return Err(StoreError::AlreadyExists(diagram.id()));
        }
        entries.insert(diagram.id(), bytes);
        Ok(())
    }

    fn get(&self, id: DiagramId) -> Result<Option<Diagram>, StoreError> {
        let entries = self.entries()?;
        entries
            .get(&id)
            .map(|bytes| Diagram::from_json_slice(bytes))
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&self, diagram: &Diagram) -> Result<(), StoreError> {
        let bytes = encode(diagram)?;
        let mut entries = self.entries()?;
        match entries.get_mut(&diagram.id()) {
            Some(slot) => {
                *slot = bytes;
                Ok(())
            }
            None => Err(StoreError::Missing(diagram.id())),
        }
    }

    fn delete(&self, id: DiagramId) -> Result<bool, StoreError> {
        Ok(self.entries()?.remove(&id).is_some())
    }

    fn list(&self) -> Result<Vec<Diagram>, StoreError> {
        let entries = self.entries()?;
        let mut diagrams = entries
            .values()
            .map(|bytes| Diagram::from_json_slice(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        newest_first(&mut diagrams);
        Ok(diagrams)
    }
}

/// One `<id>.json` file per diagram in a directory.
///
/// Writes go to a temporary file in the same directory that is then renamed
/// over the target, so a reader never sees a partial file. Inserts refuse to
/// replace an existing file.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| StoreError::io(&root, err))?;
        debug!(root:? = root; "Opened file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: DiagramId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn stage(&self, bytes: &[u8]) -> Result<NamedTempFile, StoreError> {
        let mut temp =
            NamedTempFile::new_in(&self.root).map_err(|err| StoreError::io(&self.root, err))?;
        temp.write_all(bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|err| StoreError::io(temp.path(), err))?;
        Ok(temp)
    }

    fn read(&self, path: &Path) -> Result<Option<Diagram>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Diagram::from_json_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }
}

impl DiagramStore for FileStore {
    fn insert(&self, diagram: &Diagram) -> Result<(), StoreError> {
        let bytes = encode(diagram)?;
        let path = self.path_for(diagram.id());
        match self.stage(&bytes)?.persist_noclobber(&path) {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(diagram.id()))
            }
            Err(err) => Err(StoreError::io(&path, err.error)),
        }
    }

    fn get(&self, id: DiagramId) -> Result<Option<Diagram>, StoreError> {
        self.read(&self.path_for(id))
    }

    fn save(&self, diagram: &Diagram) -> Result<(), StoreError> {
        let bytes = encode(diagram)?;
        let path = self.path_for(diagram.id());
        if !path.exists() {
            return Err(StoreError::Missing(diagram.id()));
        }
        self.stage(&bytes)?
            .persist(&path)
            .map_err(|err| StoreError::io(&path, err.error))?;
        Ok(())
    }

    fn delete(&self, id: DiagramId) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StoreError::io(&path, err)),
        }
    }

    /// Unreadable or invalid files are skipped with a warning.
    fn list(&self) -> Result<Vec<Diagram>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|err| StoreError::io(&self.root, err))?;

        let mut diagrams = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| StoreError::io(&self.root, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path) {
                Ok(Some(diagram)) => diagrams.push(diagram),
                Ok(None) => {}
                Err(err) => warn!(path:? = path, err:%; "Skipping unreadable diagram file"),
            }
        }
        newest_first(&mut diagrams);
        Ok(diagrams)
    }
}
