use std::{collections::HashSet, io::Error, path::PathBuf};

pub const PROCESSED_RELEASES_STATE: &str = "processed_releases";

#[derive(Debug)]
pub enum StateError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for StateError {
    fn from(err: Error) -> Self {
        StateError::IoError(err)
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::IoError(e) => write!(f, "state io error: {}", e),
            StateError::SerdeError(e) => write!(f, "state serde error: {}", e),
        }
    }
}

impl std::error::Error for StateError {}

/// Small key-value persistence seam for pipeline state.
///
/// The incremental sync policy only needs to load and store a flat list of
/// ids; hiding the file system behind this trait lets tests run the policy
/// against an in-memory store.
pub trait StateStore {
    fn load(&self) -> impl Future<Output = Result<Vec<String>, StateError>> + Send;
    fn save(&self, items: &[String]) -> impl Future<Output = Result<(), StateError>> + Send;
}

/// JSON-file backed store under `freshtracks/state/{name}.json`.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(name: &str) -> Self {
        Self {
            path: crate::config::data_path(&format!("state/{}.json", name)),
        }
    }
}

impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Vec<String>, StateError> {
        let json = async_fs::read_to_string(&self.path)
            .await
            .map_err(StateError::IoError)?;
        serde_json::from_str(&json).map_err(StateError::SerdeError)
    }

    async fn save(&self, items: &[String]) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(StateError::IoError)?;
        }

        let json = serde_json::to_string_pretty(items).map_err(StateError::SerdeError)?;
        async_fs::write(&self.path, json)
            .await
            .map_err(StateError::IoError)
    }
}

/// Persisted set of album ids already incorporated into the playlist.
///
/// Grows monotonically; it only shrinks when the backing file is removed by
/// hand. A store with no saved state yet yields an empty log.
pub struct ProcessedReleaseLog {
    ids: HashSet<String>,
}

impl ProcessedReleaseLog {
    pub fn empty() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }

    pub async fn load<S: StateStore>(store: &S) -> Result<Self, StateError> {
        match store.load().await {
            Ok(items) => Ok(Self {
                ids: items.into_iter().collect(),
            }),
            Err(StateError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::empty())
            }
            Err(e) => Err(e),
        }
    }

    pub fn contains(&self, album_id: &str) -> bool {
        self.ids.contains(album_id)
    }

    pub fn insert(&mut self, album_id: String) -> bool {
        self.ids.insert(album_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub async fn persist<S: StateStore>(&self, store: &S) -> Result<(), StateError> {
        let mut items: Vec<String> = self.ids.iter().cloned().collect();
        items.sort();
        store.save(&items).await
    }
}
