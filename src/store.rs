//! Persistence for [`EngineState`].
//!
//! A save is a compare-and-swap on `revision`: the stored revision must be
//! exactly one below the incoming one. A second writer (another replica, a
//! stale process) therefore gets `StoreError::Conflict` instead of silently
//! resetting the debounce timer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::state::EngineState;

#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when nothing was ever saved.
    async fn load(&self) -> Result<Option<EngineState>, StoreError>;
    async fn save(&self, state: &EngineState) -> Result<(), StoreError>;
}

fn check_revision(current: u64, incoming: u64) -> Result<(), StoreError> {
    let expected = incoming.saturating_sub(1);
    if current != expected {
        return Err(StoreError::Conflict {
            expected,
            found: current,
        });
    }
    Ok(())
}

/// JSON file on local disk, replaced atomically through a temp file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<EngineState>, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state: EngineState = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.path.display())))?;
        Ok(Some(state.normalized()))
    }
}

#[async_trait::async_trait]
impl StateStore for FileStore {
    async fn load(&self) -> Result<Option<EngineState>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let current = self.read().await?.map(|s| s.revision).unwrap_or(0);
        check_revision(current, state.revision)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let body = serde_json::to_vec_pretty(state)
            .map_err(|e| StoreError::Corrupt(format!("serialize state: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-process store. `set_available(false)` simulates an outage.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Option<EngineState>>,
    down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: EngineState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            down: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.down.store(!available, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Option<EngineState> {
        self.state.lock().await.clone()
    }

    fn ensure_up(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<EngineState>, StoreError> {
        self.ensure_up()?;
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        self.ensure_up()?;
        let mut slot = self.state.lock().await;
        let current = slot.as_ref().map(|s| s.revision).unwrap_or(0);
        check_revision(current, state.revision)?;
        *slot = Some(state.clone());
        Ok(())
    }
}
