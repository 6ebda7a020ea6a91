//! Setpoint storage adapters.
//!
//! Implement [`ConfigPort`] for the cabinet controller.  The setpoints are
//! persisted as a JSON text blob (`serde_json`), one flat object of
//! key/value pairs.
//!
//! - [`FileConfigStore`]: a named file on the local filesystem.
//! - [`MemoryConfigStore`]: in-memory backend for tests and simulation,
//!   with write-failure injection.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SetpointConfig;

/// Upper bound on a stored blob; anything larger is treated as corrupt.
const MAX_BLOB_SIZE: usize = 4000;

fn decode(text: &str) -> Result<SetpointConfig, ConfigError> {
    if text.len() > MAX_BLOB_SIZE {
        return Err(ConfigError::Corrupted);
    }
    serde_json::from_str(text).map_err(|_| ConfigError::Corrupted)
}

fn encode(config: &SetpointConfig) -> Result<String, ConfigError> {
    serde_json::to_string(config).map_err(|_| ConfigError::IoError)
}

// ───────────────────────────────────────────────────────────────
// File backend
// ───────────────────────────────────────────────────────────────

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("FileConfigStore: {}", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for FileConfigStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<SetpointConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound
            } else {
                warn!("FileConfigStore: read {} failed: {}", self.path.display(), e);
                ConfigError::IoError
            }
        })?;
        let cfg = decode(&text)?;
        info!("FileConfigStore: loaded {} bytes", text.len());
        Ok(cfg)
    }

    fn save(&mut self, config: &SetpointConfig) -> Result<(), ConfigError> {
        let text = encode(config)?;
        // Write-then-rename so a power cut never leaves a half-written file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text.as_bytes())
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                warn!("FileConfigStore: write {} failed: {}", self.path.display(), e);
                ConfigError::IoError
            })
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory backend
// ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryConfigStore {
    blob: Option<String>,
    saves: usize,
    fail_writes: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a raw text blob (e.g. a corrupt one).
    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: Some(blob.to_owned()),
            ..Self::default()
        }
    }

    /// Make every subsequent `save` fail with [`ConfigError::IoError`].
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Decoded copy of the stored blob, if any.
    pub fn stored(&self) -> Option<SetpointConfig> {
        self.blob.as_deref().and_then(|b| decode(b).ok())
    }
}

impl ConfigPort for MemoryConfigStore {
    fn exists(&self) -> bool {
        self.blob.is_some()
    }

    fn load(&self) -> Result<SetpointConfig, ConfigError> {
        self.blob
            .as_deref()
            .ok_or(ConfigError::NotFound)
            .and_then(decode)
    }

    fn save(&mut self, config: &SetpointConfig) -> Result<(), ConfigError> {
        if self.fail_writes {
            return Err(ConfigError::IoError);
        }
        self.blob = Some(encode(config)?);
        self.saves += 1;
        Ok(())
    }
}
