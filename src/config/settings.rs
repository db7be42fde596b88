use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;

use super::loader;
use super::types::AppConfig;

/// Live, shared view of the configuration.
///
/// Cheaply cloneable. Any holder may change the values at any time; the
/// engine takes a fresh copy at the start of every round and never caches
/// values across rounds.
#[derive(Clone, Default)]
pub struct Settings {
    inner: Arc<RwLock<AppConfig>>,
    source: Option<PathBuf>,
}

impl Settings {
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            source: None,
        }
    }

    /// Settings backed by a file that [`Settings::reload`] re-reads.
    pub fn with_source(config: AppConfig, source: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            source,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Copy of the current values.
    pub fn current(&self) -> AppConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, config: AppConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn update(&self, f: impl FnOnce(&mut AppConfig)) {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *config);
    }

    /// Re-read the backing file. Without a file this is a no-op.
    ///
    /// On error the previous values stay in place.
    pub fn reload(&self) -> Result<()> {
        let Some(ref path) = self.source else {
            return Ok(());
        };
        let config = loader::read_config(path)?;
        self.replace(config);
        tracing::debug!("config: reloaded {}", path.display());
        Ok(())
    }
}
