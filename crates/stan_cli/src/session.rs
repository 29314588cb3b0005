//! Session storage and clipboard for the shell.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use stan_app::effects::clipboard::ClipboardResult;
use tracing::{debug, info};

pub trait SessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// Lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStore {
    values: BTreeMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// A JSON object of keys to values, so consecutive commands share a session.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            debug!("Session file does not exist yet. path: {:?}", self.path);
            return Ok(BTreeMap::new());
        }

        let content =
            fs::read_to_string(&self.path).with_context(|| format!("Unable to read session file. path: {:?}", self.path))?;
        let values = serde_json::from_str(&content)
            .with_context(|| format!("Unable to parse session file. path: {:?}", self.path))?;

        Ok(values)
    }

    fn save(&self, values: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content).with_context(|| format!("Unable to write session file. path: {:?}", self.path))?;

        info!("Saved session. path: {:?}", self.path);
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

pub trait ClipboardProvider {
    fn read(&self) -> ClipboardResult;
}

/// A terminal has no clipboard the shell is allowed to read.
pub struct NoClipboard;

impl ClipboardProvider for NoClipboard {
    fn read(&self) -> ClipboardResult {
        ClipboardResult::PermissionDenied
    }
}
