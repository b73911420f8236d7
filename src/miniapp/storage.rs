use anyhow::{Context, Result, anyhow};
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Client-local key/value storage. Values are whole documents, rewritten on every save.
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(data))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        atomic_write(&self.path_for(key), value.as_bytes())
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    fail_writes: bool,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, for exercising rollback paths.
    pub fn failing() -> Self {
        Self {
            items: HashMap::new(),
            fail_writes: true,
        }
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("storage is read-only"));
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(data).context("write temp file")?;
    tmp.flush().context("flush temp file")?;
    tmp.as_file_mut().sync_all().context("sync temp file")?;
    tmp.persist(path)
        .map_err(|e| anyhow!("persist {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_key() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("shortcuts").unwrap(), None);
    }

    #[test]
    fn test_file_storage_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));
        storage.set_item("shortcuts", "[]").unwrap();
        storage.set_item("shortcuts", r#"[{"name":"a","id":"b"}]"#).unwrap();

        assert_eq!(
            storage.get_item("shortcuts").unwrap().as_deref(),
            Some(r#"[{"name":"a","id":"b"}]"#)
        );
        assert!(storage.path_for("shortcuts").ends_with("nested/shortcuts.json"));
    }

    #[test]
    fn test_memory_storage_failing_writes() {
        let mut storage = MemoryStorage::failing();
        assert!(storage.set_item("k", "v").is_err());
        assert_eq!(storage.get_item("k").unwrap(), None);
    }
}
