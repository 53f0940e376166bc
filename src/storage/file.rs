/// File-backed key-value backend.
///
/// One file per key under a data directory. Keys are hex-encoded into file
/// names, so wallet addresses with arbitrary characters stay filesystem-safe
/// and `keys()` can recover them losslessly.
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::KeyValueStorage;
use crate::error::Result;

pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hex::encode(key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            // Files not written by this backend are skipped.
            let Ok(decoded) = hex::decode(stem) else {
                continue;
            };
            if let Ok(key) = String::from_utf8(decoded) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(storage.get("vault_EQwallet1").unwrap().is_none());
        storage.set("vault_EQwallet1", "{\"v\":1}").unwrap();
        assert_eq!(
            storage.get("vault_EQwallet1").unwrap().as_deref(),
            Some("{\"v\":1}")
        );

        storage.remove("vault_EQwallet1").unwrap();
        assert!(storage.get("vault_EQwallet1").unwrap().is_none());
        storage.remove("vault_EQwallet1").unwrap();
    }

    #[test]
    fn test_keys_recover_original_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        // wallet addresses may contain characters unsafe in file names
        storage.set("ns_EQab/cd+ef=", "x").unwrap();
        storage.set("ns_UQ0:v-KDm", "y").unwrap();

        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["ns_EQab/cd+ef=", "ns_UQ0:v-KDm"]);
    }

    #[test]
    fn test_foreign_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        fs::write(dir.path().join("README.txt"), "hi").unwrap();
        fs::write(dir.path().join("zz-not-hex.json"), "hi").unwrap();
        storage.set("real_key", "v").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["real_key"]);
    }

    #[test]
    fn test_reopen_sees_existing_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path()).unwrap();
            storage.set("k", "persisted").unwrap();
        }
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("persisted"));
    }
}
