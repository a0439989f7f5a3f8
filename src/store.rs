//! File-backed key/value store used to persist POST bodies against their URI.
//!
//! Stands in for the predecessor's `ndbm`-backed store: an append-only record
//! log on disk, with an in-memory index rebuilt from it at startup. There is no
//! `ndbm` binding in this workspace's dependency stack, so records are instead a
//! simple length-prefixed log, the same shape `original_source` would have
//! produced if it had rolled its own instead of reaching for `ndbm`.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// `URI -> body bytes` map, persisted to `path` and rebuilt into memory on open.
/// Concurrent writers to the same key resolve last-writer-wins: the log is
/// append-only, and the index keeps only the most recently read record for a
/// given key.
pub struct KeyValueStore {
    path: PathBuf,
    index: Mutex<HashMap<String, Vec<u8>>>,
}

impl KeyValueStore {
    /// Opens (creating if absent) the record log at `path` and rebuilds the
    /// in-memory index by replaying it front-to-back.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut index = HashMap::new();

        if path.exists() {
            let mut file = File::open(&path)?;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            replay(&bytes, &mut index);
        }

        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    /// Persists `value` under `key`, appending a new record to the log and
    /// updating the in-memory index. A later `put` for the same key wins.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(&encode_record(key, value))?;

        let mut index = self.index.lock().expect("key/value store index poisoned");
        index.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    /// Returns the most recently persisted value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let index = self.index.lock().expect("key/value store index poisoned");
        index.get(key).cloned()
    }
}

fn encode_record(key: &str, value: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(8 + key.len() + value.len());
    record.extend_from_slice(&(key.len() as u32).to_le_bytes());
    record.extend_from_slice(&(value.len() as u32).to_le_bytes());
    record.extend_from_slice(key.as_bytes());
    record.extend_from_slice(value);
    record
}

fn replay(bytes: &[u8], index: &mut HashMap<String, Vec<u8>>) {
    let mut pos = 0;
    while pos + 8 <= bytes.len() {
        let key_len = u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
        let value_len = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
        pos += 8;

        if pos + key_len + value_len > bytes.len() {
            break; // truncated trailing record, ignore
        }

        let key = String::from_utf8_lossy(&bytes[pos..pos + key_len]).into_owned();
        let value = bytes[pos + key_len..pos + key_len + value_len].to_vec();
        pos += key_len + value_len;

        index.insert(key, value);
    }
}

/// Removes the backing file. Used by integration tests to reset state between
/// runs; production code never deletes the log.
#[cfg(test)]
pub fn remove_backing_file(path: &Path) {
    let _ = std::fs::remove_file(path);
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("foreman-store-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn put_then_get_round_trips() {
        let path = temp_path("roundtrip");
        remove_backing_file(&path);
        let store = KeyValueStore::open(&path).unwrap();
        store.put("/upload", b"hello").unwrap();
        assert_eq!(Some(b"hello".to_vec()), store.get("/upload"));
        remove_backing_file(&path);
    }

    #[test]
    fn later_put_wins_for_same_key() {
        let path = temp_path("lastwriter");
        remove_backing_file(&path);
        let store = KeyValueStore::open(&path).unwrap();
        store.put("/upload", b"first").unwrap();
        store.put("/upload", b"second").unwrap();
        assert_eq!(Some(b"second".to_vec()), store.get("/upload"));
        remove_backing_file(&path);
    }

    #[test]
    fn reopening_rebuilds_index_from_the_log() {
        let path = temp_path("reopen");
        remove_backing_file(&path);
        {
            let store = KeyValueStore::open(&path).unwrap();
            store.put("/a", b"1").unwrap();
            store.put("/b", b"2").unwrap();
        }
        let reopened = KeyValueStore::open(&path).unwrap();
        assert_eq!(Some(b"1".to_vec()), reopened.get("/a"));
        assert_eq!(Some(b"2".to_vec()), reopened.get("/b"));
        remove_backing_file(&path);
    }

    #[test]
    fn missing_key_returns_none() {
        let path = temp_path("missing");
        remove_backing_file(&path);
        let store = KeyValueStore::open(&path).unwrap();
        assert_eq!(None, store.get("/nope"));
        remove_backing_file(&path);
    }
}
