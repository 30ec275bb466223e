//! JSON snapshot files.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::store::StoreResult;

/// Read a snapshot, returning `None` when the file does not exist yet.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(Some(serde_json::from_reader(reader)?))
}

/// Write a snapshot next to its destination, then rename over it so a crash
/// mid-write never leaves a truncated file behind.
pub fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<BTreeMap<String, u64>> =
            read_snapshot(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_creates_parent_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u64);
        write_snapshot(&path, &map).unwrap();

        map.insert("b".to_string(), 2);
        write_snapshot(&path, &map).unwrap();

        let loaded: BTreeMap<String, u64> = read_snapshot(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
