use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use commissioner_types::{BorderRouter, Domain, EntityId, Error, Network, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

/// The single-file JSON store layout (spec §6): four sequences, four
/// monotonic next-id counters, and the current-network cursor.
///
/// `rgr`/`rgr_seq` keep the original source's fifth "registrar" entity slot
/// in the wire format so a file this core writes stays structurally
/// comparable to one the original writes (spec SPEC_FULL.md §B); this core
/// never populates `rgr`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default)]
    pub rgr_seq: i64,
    #[serde(default)]
    pub dom_seq: i64,
    #[serde(default)]
    pub nwk_seq: i64,
    #[serde(default)]
    pub br_seq: i64,

    #[serde(default)]
    pub rgr: Vec<serde_json::Value>,
    #[serde(default)]
    pub dom: Vec<Domain>,
    #[serde(default)]
    pub nwk: Vec<Network>,
    #[serde(default)]
    pub br: Vec<BorderRouter>,

    #[serde(default = "default_cur_nwk")]
    pub cur_nwk: i64,
}

fn default_cur_nwk() -> i64 {
    EntityId::EMPTY.0
}

impl StoreFile {
    pub fn new() -> Self {
        StoreFile {
            cur_nwk: EntityId::EMPTY.0,
            ..Default::default()
        }
    }
}

/// An open handle onto the persisted store file. Every mutating operation
/// re-serializes the whole document and atomically replaces the file
/// (write-temp-then-rename) while holding an exclusive `flock` on it, which
/// is what serializes concurrent *processes*; within a process, the
/// `Registry` wrapping this handle treats its own calls as non-concurrent
/// (spec §5).
pub struct StoreHandle {
    path: PathBuf,
}

impl StoreHandle {
    /// Opens (creating if absent) the store file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, StoreFile)> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        file.lock_exclusive()
            .map_err(|e| Error::io_error(format!("failed to lock store file: {e}")))?;

        let mut contents = String::new();
        {
            let mut f = &file;
            f.read_to_string(&mut contents)?;
        }
        FileExt::unlock(&file)
            .map_err(|e| Error::io_error(format!("failed to unlock store file: {e}")))?;

        let store = if contents.trim().is_empty() {
            StoreFile::new()
        } else {
            serde_json::from_str(&contents)?
        };

        Ok((StoreHandle { path }, store))
    }

    /// Serializes `store` and atomically replaces the backing file, holding
    /// an exclusive lock for the duration of the write (spec §3, §5).
    pub fn save(&self, store: &StoreFile) -> Result<()> {
        let json = serde_json::to_string_pretty(store)?;

        let tmp_path = self.path.with_extension("json.tmp");
        let tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.lock_exclusive()
            .map_err(|e| Error::io_error(format!("failed to lock temp store file: {e}")))?;
        {
            let mut f = &tmp;
            f.write_all(json.as_bytes())?;
            f.sync_all()?;
        }
        FileExt::unlock(&tmp)
            .map_err(|e| Error::io_error(format!("failed to unlock temp store file: {e}")))?;

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_close_open_round_trips_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let (handle, mut store) = StoreHandle::open(&path).unwrap();
        store.dom_seq = 1;
        store.dom.push(Domain::new(EntityId(0), "d1"));
        handle.save(&store).unwrap();
        drop(handle);

        let (_handle2, store2) = StoreHandle::open(&path).unwrap();
        assert_eq!(store2.dom_seq, 1);
        assert_eq!(store2.dom.len(), 1);
        assert_eq!(store2.dom[0].name, "d1");
        assert_eq!(store2.cur_nwk, EntityId::EMPTY.0);
    }

    #[test]
    fn opening_missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let (_handle, store) = StoreHandle::open(&path).unwrap();
        assert_eq!(store.dom.len(), 0);
        assert_eq!(store.nwk.len(), 0);
        assert_eq!(store.br.len(), 0);
        assert_eq!(store.cur_nwk, -1);
    }
}
