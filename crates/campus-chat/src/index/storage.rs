use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::ChatError;
use crate::index::snapshot::VectorIndexSnapshot;

const SNAPSHOT_FILE: &str = "index.json";

/// Durable home of the index: one JSON file, replaced atomically on save
#[derive(Debug, Clone)]
pub struct SnapshotStore {
  dir: PathBuf,
}

impl SnapshotStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn path(&self) -> PathBuf {
    self.dir.join(SNAPSHOT_FILE)
  }

  pub fn exists(&self) -> bool {
    self.path().exists()
  }

  /// Write to a sibling temp file, then rename over the old snapshot
  pub fn save(&self, snapshot: &VectorIndexSnapshot) -> Result<(), ChatError> {
    fs::create_dir_all(&self.dir)?;

    let temp = NamedTempFile::new_in(&self.dir)?;
    {
      let mut writer = BufWriter::new(temp.as_file());
      serde_json::to_writer(&mut writer, snapshot)?;
      writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(self.path()).map_err(|e| ChatError::Io(e.error))?;

    Ok(())
  }

  pub fn load(&self) -> Result<VectorIndexSnapshot, ChatError> {
    let path = self.path();
    let file = match File::open(&path) {
      Ok(file) => file,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(ChatError::NotFound { path })
      }
      Err(e) => return Err(e.into()),
    };

    Ok(serde_json::from_reader(BufReader::new(file))?)
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }
}
