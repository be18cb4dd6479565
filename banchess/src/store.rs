//! Record files on disk.
//!
//! A record file is a PGN document with ban annotations in the movetext.
//! Writes go to a temporary file in the same directory that is then renamed
//! over the target, so readers never see a half-written record.
//!
//! Updates are optimistic: a writer states the record it read, and the
//! replacement is refused if the file no longer holds it. The compare and
//! the rename happen under a `<file>.lock` sidecar created exclusively, so
//! two writers cannot both pass the check.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use ban_chess::GameRecord;

pub fn read_record(path: &Path) -> anyhow::Result<GameRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let record = GameRecord::from_pgn(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Record loaded");
    Ok(record)
}

pub fn write_record(path: &Path, record: &GameRecord) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(record.to_pgn().as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Record written");
    Ok(())
}

/// Replace the record at `path` with `updated`, provided it still holds
/// `expected`.
pub fn replace_record(path: &Path, expected: &GameRecord, updated: &GameRecord) -> anyhow::Result<()> {
    let _lock = RecordLock::acquire(path)?;

    let current = read_record(path)?;
    if current != *expected {
        bail!(
            "{} changed since it was read; reload it and retry",
            path.display()
        );
    }
    write_record(path, updated)
}

/// Exclusive claim on a record file, held until dropped.
#[derive(Debug)]
pub struct RecordLock {
    path: PathBuf,
}

impl RecordLock {
    pub fn acquire(record: &Path) -> anyhow::Result<Self> {
        let path = lock_path(record);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => bail!(
                "{} is being updated by another writer (remove {} if none is running)",
                record.display(),
                path.display()
            ),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create {}", path.display()))
            }
        };
        writeln!(file, "{}", std::process::id())?;

        tracing::debug!(lock = %path.display(), "Record locked");
        Ok(Self { path })
    }
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_path(record: &Path) -> PathBuf {
    let mut name = record.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
