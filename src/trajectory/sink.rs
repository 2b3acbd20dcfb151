//! Append-only destinations for [`MoveRecord`]s.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use super::types::MoveRecord;

/// Default directory for run logs.
pub const DEFAULT_LOG_DIR: &str = "data/raw_runs";

/// A durable, append-only store of move records.
pub trait LogSink: Send {
    /// Persist one record. Returns only after the record is written.
    fn append(&mut self, record: &MoveRecord) -> Result<()>;

    /// Where the records end up.
    fn location(&self) -> PathBuf;
}

// ---------------------------------------------------------------------------
// JSON Lines file sink
// ---------------------------------------------------------------------------

/// Writes one JSON object per line to a file under a log directory.
#[derive(Debug)]
pub struct JsonlLogSink {
    path: PathBuf,
    file: File,
}

impl JsonlLogSink {
    /// Open (or create) the sink file inside `dir`.
    ///
    /// `filename` defaults to `run_<YYYYmmdd_HHMMSS>.jsonl` in UTC. An existing
    /// file is appended to.
    pub fn create(dir: impl AsRef<Path>, filename: Option<&str>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let name = match filename {
            Some(name) => name.to_string(),
            None => format!("run_{}.jsonl", Utc::now().format("%Y%m%d_%H%M%S")),
        };
        let path = dir.join(name);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing::info!(path = %path.display(), "Opened move log");
        Ok(Self { path, file })
    }
}

impl LogSink for JsonlLogSink {
    fn append(&mut self, record: &MoveRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record).context("Failed to serialize move record")?;
        line.push(b'\n');
        self.file
            .write_all(&line)
            .and_then(|()| self.file.flush())
            .with_context(|| format!("Failed to append to {}", self.path.display()))
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

// ---------------------------------------------------------------------------
// In-memory sink
// ---------------------------------------------------------------------------

/// Keeps records in memory. Useful for embedding the engine and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    records: Vec<MoveRecord>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }
}

impl LogSink for MemoryLogSink {
    fn append(&mut self, record: &MoveRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(":memory:")
    }
}
