//! Audit sinks.
//!
//! Searches never fail because of the audit trail: the orchestrator logs a
//! failed [`AuditSink::record`] and carries on.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::audit::event::AuditEvent;
use crate::error::{ArancelError, Result};

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Persist one event.
    fn record(&self, event: &AuditEvent) -> Result<()>;

    /// Every recorded event, oldest first.
    fn history(&self) -> Result<Vec<AuditEvent>>;
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn history(&self) -> Result<Vec<AuditEvent>> {
        Ok(self.events())
    }
}

/// Appends events to a file, one JSON object per line.
#[derive(Debug)]
pub struct JsonlAuditSink {
    path: PathBuf,
    writer: Mutex<()>,
}

impl JsonlAuditSink {
    /// Sink writing to `path`. The file is created on the first record.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonlAuditSink {
            path: path.as_ref().to_path_buf(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every event of a JSON-lines file.
    ///
    /// A missing file is an empty history. Blank lines are skipped; any
    /// other unreadable line is an error naming its line number.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<AuditEvent>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut events = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| {
                ArancelError::audit(format!(
                    "{}:{}: malformed event: {e}",
                    path.display(),
                    line_no + 1
                ))
            })?;
            events.push(event);
        }
        Ok(events)
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;

        let _guard = self.writer.lock();
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                ArancelError::audit(format!("Failed to open {}: {e}", self.path.display()))
            })?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn history(&self) -> Result<Vec<AuditEvent>> {
        let _guard = self.writer.lock();
        Self::load(&self.path)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: &AuditEvent) -> Result<()> {
        Ok(())
    }

    fn history(&self) -> Result<Vec<AuditEvent>> {
        Ok(Vec::new())
    }
}
