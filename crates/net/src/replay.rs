//! Click log recording and playback.
//!
//! Inbound container messages are recorded as JSON lines so a session can be
//! replayed headlessly against a fresh window.

use crate::protocol::ClientMessage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// One recorded inbound message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickLogEntry {
    /// Session tick when the message arrived.
    pub tick: u64,
    /// The decoded message.
    pub message: ClientMessage,
}

/// Writes inbound messages to a JSONL file.
pub struct ClickLogger {
    writer: BufWriter<File>,
    entries_written: u64,
}

impl ClickLogger {
    /// Create (truncate) a click log at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create click log: {:?}", path.as_ref()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            entries_written: 0,
        })
    }

    /// Append one message.
    pub fn log(&mut self, tick: u64, message: &ClientMessage) -> Result<()> {
        let entry = ClickLogEntry {
            tick,
            message: message.clone(),
        };
        serde_json::to_writer(&mut self.writer, &entry)?;
        writeln!(&mut self.writer)?;
        self.entries_written += 1;
        Ok(())
    }

    /// Flush buffered writes.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }
}

/// Sequential reader over a recorded click log.
pub struct ClickReplay {
    entries: Vec<ClickLogEntry>,
    current_index: usize,
}

impl ClickReplay {
    /// Load a click log from a JSONL file. Blank lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open click log: {:?}", path.as_ref()))?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: ClickLogEntry = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
            entries.push(entry);
        }

        Ok(Self {
            entries,
            current_index: 0,
        })
    }

    /// All messages recorded for `tick`. Entries from earlier ticks are skipped.
    pub fn messages_for_tick(&mut self, tick: u64) -> Vec<ClientMessage> {
        let mut messages = Vec::new();
        while let Some(entry) = self.entries.get(self.current_index) {
            if entry.tick > tick {
                break;
            }
            if entry.tick == tick {
                messages.push(entry.message.clone());
            }
            self.current_index += 1;
        }
        messages
    }

    /// Tick of the last recorded entry.
    pub fn last_tick(&self) -> Option<u64> {
        self.entries.last().map(|e| e.tick)
    }

    /// Total number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether every entry has been consumed.
    pub fn is_finished(&self) -> bool {
        self.current_index >= self.entries.len()
    }
}
