// Transcript logging of every generation exchange
use crate::llm::ChatMessage;
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Serialize)]
struct TranscriptEntry<'a> {
    phase: &'a str,
    attempt: u32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    latency_ms: u64,
    timestamp: String,
}

/// Outcome of one exchange as recorded in the transcript
#[derive(Debug, Clone, Copy)]
pub enum Exchange<'a> {
    Response(&'a str),
    Error(&'a str),
}

/// Appends one JSON line per generation call
#[derive(Clone)]
pub struct TranscriptLogger {
    writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl TranscriptLogger {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        let writer = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(Arc::new(Mutex::new(BufWriter::new(file)))),
                Err(e) => {
                    warn!("Failed to open transcript file {:?}: {}", path, e);
                    None
                }
            }
        });

        Self { writer }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(
        &self,
        phase: &str,
        attempt: u32,
        messages: &[ChatMessage],
        exchange: Exchange<'_>,
        latency_ms: u64,
    ) {
        let Some(writer) = &self.writer else {
            return;
        };

        let (response, error) = match exchange {
            Exchange::Response(text) => (Some(text), None),
            Exchange::Error(detail) => (None, Some(detail)),
        };
        let entry = TranscriptEntry {
            phase,
            attempt,
            messages,
            response,
            error,
            latency_ms,
            timestamp: Utc::now().to_rfc3339(),
        };

        if let Ok(mut writer) = writer.lock() {
            match serde_json::to_string(&entry) {
                Ok(json) => {
                    if let Err(e) = writeln!(writer, "{}", json) {
                        warn!("Failed to write transcript entry: {}", e);
                    }
                    if let Err(e) = writer.flush() {
                        warn!("Failed to flush transcript: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize transcript entry for phase {}: {}", phase, e);
                }
            }
        }

        debug!(phase, attempt, latency_ms, "Transcript entry written");
    }
}

impl std::fmt::Debug for TranscriptLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptLogger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
