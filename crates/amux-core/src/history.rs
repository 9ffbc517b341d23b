//! Last-activity lookup from the agent activity log.
//!
//! The log is a JSON-lines file (`~/.claude/history.jsonl` by default) with
//! one `{"timestamp": <millis>, "project": "<path>"}` record per prompt. It
//! only ever grows, so the derived mapping is cached and rebuilt only when
//! the file's modification time changes.
//!
//! # Locking
//!
//! The cache is guarded by a single [`std::sync::Mutex`]. The critical
//! section covers the mtime comparison, the re-scan and the cache swap, so
//! concurrent callers never scan the file twice for the same mtime. Callers
//! run on blocking threads (`spawn_blocking`), never on the async executor.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::error::{ParseError, ParseResult};

/// Per-project last activity.
pub type ActivityMap = HashMap<String, DateTime<Utc>>;

/// Read buffer sized for long prompt lines.
const READ_BUFFER_SIZE: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    project: String,
}

/// Parses one log line into `(project, timestamp)`.
pub fn parse_record(line: &str) -> ParseResult<(String, DateTime<Utc>)> {
    parse_record_bytes(line.as_bytes())
}

/// Same as [`parse_record`] on raw bytes; invalid UTF-8 is a parse error.
pub fn parse_record_bytes(line: &[u8]) -> ParseResult<(String, DateTime<Utc>)> {
    let record: HistoryRecord =
        serde_json::from_slice(line).map_err(|e| ParseError::invalid("history record", e))?;

    if record.project.is_empty() {
        return Err(ParseError::Empty("project".to_string()));
    }
    if record.timestamp == 0 {
        return Err(ParseError::Empty("timestamp".to_string()));
    }

    let timestamp = DateTime::from_timestamp_millis(record.timestamp)
        .ok_or_else(|| ParseError::invalid("timestamp", record.timestamp))?;
    Ok((record.project, timestamp))
}

/// Folds a whole log into the max timestamp per project.
///
/// Malformed lines are skipped; a read error ends the scan with what was
/// gathered so far.
pub fn parse_history<R: Read>(reader: R) -> ActivityMap {
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, reader);
    let mut map = ActivityMap::new();

    // Raw lines: one record with bad bytes must not end the scan
    for line in reader.split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Stopped reading activity history");
                break;
            }
        };
        let line = line.strip_suffix(b"\r").unwrap_or(line.as_slice());
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match parse_record_bytes(line) {
            Ok((project, timestamp)) => {
                map.entry(project)
                    .and_modify(|current| {
                        if timestamp > *current {
                            *current = timestamp;
                        }
                    })
                    .or_insert(timestamp);
            }
            Err(e) => trace!(error = %e, "Skipping history record"),
        }
    }

    map
}

// ============================================================================
// Cached History
// ============================================================================

#[derive(Debug)]
struct CacheEntry {
    modified: SystemTime,
    map: Arc<ActivityMap>,
}

/// Activity log reader with an mtime-keyed cache.
#[derive(Debug)]
pub struct ActivityHistory {
    path: Option<PathBuf>,
    cache: Mutex<Option<CacheEntry>>,
}

impl ActivityHistory {
    /// Creates a reader for `path`. `None` disables lookups entirely.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Default log location under `home`.
    pub fn default_path(home: Option<&Path>) -> Option<PathBuf> {
        home.map(|home| home.join(".claude").join("history.jsonl"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the per-project last-activity mapping.
    ///
    /// An unchanged file returns the same shared mapping as the previous
    /// call. A missing file, unknown path or unreadable metadata yields
    /// `None`; this never fails the caller.
    ///
    /// Blocking: call via `spawn_blocking`.
    pub fn last_active_by_project(&self) -> Option<Arc<ActivityMap>> {
        let path = self.path.as_deref()?;

        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "Activity history unavailable");
                return None;
            }
        };

        // A poisoned lock only means a previous scan panicked; the cache
        // slot itself is still a valid Option.
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = cache.as_ref() {
            if entry.modified == modified {
                return Some(Arc::clone(&entry.map));
            }
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open activity history");
                return None;
            }
        };

        let map = Arc::new(parse_history(file));
        debug!(path = %path.display(), projects = map.len(), "Activity history rescanned");

        *cache = Some(CacheEntry {
            modified,
            map: Arc::clone(&map),
        });
        Some(map)
    }
}
