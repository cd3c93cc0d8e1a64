//! Append-only audit stream: one JSON record per line, writes serialized through a
//! mutex.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    Start {
        timestamp: String,
        tool_version: String,
        user: String,
        machine: String,
        pid: u32,
        parameters: String,
    },
    FileModified {
        timestamp: String,
        path: String,
        pre_hash: Option<String>,
        post_hash: Option<String>,
    },
    FileCreated {
        timestamp: String,
        path: String,
        post_hash: Option<String>,
    },
    FileDeleted {
        timestamp: String,
        path: String,
    },
    Error {
        timestamp: String,
        kind: String,
        message: String,
    },
    End {
        timestamp: String,
        migrated: usize,
        failed: usize,
        warned: usize,
    },
}

pub struct AuditStream {
    file: Mutex<File>,
}

impl AuditStream {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    /// One writer at a time; each event is one JSON object on its own line.
    pub fn append(&self, event: &AuditEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(event).expect("audit events always serialize");
        let mut file = self.file.lock().expect("audit stream poisoned");
        writeln!(file, "{line}")?;
        file.flush()
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn start_event(tool_version: &str, parameters: &str) -> AuditEvent {
    AuditEvent::Start {
        timestamp: now(),
        tool_version: tool_version.to_string(),
        user: std::env::var("USER").or_else(|_| std::env::var("USERNAME")).unwrap_or_else(|_| "unknown".into()),
        machine: hostname(),
        pid: std::process::id(),
        parameters: parameters.to_string(),
    }
}

pub fn file_modified_event(path: &str, pre_hash: Option<String>, post_hash: Option<String>) -> AuditEvent {
    AuditEvent::FileModified { timestamp: now(), path: path.to_string(), pre_hash, post_hash }
}

pub fn file_created_event(path: &str, post_hash: Option<String>) -> AuditEvent {
    AuditEvent::FileCreated { timestamp: now(), path: path.to_string(), post_hash }
}

pub fn error_event(kind: &str, message: &str) -> AuditEvent {
    AuditEvent::Error { timestamp: now(), kind: kind.to_string(), message: message.to_string() }
}

pub fn end_event(migrated: usize, failed: usize, warned: usize) -> AuditEvent {
    AuditEvent::End { timestamp: now(), migrated, failed, warned }
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_event_no_interleaving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let stream = AuditStream::create(&path).unwrap();
        stream.append(&start_event("0.1.0", "root=/tmp")).unwrap();
        stream.append(&file_created_event("App.csproj", Some("abc".into()))).unwrap();
        stream.append(&end_event(1, 0, 0)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).expect("each line is valid json");
        }
        assert!(lines[0].contains(r#""event_type":"start""#));
        assert!(lines[2].contains(r#""event_type":"end""#));
    }
}
