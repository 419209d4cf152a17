//! `--restart` support: a log of completed units and their bindings.
//!
//! The concrete form of the "engine's restart primitive" `engine::run`
//! resumes from. Every unit that finishes appends one JSON line recording
//! its label and output bindings (reusing
//! `runtime::task_runner::{serialize_bindings, deserialize_bindings}`,
//! which already exist to move `Bindings<Value>` across a process
//! boundary). On `--restart`, a unit whose label is already in the log
//! short-circuits straight to its recorded bindings instead of re-running.

use crate::engine::error::{EngineError, EngineResult};
use crate::env::Bindings;
use crate::runtime::task_runner::{deserialize_bindings, serialize_bindings, SerializedBinding};
use crate::value::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(serde::Serialize, serde::Deserialize)]
struct CheckpointRecord {
    label: String,
    bindings: Vec<SerializedBinding<Value>>,
}

pub struct CheckpointLog {
    path: PathBuf,
    completed: Mutex<HashMap<String, Bindings<Value>>>,
}

impl CheckpointLog {
    /// Open a checkpoint log at `path`, loading any previously-recorded
    /// completions. The file need not exist yet (a fresh run creates it
    /// lazily on the first `record_completed`).
    pub fn open(path: PathBuf) -> EngineResult<Self> {
        let mut completed = HashMap::new();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            for line in content.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let record: CheckpointRecord = serde_json::from_str(line).map_err(|e| {
                    EngineError::Scheduling {
                        message: format!("corrupt checkpoint line: {}", e),
                    }
                })?;
                completed.insert(record.label, deserialize_bindings(record.bindings));
            }
        }
        Ok(Self {
            path,
            completed: Mutex::new(completed),
        })
    }

    /// Previously-recorded bindings for `label`, if any.
    pub fn lookup(&self, label: &str) -> Option<Bindings<Value>> {
        self.completed.lock().unwrap().get(label).cloned()
    }

    /// Append a completion record and make it visible to `lookup`.
    pub fn record_completed(&self, label: &str, bindings: &Bindings<Value>) -> EngineResult<()> {
        let record = CheckpointRecord {
            label: label.to_string(),
            bindings: serialize_bindings(bindings),
        };
        let line = serde_json::to_string(&record).map_err(|e| EngineError::Scheduling {
            message: format!("failed to serialize checkpoint record: {}", e),
        })?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        self.completed
            .lock()
            .unwrap()
            .insert(label.to_string(), bindings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_lookup_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let log = CheckpointLog::open(tmp.path().join("checkpoint.jsonl")).unwrap();
        let bindings = Bindings::new().bind("x".to_string(), Value::int(7), None);
        log.record_completed("decl-x", &bindings).unwrap();
        let restored = log.lookup("decl-x").unwrap();
        assert_eq!(restored.resolve("x"), Some(&Value::int(7)));
    }

    #[test]
    fn reopening_log_restores_prior_completions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("checkpoint.jsonl");
        {
            let log = CheckpointLog::open(path.clone()).unwrap();
            let bindings = Bindings::new().bind("y".to_string(), Value::int(3), None);
            log.record_completed("decl-y", &bindings).unwrap();
        }
        let reopened = CheckpointLog::open(path).unwrap();
        assert!(reopened.lookup("decl-y").is_some());
        assert!(reopened.lookup("decl-z").is_none());
    }
}
