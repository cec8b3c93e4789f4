//! JSON-lines export of Soul Points broadcasts

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::points::{PointsUpdate, POINTS_EVENT};

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("write: {0}")]
    Write(#[from] io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct EventRecord<'a> {
    event: &'static str,
    at: String,
    detail: &'a PointsUpdate,
}

/// Append-only file of broadcasts, one JSON object per line
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl EventLog {
    pub fn open(path: &Path) -> Result<Self, EventLogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| EventLogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| EventLogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, update: &PointsUpdate) -> Result<(), EventLogError> {
        let record = EventRecord {
            event: POINTS_EVENT,
            at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            detail: update,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
