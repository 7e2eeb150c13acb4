use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{TimeError, TimeOfDay, Weekday};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read festival document: {0}")]
    Io(#[from] std::io::Error),
    #[error("festival document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One artist's appearance. `time` is kept as the raw document string so a
/// malformed value fails the single performance when it is evaluated, never
/// the whole document load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performance {
    pub time: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<jiff::civil::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<jiff::civil::DateTime>,
    /// Explicit set length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Performance {
    pub fn start(&self) -> Result<TimeOfDay, TimeError> {
        TimeOfDay::parse(&self.time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub schedule: BTreeMap<Weekday, Vec<Performance>>,
}

impl Stage {
    /// The day's ordered performance sequence; a missing day key reads as an
    /// empty sequence.
    pub fn performances_on(&self, day: Weekday) -> &[Performance] {
        self.schedule.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FestivalData {
    pub festival_name: String,
    pub stages: Vec<Stage>,
}

impl FestivalData {
    pub fn from_json(src: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Walks every scheduled slot looking for the one `id` was derived from.
    pub fn resolve_identity(&self, id: &PerformanceIdentity) -> Option<ResolvedSlot<'_>> {
        for stage in &self.stages {
            for (day, performances) in &stage.schedule {
                for performance in performances {
                    if PerformanceIdentity::derive(&stage.name, *day, performance) == *id {
                        return Some(ResolvedSlot {
                            stage: &stage.name,
                            day: *day,
                            performance,
                        });
                    }
                }
            }
        }
        None
    }
}

/// A liked identity resolved back to its display info.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSlot<'a> {
    pub stage: &'a str,
    pub day: Weekday,
    pub performance: &'a Performance,
}

/// Derived key for one scheduled slot, the unit of liking. Two slots share an
/// identity iff they are the same (stage, day, time, artist) tuple; `::` is
/// assumed absent from stage and artist names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceIdentity(String);

impl PerformanceIdentity {
    pub fn derive(stage: &str, day: Weekday, performance: &Performance) -> Self {
        Self(format!(
            "{stage}::{day}::{}::{}",
            performance.time, performance.artist
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PerformanceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PerformanceIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PerformanceIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
