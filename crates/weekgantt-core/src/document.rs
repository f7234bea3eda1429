//! Persisted project document
//!
//! The saved form of a project is a JSON object:
//!
//! ```text
//! {
//!   "version": "1.2",
//!   "savedAt": "2025-03-01T09:30:00Z",
//!   "config": { "startDate": "2025-01-06", "durationMonths": 9,
//!               "lang": "vi", "projectTitle": "" },
//!   "tasks": [ { "id": "t_1", "type": "task", "level": 0, ... } ]
//! }
//! ```
//!
//! Loading is forgiving. Only input that is not a JSON object fails; every
//! missing or malformed field falls back to its default and is reported as a
//! [`Fallback`]. Loaded tasks always go through [`renumber`].

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::lenient;
use crate::numbering::renumber;
use crate::{
    clamp_duration_months, DocumentError, IdAllocator, Locale, ProjectConfig, Task, TaskKind,
};

/// Version tag written into saved documents
pub const DOCUMENT_VERSION: &str = "1.2";

/// A project snapshot ready to be saved
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub config: ProjectConfig,
    pub tasks: Vec<Task>,
}

impl Document {
    /// Snapshot `config` and `tasks`, stamped with the current time
    pub fn new(config: ProjectConfig, tasks: Vec<Task>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            saved_at: Utc::now(),
            config,
            tasks,
        }
    }

    /// Override the save timestamp
    pub fn saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = saved_at;
        self
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    /// Parse a saved document, falling back to defaults field by field
    pub fn from_json(input: &str) -> Result<LoadedDocument, DocumentError> {
        let value: Value = serde_json::from_str(input).map_err(DocumentError::Parse)?;
        match value {
            Value::Object(root) => Ok(LoadedDocument::from_root(&root)),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Read and parse a document file
    pub fn read_file(path: &Path) -> Result<LoadedDocument, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the document as pretty JSON
    pub fn write_file(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// A field that could not be used as saved and was replaced by a default
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// No `config` object; every setting uses its default
    Config,
    StartDate,
    DurationMonths,
    Lang,
    ProjectTitle,
    /// `tasks` is present but not an array
    Tasks,
    /// Entry at this index is not an object and was skipped
    TaskEntry(usize),
    /// Task at this index had a missing or duplicate id and got a fresh one
    TaskId(usize),
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fallback::Config => write!(f, "missing config, using defaults"),
            Fallback::StartDate => write!(f, "invalid config.startDate, using default"),
            Fallback::DurationMonths => write!(f, "invalid config.durationMonths, using default"),
            Fallback::Lang => write!(f, "invalid config.lang, using default"),
            Fallback::ProjectTitle => write!(f, "invalid config.projectTitle, using empty title"),
            Fallback::Tasks => write!(f, "tasks is not a list, ignoring it"),
            Fallback::TaskEntry(i) => write!(f, "tasks[{i}] is not an object, skipped"),
            Fallback::TaskId(i) => write!(f, "tasks[{i}] has a missing or duplicate id, reassigned"),
        }
    }
}

/// Result of loading a document
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDocument {
    /// Version tag as saved, if any
    pub version: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
    pub config: ProjectConfig,
    /// Renumbered tasks; `None` when the document carries no task list
    pub tasks: Option<Vec<Task>>,
    /// Fields that fell back to defaults, in discovery order
    pub fallbacks: Vec<Fallback>,
}

impl LoadedDocument {
    fn from_root(root: &Map<String, Value>) -> Self {
        let mut fallbacks = Vec::new();

        let version = root.get("version").and_then(Value::as_str).map(str::to_string);
        let saved_at = root
            .get("savedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));

        let config = match root.get("config") {
            Some(Value::Object(config)) => read_config(config, &mut fallbacks),
            _ => {
                fallbacks.push(Fallback::Config);
                ProjectConfig::default()
            }
        };

        let tasks = match root.get("tasks") {
            None | Some(Value::Null) => None,
            Some(Value::Array(entries)) => Some(read_tasks(entries, &mut fallbacks)),
            Some(_) => {
                fallbacks.push(Fallback::Tasks);
                None
            }
        };

        for fallback in &fallbacks {
            tracing::warn!("document: {fallback}");
        }

        Self {
            version,
            saved_at,
            config,
            tasks,
            fallbacks,
        }
    }

    /// Whether every field was usable as saved
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

fn read_config(config: &Map<String, Value>, fallbacks: &mut Vec<Fallback>) -> ProjectConfig {
    let defaults = ProjectConfig::default();

    let start_date = match config.get("startDate").and_then(Value::as_str).and_then(parse_date) {
        Some(date) => date,
        None => {
            fallbacks.push(Fallback::StartDate);
            defaults.start_date
        }
    };

    let duration_months = match config
        .get("durationMonths")
        .and_then(lenient::number)
        .filter(|n| *n > 0)
    {
        Some(n) => clamp_duration_months(u32::try_from(n).unwrap_or(u32::MAX)),
        None => {
            fallbacks.push(Fallback::DurationMonths);
            defaults.duration_months
        }
    };

    let lang = match config.get("lang") {
        None | Some(Value::Null) => defaults.lang,
        Some(value) => match value.as_str().and_then(|s| s.parse::<Locale>().ok()) {
            Some(lang) => lang,
            None => {
                fallbacks.push(Fallback::Lang);
                defaults.lang
            }
        },
    };

    let project_title = match config.get("projectTitle") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(title)) => title.clone(),
        Some(_) => {
            fallbacks.push(Fallback::ProjectTitle);
            String::new()
        }
    };

    ProjectConfig {
        start_date,
        duration_months,
        lang,
        project_title,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn read_tasks(entries: &[Value], fallbacks: &mut Vec<Fallback>) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let parsed = match entry {
            Value::Object(_) => serde_json::from_value::<Task>(entry.clone()).ok(),
            _ => None,
        };
        match parsed {
            Some(task) => tasks.push((index, normalize(task))),
            None => fallbacks.push(Fallback::TaskEntry(index)),
        }
    }

    let mut ids = IdAllocator::seeded_from(&tasks.iter().map(|(_, t)| t.clone()).collect::<Vec<_>>());
    let mut seen = HashSet::new();
    for (index, task) in &mut tasks {
        if task.id.trim().is_empty() || !seen.insert(task.id.clone()) {
            task.id = ids.allocate(task.kind.id_prefix());
            seen.insert(task.id.clone());
            fallbacks.push(Fallback::TaskId(*index));
        }
    }

    renumber(&tasks.into_iter().map(|(_, t)| t).collect::<Vec<_>>())
}

fn normalize(mut task: Task) -> Task {
    match task.kind {
        TaskKind::Task => {
            task.duration = Some(task.duration.unwrap_or(1).max(1));
        }
        TaskKind::Payment => {
            task.duration = None;
        }
    }
    task
}
