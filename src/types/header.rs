//! Document header: file description, public identifier and processor provenance.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Description of the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDesc {
    /// Author of the source.
    pub author: Option<String>,
    /// Title of the source.
    pub title: Option<String>,
    /// Original file name.
    pub filename: Option<String>,
    /// Original file type.
    pub filetype: Option<String>,
    /// Number of pages.
    pub pages: Option<u32>,
    /// Creation time of the source.
    pub creationtime: Option<String>,
}

/// Public identifier of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Public {
    /// Public id.
    pub public_id: Option<String>,
    /// Public URI.
    pub uri: Option<String>,
}

/// A tool that contributed annotations to one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticProcessor {
    /// Tool name.
    pub name: String,
    /// Tool version.
    pub version: Option<String>,
    /// Time the annotation was produced.
    pub timestamp: Option<String>,
    /// Time processing started.
    pub begin_timestamp: Option<String>,
    /// Time processing finished.
    pub end_timestamp: Option<String>,
}

impl LinguisticProcessor {
    /// Create a processor entry without timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            timestamp: None,
            begin_timestamp: None,
            end_timestamp: None,
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Stamp `timestamp` with the current time.
    pub fn stamp_now(&mut self) {
        self.timestamp = Some(now_iso8601());
    }

    /// Stamp `beginTimestamp` with the current time.
    pub fn stamp_begin(&mut self) {
        self.begin_timestamp = Some(now_iso8601());
    }

    /// Stamp `endTimestamp` with the current time.
    pub fn stamp_end(&mut self) {
        self.end_timestamp = Some(now_iso8601());
    }

    /// Whether this entry names the given tool and version.
    pub fn matches(&self, name: &str, version: Option<&str>) -> bool {
        self.name == name && self.version.as_deref() == version
    }
}

/// Current UTC time with second precision, e.g. `2024-03-01T12:00:00Z`.
fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Processors registered for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorGroup {
    /// Layer name (e.g. "terms").
    pub layer: String,
    /// Processors in registration order.
    pub processors: Vec<LinguisticProcessor>,
}

/// Header metadata of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// File description.
    pub file_desc: Option<FileDesc>,
    /// Public identifier.
    pub public: Option<Public>,
    groups: Vec<ProcessorGroup>,
}

impl Header {
    /// Register a processor under `layer` and return it for further editing.
    pub fn add_processor(&mut self, layer: &str, processor: LinguisticProcessor) -> &mut LinguisticProcessor {
        let idx = match self.groups.iter().position(|g| g.layer == layer) {
            Some(idx) => idx,
            None => {
                self.groups.push(ProcessorGroup {
                    layer: layer.to_string(),
                    processors: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[idx];
        group.processors.push(processor);
        let last = group.processors.len() - 1;
        &mut group.processors[last]
    }

    /// Processor groups in layer registration order.
    pub fn processor_groups(&self) -> &[ProcessorGroup] {
        &self.groups
    }

    /// Processors registered for `layer`.
    pub fn processors(&self, layer: &str) -> &[LinguisticProcessor] {
        self.groups
            .iter()
            .find(|g| g.layer == layer)
            .map(|g| g.processors.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `layer` already lists the tool `name` at `version`.
    pub fn processor_exists(&self, layer: &str, name: &str, version: Option<&str>) -> bool {
        self.processors(layer).iter().any(|lp| lp.matches(name, version))
    }

    /// Whether `layer` lists the tool `name` at any version.
    pub fn processor_named(&self, layer: &str, name: &str) -> bool {
        self.processors(layer).iter().any(|lp| lp.name == name)
    }
}
