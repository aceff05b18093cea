//! Template Registry - Fixed Identifier Table
//!
//! Maps the opaque `TEMPLATE_ID` values accepted by the service onto a
//! project file, the print layout inside it and the records it is rendered
//! for. The table is built once at startup and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type TemplateId = String;

/// Layout every built-in project provides.
pub const DEFAULT_LAYOUT: &str = "Main";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate template identifier: {0}")]
    DuplicateIdentifier(String),
}

/// One record a layout can be rendered for.
///
/// `item_values` maps layout item ids (labels) to the text they receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub item_values: BTreeMap<String, String>,
}

impl Record {
    pub fn new<I, K, V>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            item_values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub identifier: TemplateId,
    pub project_path: PathBuf,
    #[serde(default = "default_layout")]
    pub layout_name: String,
    /// Records in their natural iteration order.
    #[serde(default)]
    pub records: Vec<Record>,
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_string()
}

impl TemplateDescriptor {
    pub fn new(identifier: impl Into<String>, project_path: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            project_path: project_path.into(),
            layout_name: default_layout(),
            records: vec![],
        }
    }

    pub fn with_layout(mut self, layout_name: impl Into<String>) -> Self {
        self.layout_name = layout_name.into();
        self
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }
}

/// Read-only template table.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateId, TemplateDescriptor>,
    // Registration order, for listing.
    order: Vec<TemplateId>,
}

impl TemplateRegistry {
    /// The demo table, with project files resolved under `project_dir`.
    pub fn builtin(project_dir: &Path) -> Self {
        let descriptors = vec![
            TemplateDescriptor::new("D4F9A1A4", project_dir.join("sample1.qgs"))
                .with_record(Record::new(
                    "190865",
                    [("lbl_first_name", "Alex"), ("lbl_last_name", "Jones")],
                ))
                .with_record(Record::new(
                    "569813",
                    [("lbl_first_name", "Tracy"), ("lbl_last_name", "Lee")],
                )),
            TemplateDescriptor::new("86AB5327", project_dir.join("sample2.qgs"))
                .with_record(Record::new(
                    "Makongeni",
                    [("lbl_county", "Nairobi"), ("lbl_constituency", "Madaraka")],
                ))
                .with_record(Record::new(
                    "Ichaweri",
                    [("lbl_county", "Kiambu"), ("lbl_constituency", "Gatundu South")],
                )),
        ];

        let mut registry = Self::default();
        for descriptor in descriptors {
            registry.order.push(descriptor.identifier.clone());
            registry.templates.insert(descriptor.identifier.clone(), descriptor);
        }
        registry
    }

    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = TemplateDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for descriptor in descriptors {
            if registry.templates.contains_key(&descriptor.identifier) {
                return Err(RegistryError::DuplicateIdentifier(descriptor.identifier));
            }
            registry.order.push(descriptor.identifier.clone());
            registry.templates.insert(descriptor.identifier.clone(), descriptor);
        }
        Ok(registry)
    }

    /// Case-sensitive lookup.
    pub fn resolve(&self, identifier: &str) -> Option<&TemplateDescriptor> {
        self.templates.get(identifier)
    }

    pub fn list(&self) -> Vec<&TemplateDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.templates.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
