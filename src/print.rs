//! Print Engine Seam
//!
//! The layout renderer belongs to the host platform. The service only sees
//! it through [`RenderEngine`], so it can run against the real engine, the
//! bundled placeholder, or a test double.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::templates::Record;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Project file '{}' not found.", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("'{layout}' layout not found in the project file '{}'.", .project.display())]
    LayoutNotFound { layout: String, project: PathBuf },

    #[error("No pages in layout template '{0}'.")]
    EmptyLayout(String),

    #[error("No matching record for template '{0}'.")]
    NoMatchingRecord(String),

    #[error("Render engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProjectNotFound(_) | Self::LayoutNotFound { .. } | Self::NoMatchingRecord(_) => 404,
            Self::EmptyLayout(_) | Self::Engine(_) | Self::Io(_) => 500,
        }
    }
}

/// One rendered layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Record the document was rendered for; stamped by the dispatcher.
    pub record_id: String,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            record_id: String::new(),
        }
    }

    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self::new(bytes, PDF_CONTENT_TYPE)
    }

    pub fn for_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = record_id.into();
        self
    }
}

/// Project metadata cascaded into every exported document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    /// Left unset for reproducible output.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_author() -> String {
    "FLTS Main Author".to_string()
}

impl Default for PrintMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: default_author(),
            abstract_text: String::new(),
            created_at: None,
        }
    }
}

/// A host rendering capability.
pub trait RenderEngine {
    /// A project loaded with one of its layouts resolved.
    type Layout;

    /// Load `project_path` and resolve `layout_name` in it. Either both
    /// succeed or the call fails.
    fn load_layout(&self, project_path: &Path, layout_name: &str) -> Result<Self::Layout, RenderError>;

    /// Render `record` with the loaded layout.
    fn render_record(&self, layout: &Self::Layout, record: &Record) -> Result<RenderedDocument, RenderError>;
}

impl<E: RenderEngine + ?Sized> RenderEngine for &E {
    type Layout = E::Layout;

    fn load_layout(&self, project_path: &Path, layout_name: &str) -> Result<Self::Layout, RenderError> {
        (**self).load_layout(project_path, layout_name)
    }

    fn render_record(&self, layout: &Self::Layout, record: &Record) -> Result<RenderedDocument, RenderError> {
        (**self).render_record(layout, record)
    }
}
