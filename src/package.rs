//! Output Packager
//!
//! A single document goes out untouched. Anything else is archived into a
//! ZIP whose bytes depend only on the inputs (fixed timestamps, input order,
//! index-based names) unless auto-generated names are requested.

use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use thiserror::Error;
use uuid::Uuid;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

use crate::print::{RenderedDocument, PDF_CONTENT_TYPE};

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How archive members are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberNaming {
    /// `{template_id}_{index:03}.{ext}`, 1-based.
    #[default]
    Sequential,
    /// `{template_id}_{record_id}.{ext}`.
    RecordId,
    /// `{uuid}.{ext}`. Archives are not reproducible with this scheme.
    AutoGenerated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedOutput {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub fn package(
    template_id: &str,
    mut documents: Vec<RenderedDocument>,
    naming: MemberNaming,
) -> Result<PackagedOutput, PackagingError> {
    if documents.len() == 1 {
        if let Some(doc) = documents.pop() {
            return Ok(PackagedOutput {
                bytes: doc.bytes,
                content_type: doc.content_type,
            });
        }
    }

    tracing::debug!("Creating ZIP archive with {} members", documents.len());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (index, doc) in documents.iter().enumerate() {
        let name = member_name(template_id, index + 1, doc, naming);
        zip.start_file(name, member_options())?;
        zip.write_all(&doc.bytes)?;
    }
    let bytes = zip.finish()?.into_inner();

    tracing::debug!("ZIP archive is {} bytes", bytes.len());

    Ok(PackagedOutput {
        bytes,
        content_type: ZIP_CONTENT_TYPE.to_string(),
    })
}

fn member_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

fn member_name(template_id: &str, index: usize, doc: &RenderedDocument, naming: MemberNaming) -> String {
    let ext = extension(&doc.content_type);
    match naming {
        MemberNaming::Sequential => format!("{}_{:03}.{}", template_id, index, ext),
        MemberNaming::RecordId => format!("{}_{}.{}", template_id, doc.record_id, ext),
        MemberNaming::AutoGenerated => format!("{}.{}", Uuid::new_v4(), ext),
    }
}

fn extension(content_type: &str) -> &'static str {
    match content_type {
        PDF_CONTENT_TYPE => "pdf",
        ZIP_CONTENT_TYPE => "zip",
        _ => "bin",
    }
}
