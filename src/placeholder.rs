//! Placeholder Print Engine
//!
//! Stands in for the host layout renderer. It checks that the project file
//! exists and declares the requested layout, then writes a one-page PDF that
//! lists the record's item values.

use std::fs;
use std::path::{Path, PathBuf};

use crate::print::{PrintMetadata, RenderEngine, RenderError, RenderedDocument};
use crate::templates::Record;

// A4 in points.
const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;

#[derive(Debug, Clone, Default)]
pub struct PlaceholderEngine {
    metadata: PrintMetadata,
}

/// A project file with one of its `<Layout>` elements located.
#[derive(Debug, Clone)]
pub struct PlaceholderLayout {
    pub project_path: PathBuf,
    pub name: String,
}

impl PlaceholderEngine {
    pub fn new(metadata: PrintMetadata) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &PrintMetadata {
        &self.metadata
    }
}

impl RenderEngine for PlaceholderEngine {
    type Layout = PlaceholderLayout;

    fn load_layout(&self, project_path: &Path, layout_name: &str) -> Result<Self::Layout, RenderError> {
        if layout_name.is_empty() {
            return Err(RenderError::Engine("Template name not specified.".to_string()));
        }
        if !project_path.is_file() {
            return Err(RenderError::ProjectNotFound(project_path.to_path_buf()));
        }
        let project = fs::read_to_string(project_path)?;

        let element = find_layout(&project, layout_name).ok_or_else(|| RenderError::LayoutNotFound {
            layout: layout_name.to_string(),
            project: project_path.to_path_buf(),
        })?;
        if attribute(element, "pages") == Some("0") {
            return Err(RenderError::EmptyLayout(layout_name.to_string()));
        }

        Ok(PlaceholderLayout {
            project_path: project_path.to_path_buf(),
            name: layout_name.to_string(),
        })
    }

    fn render_record(&self, layout: &Self::Layout, record: &Record) -> Result<RenderedDocument, RenderError> {
        let mut lines = vec![
            format!("Layout: {}", layout.name),
            format!("Record: {}", record.id),
        ];
        lines.extend(record.item_values.iter().map(|(k, v)| format!("{}: {}", k, v)));
        Ok(RenderedDocument::pdf(write_pdf(&lines, &self.metadata)))
    }
}

/// Opening tag of the `<Layout>` element named `name`.
fn find_layout<'a>(project: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = project;
    while let Some(start) = rest.find("<Layout") {
        let tail = &rest[start..];
        let end = tail.find('>')?;
        let tag = &tail[..=end];
        // Skip `<LayoutItem`, `<Layouts` and friends.
        let boundary = tag[7..].chars().next();
        if matches!(boundary, Some(c) if c.is_whitespace() || c == '>' || c == '/')
            && attribute(tag, "name") == Some(name)
        {
            return Some(tag);
        }
        rest = &tail[end + 1..];
    }
    None
}

fn attribute<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", key);
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

fn write_pdf(lines: &[String], metadata: &PrintMetadata) -> Vec<u8> {
    let mut content = String::new();
    let mut y = PAGE_HEIGHT - 72;
    for (i, line) in lines.iter().enumerate() {
        let size = if i == 0 { 18 } else { 12 };
        content.push_str(&format!("BT /F1 {} Tf 72 {} Td {} Tj ET\n", size, y, pdf_string(line)));
        y = y.saturating_sub(if i == 0 { 30 } else { 18 });
    }

    let mut info = format!(
        "<< /Title {} /Author {} /Subject {} /Producer (FLTS Service)",
        pdf_string(&metadata.title),
        pdf_string(&metadata.author),
        pdf_string(&metadata.abstract_text)
    );
    if let Some(created) = metadata.created_at {
        info.push_str(&format!(" /CreationDate (D:{}Z)", created.format("%Y%m%d%H%M%S")));
    }
    info.push_str(" >>");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>",
            PAGE_WIDTH, PAGE_HEIGHT
        ),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        info,
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        objects.len(),
        xref
    ));
    out.into_bytes()
}
