//! Render Dispatcher
//!
//! Drives the engine for one resolved template. SINGLE renders the first
//! record and fails without one; ALL renders every record and may return
//! nothing.

use crate::print::{RenderEngine, RenderError, RenderedDocument};
use crate::request::{QueryMode, ServiceRequest};
use crate::templates::TemplateDescriptor;

pub struct RenderPipeline<E> {
    engine: E,
}

impl<E: RenderEngine> RenderPipeline<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn render(
        &self,
        request: &ServiceRequest,
        descriptor: &TemplateDescriptor,
    ) -> Result<Vec<RenderedDocument>, RenderError> {
        let layout = self
            .engine
            .load_layout(&descriptor.project_path, &descriptor.layout_name)?;

        let records = match request.query_mode {
            QueryMode::Single => {
                let first = descriptor
                    .records
                    .first()
                    .ok_or_else(|| RenderError::NoMatchingRecord(descriptor.identifier.clone()))?;
                std::slice::from_ref(first)
            }
            QueryMode::All => descriptor.records.as_slice(),
        };

        let mut docs = Vec::with_capacity(records.len());
        for record in records {
            tracing::debug!(
                template = %descriptor.identifier,
                record = %record.id,
                "Rendering layout '{}'",
                descriptor.layout_name
            );
            let doc = self.engine.render_record(&layout, record)?;
            docs.push(doc.for_record(record.id.clone()));
        }

        Ok(docs)
    }
}
