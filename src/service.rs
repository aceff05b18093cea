//! FLTS Service - Single Entry Point
//!
//! Every request goes through [`FltsService::handle`]: parse, look the
//! template up, render, package. Template lookup happens before the engine is
//! touched, so unknown identifiers never reach it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::describe;
use crate::package::{package, MemberNaming, PackagingError};
use crate::pipeline::RenderPipeline;
use crate::print::{RenderEngine, RenderError};
use crate::request::{parse, parse_query_string, QueryParams, ServiceCall};
use crate::templates::TemplateRegistry;
use crate::{SERVICE_NAME, SERVICE_VERSION};

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum FltsError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("'{0}' is an invalid value for TEMPLATE_ID parameter")]
    NotFound(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Packaging failed: {0}")]
    Packaging(#[from] PackagingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FltsError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::NotFound(_) => 400,
            Self::Render(e) => e.status_code(),
            Self::Packaging(_) | Self::Serialization(_) => 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_contact_person")]
    pub contact_person: String,
    #[serde(default = "default_contact_organization")]
    pub contact_organization: String,
    #[serde(default)]
    pub naming: MemberNaming,
}

fn default_name() -> String { SERVICE_NAME.to_string() }
fn default_version() -> String { SERVICE_VERSION.to_string() }
fn default_description() -> String { "Demo service for generating starter title certificates".to_string() }
fn default_contact_person() -> String { "John Gitau".to_string() }
fn default_contact_organization() -> String { "FLTS".to_string() }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            description: default_description(),
            contact_person: default_contact_person(),
            contact_organization: default_contact_organization(),
            naming: MemberNaming::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    pub fn ok(content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body,
        }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status,
            content_type: JSON_CONTENT_TYPE.to_string(),
            body: serde_json::to_vec(value)?,
        })
    }

    /// Client-facing error document.
    pub fn error(err: &FltsError) -> Self {
        let status = err.status_code();
        let body = serde_json::json!({
            "status": "error",
            "message": err.to_string(),
        });
        Self {
            status,
            content_type: JSON_CONTENT_TYPE.to_string(),
            body: body.to_string().into_bytes(),
        }
    }
}

pub struct FltsService<E> {
    config: ServiceConfig,
    registry: TemplateRegistry,
    pipeline: RenderPipeline<E>,
}

impl<E: RenderEngine> FltsService<E> {
    pub fn new(config: ServiceConfig, registry: TemplateRegistry, engine: E) -> Self {
        Self {
            config,
            registry,
            pipeline: RenderPipeline::new(engine),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        self.pipeline.engine()
    }

    pub fn handle(&self, params: &QueryParams) -> Result<ServiceResponse, FltsError> {
        match parse(params)? {
            ServiceCall::GetCapabilities { version } => {
                tracing::info!(version = ?version, "GetCapabilities");
                Ok(ServiceResponse::json(200, &describe(&self.config))?)
            }
            ServiceCall::Render(request) => {
                tracing::info!(
                    request = %request.request_name,
                    template = %request.template_id,
                    mode = ?request.query_mode,
                    "Render request"
                );

                let descriptor = self
                    .registry
                    .resolve(&request.template_id)
                    .ok_or_else(|| FltsError::NotFound(request.template_id.clone()))?;

                let docs = self.pipeline.render(&request, descriptor)?;
                let output = package(&descriptor.identifier, docs, self.config.naming)?;

                Ok(ServiceResponse::ok(output.content_type, output.bytes))
            }
        }
    }

    /// Like [`handle`](Self::handle), with errors written as JSON responses.
    pub fn execute(&self, params: &QueryParams) -> ServiceResponse {
        match self.handle(params) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("{} service error {}: {}", self.config.name, err.status_code(), err);
                ServiceResponse::error(&err)
            }
        }
    }

    pub fn execute_query(&self, raw: &str) -> ServiceResponse {
        self.execute(&parse_query_string(raw))
    }
}
