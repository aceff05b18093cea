//! FLTS Service Core - Starter Certificate Printing
//!
//! Answers `SERVICE=FLTS` requests:
//! 1. `GetCapabilities` returns a fixed JSON description
//! 2. `GetStarterCert` renders a template's print layout for its records
//! 3. One document is returned as-is, several are zipped
//!
//! The layout renderer is supplied by the host through [`RenderEngine`].

pub mod templates;
pub mod request;
pub mod capabilities;
pub mod print;
pub mod placeholder;
pub mod pipeline;
pub mod package;
pub mod service;
pub mod hashing;
pub mod logging;

pub use templates::{Record, RegistryError, TemplateDescriptor, TemplateId, TemplateRegistry};
pub use request::{parse, parse_query_string, QueryMode, QueryParams, ServiceCall, ServiceRequest};
pub use capabilities::{describe, Capabilities};
pub use print::{PrintMetadata, RenderEngine, RenderError, RenderedDocument};
pub use placeholder::PlaceholderEngine;
pub use pipeline::RenderPipeline;
pub use package::{package, MemberNaming, PackagedOutput, PackagingError};
pub use service::{FltsError, FltsService, ServiceConfig, ServiceResponse};
pub use hashing::sha256_hex;

pub const SERVICE_NAME: &str = "FLTS";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
