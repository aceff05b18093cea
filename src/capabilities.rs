//! Capability Responder

use serde::{Deserialize, Serialize};

use crate::request::supported_requests;
use crate::service::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Contact Person")]
    pub contact_person: String,
    #[serde(rename = "Contact Organization")]
    pub contact_organization: String,
    #[serde(rename = "Requests")]
    pub requests: Vec<String>,
}

pub fn describe(config: &ServiceConfig) -> Capabilities {
    Capabilities {
        name: config.name.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
        contact_person: config.contact_person.clone(),
        contact_organization: config.contact_organization.clone(),
        requests: supported_requests().into_iter().map(String::from).collect(),
    }
}
