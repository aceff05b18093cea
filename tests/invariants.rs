//! Service Contract Tests
//!
//! End-to-end behaviour of the FLTS service against a counting fake engine
//! and against the bundled placeholder engine.

use std::cell::Cell;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use flts_service::{
    sha256_hex, FltsError, FltsService, PlaceholderEngine, PrintMetadata, Record, RenderEngine,
    RenderError, RenderedDocument, ServiceConfig, TemplateDescriptor, TemplateRegistry,
};
use serde_json::Value;
use zip::ZipArchive;

/// Produces `PDF:<record id>` bodies and counts every call.
#[derive(Default)]
struct CountingEngine {
    loads: Cell<u32>,
    renders: Cell<u32>,
}

impl RenderEngine for CountingEngine {
    type Layout = String;

    fn load_layout(&self, _project_path: &Path, layout_name: &str) -> Result<Self::Layout, RenderError> {
        self.loads.set(self.loads.get() + 1);
        Ok(layout_name.to_string())
    }

    fn render_record(&self, _layout: &Self::Layout, record: &Record) -> Result<RenderedDocument, RenderError> {
        self.renders.set(self.renders.get() + 1);
        Ok(RenderedDocument::pdf(format!("PDF:{}", record.id).into_bytes()))
    }
}

fn registry_with(records: &[&str]) -> TemplateRegistry {
    let descriptor = records
        .iter()
        .fold(TemplateDescriptor::new("86AB5327", "sample2.qgs"), |d, id| {
            d.with_record(Record::new(*id, [("lbl_county", "Nairobi")]))
        });
    TemplateRegistry::from_descriptors([descriptor, TemplateDescriptor::new("EMPTY0001", "empty.qgs")])
        .unwrap()
}

fn create_service(records: &[&str]) -> FltsService<CountingEngine> {
    FltsService::new(ServiceConfig::default(), registry_with(records), CountingEngine::default())
}

fn zip_members(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[test]
fn invariant_get_capabilities_describes_service() {
    let service = create_service(&["Makongeni"]);
    let resp = service.execute_query("SERVICE=FLTS&REQUEST=GetCapabilities");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "application/json");
    let caps = json_body(&resp.body);
    assert_eq!(caps["Name"], "FLTS");
    assert!(caps["Requests"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "GetStarterCert"));
    assert_eq!(service.engine().loads.get(), 0);
}

#[test]
fn invariant_missing_request_answers_capabilities() {
    let service = create_service(&[]);
    let resp = service.execute_query("SERVICE=FLTS");
    assert_eq!(resp.status, 200);
    assert_eq!(json_body(&resp.body)["Version"], "1.0.0");
}

#[test]
fn invariant_single_query_returns_one_pdf() {
    let service = create_service(&["Makongeni", "Ichaweri"]);
    let resp = service.execute_query("SERVICE=FLTS&REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327&QUERY=0");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "application/pdf");
    assert_eq!(resp.body, b"PDF:Makongeni");
    assert_eq!(service.engine().renders.get(), 1);
}

#[test]
fn invariant_absent_query_is_single() {
    let service = create_service(&["Makongeni", "Ichaweri"]);
    let resp = service.execute_query("REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327");
    assert_eq!(resp.content_type, "application/pdf");
    assert_eq!(resp.body, b"PDF:Makongeni");
}

#[test]
fn invariant_all_query_archives_every_record() {
    let service = create_service(&["Makongeni", "Ichaweri", "Gatundu"]);
    let resp = service.execute_query("SERVICE=FLTS&REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327&QUERY=1");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "application/zip");
    let members = zip_members(&resp.body);
    assert_eq!(members.len(), 3);
    assert_eq!(members[0], ("86AB5327_001.pdf".to_string(), b"PDF:Makongeni".to_vec()));
    assert_eq!(members[1].1, b"PDF:Ichaweri");
    assert_eq!(members[2].1, b"PDF:Gatundu");
    assert_eq!(service.engine().renders.get(), 3);
}

#[test]
fn invariant_all_query_with_one_record_is_plain_pdf() {
    let service = create_service(&["Makongeni"]);
    let resp = service.execute_query("REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327&QUERY=1");
    assert_eq!(resp.content_type, "application/pdf");
    assert_eq!(resp.body, b"PDF:Makongeni");
}

#[test]
fn invariant_zero_records_single_fails_all_is_empty_archive() {
    let service = create_service(&[]);

    let single = service.execute_query("REQUEST=GetStarterCert&TEMPLATE_ID=EMPTY0001&QUERY=0");
    assert_eq!(single.status, 404);
    assert_eq!(json_body(&single.body)["status"], "error");

    let all = service.execute_query("REQUEST=GetStarterCert&TEMPLATE_ID=EMPTY0001&QUERY=1");
    assert_eq!(all.status, 200);
    assert_eq!(all.content_type, "application/zip");
    assert!(zip_members(&all.body).is_empty());
}

#[test]
fn invariant_unknown_template_never_reaches_engine() {
    let service = create_service(&["Makongeni"]);
    for id in ["doesnotexist", "86ab5327", "D4F9A1A4"] {
        let resp = service.execute_query(&format!("REQUEST=GetStarterCert&TEMPLATE_ID={}&QUERY=1", id));
        assert_eq!(resp.status, 400);
        let body = json_body(&resp.body);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains(id));
    }
    assert_eq!(service.engine().loads.get(), 0);
    assert_eq!(service.engine().renders.get(), 0);
}

#[test]
fn invariant_handle_reports_typed_errors() {
    let service = create_service(&["Makongeni"]);
    let params = flts_service::parse_query_string("REQUEST=GetStarterCert&TEMPLATE_ID=doesnotexist");
    assert!(matches!(service.handle(&params), Err(FltsError::NotFound(id)) if id == "doesnotexist"));

    let params = flts_service::parse_query_string("REQUEST=GetMap&TEMPLATE_ID=86AB5327");
    assert!(matches!(service.handle(&params), Err(FltsError::InvalidRequest(_))));
}

#[test]
fn invariant_invalid_parameters_are_client_errors() {
    let service = create_service(&["Makongeni"]);
    for raw in [
        "REQUEST=GetStarterCert",
        "REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327&QUERY=5",
        "REQUEST=DeleteEverything&TEMPLATE_ID=86AB5327",
    ] {
        let resp = service.execute_query(raw);
        assert_eq!(resp.status, 400, "{}", raw);
        assert_eq!(resp.content_type, "application/json");
    }
    assert_eq!(service.engine().loads.get(), 0);
}

#[test]
fn invariant_repeated_archives_are_identical() {
    let service = create_service(&["Makongeni", "Ichaweri"]);
    let query = "REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327&QUERY=1";
    let a = service.execute_query(query);
    let b = service.execute_query(query);
    assert_eq!(sha256_hex(&a.body), sha256_hex(&b.body));
}

#[test]
fn invariant_placeholder_engine_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("sample2.qgs"),
        r#"<qgis><Layouts><Layout name="Main"></Layout></Layouts></qgis>"#,
    )
    .unwrap();

    let service = FltsService::new(
        ServiceConfig::default(),
        TemplateRegistry::builtin(dir.path()),
        PlaceholderEngine::new(PrintMetadata::default()),
    );

    let single = service.execute_query("SERVICE=FLTS&REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327");
    assert_eq!(single.status, 200);
    assert_eq!(single.content_type, "application/pdf");
    let text = String::from_utf8(single.body).unwrap();
    assert!(text.starts_with("%PDF-"));
    assert!(text.contains("(lbl_county: Nairobi)"));

    let all = service.execute_query("SERVICE=FLTS&REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327&QUERY=1");
    let members = zip_members(&all.body);
    assert_eq!(members.len(), 2);
    assert!(String::from_utf8_lossy(&members[1].1).contains("(Record: Ichaweri)"));

    // sample1.qgs was never written.
    let missing = service.execute_query("REQUEST=GetStarterCert&TEMPLATE_ID=D4F9A1A4");
    assert_eq!(missing.status, 404);
    assert!(json_body(&missing.body)["message"]
        .as_str()
        .unwrap()
        .contains("sample1.qgs"));
}
