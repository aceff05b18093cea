//! FLTS CLI - Host for one service request
//!
//! Takes a raw query string, answers it with the placeholder engine and
//! either streams the body to stdout or writes it to a file and prints a JSON
//! summary. Exits non-zero on error responses.

use clap::{Parser, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use flts_service::{
    logging::init_cli_logger, parse_query_string, sha256_hex, FltsError, FltsService,
    MemberNaming, PlaceholderEngine, PrintMetadata, ServiceConfig, ServiceResponse,
    TemplateRegistry,
};

#[derive(Parser)]
#[command(name = "flts-cli")]
#[command(about = "FLTS CLI - starter certificate printing service")]
struct Cli {
    /// Raw query string, e.g. "SERVICE=FLTS&REQUEST=GetStarterCert&TEMPLATE_ID=86AB5327"
    #[arg(short, long)]
    query: String,

    /// Directory holding the project files
    #[arg(short, long, default_value = ".")]
    project_dir: PathBuf,

    /// Write the response body here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Archive member naming
    #[arg(short, long, value_enum, default_value_t = Naming::Sequential)]
    naming: Naming,

    /// Leave the creation date out of rendered documents
    #[arg(long)]
    reproducible: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Naming {
    Sequential,
    RecordId,
    Auto,
}

impl From<Naming> for MemberNaming {
    fn from(naming: Naming) -> Self {
        match naming {
            Naming::Sequential => MemberNaming::Sequential,
            Naming::RecordId => MemberNaming::RecordId,
            Naming::Auto => MemberNaming::AutoGenerated,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let config = ServiceConfig {
        naming: cli.naming.into(),
        ..ServiceConfig::default()
    };
    let metadata = PrintMetadata {
        created_at: (!cli.reproducible).then(Utc::now),
        ..PrintMetadata::default()
    };
    let service = FltsService::new(
        config,
        TemplateRegistry::builtin(&cli.project_dir),
        PlaceholderEngine::new(metadata),
    );

    let params = parse_query_string(&cli.query);
    let response = match params.get("SERVICE") {
        Some(name) if !name.eq_ignore_ascii_case(&service.config().name) => {
            tracing::error!("Service '{}' is not supported", name);
            ServiceResponse::error(&FltsError::InvalidRequest(format!(
                "Service '{}' is not supported",
                name
            )))
        }
        _ => service.execute(&params),
    };

    let written = match &cli.output {
        Some(path) => fs::write(path, &response.body).map(|_| {
            let summary = serde_json::json!({
                "status": response.status,
                "content_type": response.content_type,
                "bytes": response.body.len(),
                "sha256": sha256_hex(&response.body),
                "output": path,
            });
            println!("{}", summary);
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&response.body).and_then(|_| stdout.flush())
        }
    };

    if let Err(e) = written {
        eprintln!(r#"{{"error": "Failed to write response: {}"}}"#, e);
        return ExitCode::FAILURE;
    }

    if response.status < 400 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
