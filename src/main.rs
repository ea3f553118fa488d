//! Resume Forge CLI
//!
//! Usage:
//!   resume-forge [OPTIONS] templates [CATEGORY]
//!   resume-forge [OPTIONS] info <CATEGORY> <NAME>
//!   resume-forge [OPTIONS] schema <TYPE>
//!   resume-forge [OPTIONS] render --type <TYPE> --template <NAME> [--format <FORMAT>] [--output <FILE>] <DATA>
//!
//! Options:
//!   -c, --config <FILE>     Engine configuration (TOML format)
//!   -t, --templates <DIR>   Template storage root, overrides the config file
//!   -h, --help              Print help

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use resume_forge::{
    DocumentData, DocumentRequest, DocumentType, Engine, EngineConfig, EngineError, OutputFormat,
};

#[derive(Parser)]
#[command(name = "resume-forge")]
#[command(about = "Render résumés and cover letters from JSON data")]
struct Cli {
    /// Engine configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Template storage root
    #[arg(short, long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed templates as JSON
    Templates {
        /// Only list this category
        category: Option<String>,
    },
    /// Show a template's description and preview as JSON
    Info { category: String, name: String },
    /// Print the expected data schema and an example as JSON
    Schema {
        /// resume or cover_letter
        document_type: DocumentType,
    },
    /// Render a document from a JSON data file
    Render {
        /// resume or cover_letter
        #[arg(long = "type", default_value = "resume")]
        document_type: DocumentType,

        /// Template name within the category
        #[arg(long)]
        template: String,

        /// pdf or docx
        #[arg(long, default_value = "pdf")]
        format: OutputFormat,

        /// Destination file (defaults to the suggested file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON data file
        data: PathBuf,
    },
}

#[derive(Serialize)]
struct InfoOutput {
    #[serde(flatten)]
    info: resume_forge::TemplateInfo,
    preview_data_uri: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig, String> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .map_err(|e| format!("Error loading config '{}': {}", path.display(), e))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.templates {
        config = config.with_templates_dir(dir);
    }
    Ok(config)
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("Error: {e}"))?;
    println!("{json}");
    Ok(())
}

fn read_data(path: &Path) -> Result<Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Error parsing JSON in '{}': {}", path.display(), e))
}

fn engine_error(e: EngineError) -> String {
    format!("Error ({}): {}", e.status(), e)
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    debug!(templates = %config.templates_dir.display(), "loaded configuration");
    let engine = Engine::new(config);

    match cli.command {
        Command::Templates { category } => {
            let listing = engine.catalog(category.as_deref()).map_err(engine_error)?;
            print_json(&listing)
        }
        Command::Info { category, name } => {
            let info = engine.info(&category, &name).map_err(engine_error)?;
            let preview_data_uri = info.preview_data_uri().map_err(engine_error)?;
            print_json(&InfoOutput {
                info,
                preview_data_uri,
            })
        }
        Command::Schema { document_type } => print_json(&engine.schema(document_type)),
        Command::Render {
            document_type,
            template,
            format,
            output,
            data,
        } => {
            let data = read_data(&data)?;
            DocumentData::from_value(&data)
                .and_then(|doc| doc.validate())
                .map_err(engine_error)?;

            let request = DocumentRequest::new(document_type, template, format, data);
            let artifact = engine.produce(&request).map_err(engine_error)?;
            let dest = output.unwrap_or_else(|| PathBuf::from(artifact.filename()));
            let written = artifact.persist(&dest).map_err(engine_error)?;
            println!("{}", written.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
