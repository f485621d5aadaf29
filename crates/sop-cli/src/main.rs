pub mod deliver;
pub mod roots;

use clap::{Parser, Subcommand, ValueEnum};
use component_sop::{config_for_schema, get_blank_state, get_state_schema, validate_state};
use deliver::{DirectorySink, StdoutSink};
use roots::AllowedRoots;
use serde_json::Value;
use sop_spec::{ExportFormat, FormSchema, FormState, ValidationResult, export_to};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "SOP intake form exporter",
    long_about = "Exports filled-in SOP intake forms as CSV or text reports, and validates form state files"
)]
struct Cli {
    /// Log debug details to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Text,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Text => ExportFormat::Text,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Export a form state as a CSV document or text report.
    Export {
        /// Path to the form state JSON.
        #[arg(long, value_name = "STATE")]
        state: PathBuf,
        /// Form schema JSON (defaults to the built-in SOP form).
        #[arg(long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,
        /// Output encoding.
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Directory the file is saved in (defaults to SOP_EXPORT_OUTPUT_DIR or the current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Write the document to stdout instead of a file.
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
        /// Overwrite an existing export.
        #[arg(long)]
        force: bool,
    },
    /// Check a form state against the schema.
    Validate {
        /// Path to the form state JSON.
        #[arg(long, value_name = "STATE")]
        state: PathBuf,
        /// Form schema JSON (defaults to the built-in SOP form).
        #[arg(long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,
    },
    /// Print the JSON Schema of form state files.
    Schema {
        /// Form schema JSON (defaults to the built-in SOP form).
        #[arg(long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,
        /// Print the schema of form schema documents instead.
        #[arg(long)]
        meta: bool,
    },
    /// Print a blank form state to fill in.
    Template {
        /// Form schema JSON (defaults to the built-in SOP form).
        #[arg(long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Export {
            state,
            schema,
            format,
            out,
            stdout,
            force,
        } => run_export(state, schema, format, out, stdout, force),
        Command::Validate { state, schema } => run_validate(state, schema),
        Command::Schema { schema, meta } => run_schema(schema, meta),
        Command::Template { schema } => run_template(schema),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "sop_export=debug,sop_spec=debug,component_sop=debug"
    } else {
        "sop_export=info"
    };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run_export(
    state_path: PathBuf,
    schema_path: Option<PathBuf>,
    format: OutputFormat,
    out_dir: Option<PathBuf>,
    stdout: bool,
    force: bool,
) -> CliResult<()> {
    let schema = load_schema(schema_path.as_deref())?;
    let state = FormState::from_json(&fs::read_to_string(&state_path)?)?;
    debug!(state = %state_path.display(), form = %schema.id, "loaded form state");

    if stdout {
        let notice = export_to(&schema, &state, format.into(), &mut StdoutSink)?;
        eprintln!("{}", notice);
        return Ok(());
    }

    let out_root = resolve_output_root(out_dir)?;
    let mut sink = DirectorySink::new(&out_root, force);
    let notice = export_to(&schema, &state, format.into(), &mut sink)?;
    for path in sink.written() {
        info!(path = %path.display(), "export saved");
    }
    println!("{}", notice);
    Ok(())
}

fn run_validate(state_path: PathBuf, schema_path: Option<PathBuf>) -> CliResult<()> {
    let config_json = component_config(schema_path.as_deref())?;
    let state_json = fs::read_to_string(state_path)?;
    let response = parse_component_result(&validate_state(&config_json, &state_json))?;
    let result: ValidationResult = serde_json::from_value(response)?;

    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn run_schema(schema_path: Option<PathBuf>, meta: bool) -> CliResult<()> {
    if meta {
        let meta_schema = schemars::schema_for!(FormSchema);
        println!("{}", serde_json::to_string_pretty(&meta_schema)?);
        return Ok(());
    }
    let config_json = component_config(schema_path.as_deref())?;
    let schema = parse_component_result(&get_state_schema(&config_json))?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_template(schema_path: Option<PathBuf>) -> CliResult<()> {
    let config_json = component_config(schema_path.as_deref())?;
    let blank = parse_component_result(&get_blank_state(&config_json))?;
    println!("{}", serde_json::to_string_pretty(&blank)?);
    Ok(())
}

fn load_schema(path: Option<&Path>) -> CliResult<FormSchema> {
    let schema = match path {
        Some(path) => FormSchema::from_json(&fs::read_to_string(path)?)?,
        None => FormSchema::builtin()?,
    };
    Ok(schema)
}

fn component_config(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(config_for_schema(&fs::read_to_string(path)?)),
        None => Ok(String::new()),
    }
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    Ok(value)
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!("  {} - {} ({})", error.field, error.message, error.code);
        }
    }
    if !result.unknown_fields.is_empty() {
        println!("Unknown fields: {}", result.unknown_fields.join(", "));
    }
}

fn resolve_output_root(out: Option<PathBuf>) -> CliResult<PathBuf> {
    let candidate = match out {
        Some(path) => path,
        None => env::var_os("SOP_EXPORT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    if candidate.as_os_str().is_empty() {
        return Err("output directory cannot be empty".into());
    }
    AllowedRoots::from_env()?.check(&candidate)
}
