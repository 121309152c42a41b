//! roicodec: reader and writer for ImageJ binary ROI files.
//!
//! An ImageJ `.roi` file stores one region of interest (a rectangle, oval,
//! line, polygon or freehand outline) together with a header describing
//! where it sits in an image stack. This crate decodes those files into a
//! typed [`roi::RoiRecord`], encodes records back into the binary layout,
//! and offers a JSON form of the same record for editing and inspection.
//!
//! # Modules
//!
//! - [`roi`]: Record types, the binary decoder and encoder, and JSON I/O
//! - [`inspect`]: Human-readable and JSON summaries of a record
//! - [`error`]: Error types for roicodec operations

pub mod error;
pub mod inspect;
pub mod roi;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use error::{FormatError, RoiError, SchemaError, ShapeError};

/// The roicodec CLI application.
#[derive(Parser)]
#[command(name = "roicodec")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log filter, e.g. 'debug' or 'roicodec=trace'.
    #[arg(long, global = true, env = "ROICODEC_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize a .roi file: shape, box, area, name and stack position.
    Inspect(InspectArgs),
    /// Print every decoded header field of a .roi file.
    Header(HeaderArgs),
    /// Convert between the binary .roi form and JSON.
    Convert(ConvertArgs),
}

/// Report rendering for `inspect` and `header`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// File formats understood by `convert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RecordFormat {
    Roi,
    Json,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// ROI file to inspect.
    input: PathBuf,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the header subcommand.
#[derive(clap::Args)]
struct HeaderArgs {
    /// ROI file to read.
    input: PathBuf,

    /// Output format for the field listing.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input file.
    input: PathBuf,

    /// Output file.
    output: PathBuf,

    /// Input format. Inferred from the input extension if omitted.
    #[arg(long, value_enum)]
    from: Option<RecordFormat>,

    /// Output format. Inferred from the output extension if omitted.
    #[arg(long, value_enum)]
    to: Option<RecordFormat>,
}

/// Run the roicodec CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RoiError> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Header(args)) => run_header(args),
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("roicodec {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Reader and writer for ImageJ binary ROI files.");
            println!();
            println!("Run 'roicodec --help' for usage information.");
            Ok(())
        }
    }
}

/// Install a stderr fmt subscriber. An unparsable filter falls back to `warn`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be set when run() is called from tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), RoiError> {
    let record = roi::read_roi(&args.input)?;
    let report = inspect::inspect_roi(&record);

    match args.output {
        OutputFormat::Json => println!("{}", to_json_output(&args.input, &report)?),
        OutputFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Execute the header subcommand.
fn run_header(args: HeaderArgs) -> Result<(), RoiError> {
    let header = roi::read_roi_header(&args.input)?;

    match args.output {
        OutputFormat::Json => println!("{}", to_json_output(&args.input, &header)?),
        OutputFormat::Text => print!("{}", header),
    }
    Ok(())
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), RoiError> {
    let from = resolve_format(args.from, &args.input)?;
    let to = resolve_format(args.to, &args.output)?;
    tracing::debug!(?from, ?to, input = %args.input.display(), "converting");

    let record = match from {
        RecordFormat::Roi => roi::read_roi(&args.input)?,
        RecordFormat::Json => roi::io_json::read_roi_json(&args.input)?,
    };

    match to {
        RecordFormat::Roi => roi::write_roi(&args.output, &record)?,
        RecordFormat::Json => roi::io_json::write_roi_json(&args.output, &record)?,
    }

    println!(
        "Converted {} ({}) -> {} ({})",
        args.input.display(),
        record.kind(),
        args.output.display(),
        format_name(to)
    );
    Ok(())
}

/// Use the explicit format, or infer one from the file extension.
fn resolve_format(explicit: Option<RecordFormat>, path: &Path) -> Result<RecordFormat, RoiError> {
    if let Some(format) = explicit {
        return Ok(format);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("roi") => Ok(RecordFormat::Roi),
        Some("json") => Ok(RecordFormat::Json),
        _ => Err(RoiError::UnsupportedFormat(format!(
            "cannot infer format of '{}' (use --from/--to with 'roi' or 'json')",
            path.display()
        ))),
    }
}

fn format_name(format: RecordFormat) -> &'static str {
    match format {
        RecordFormat::Roi => "roi",
        RecordFormat::Json => "json",
    }
}

fn to_json_output<T: serde::Serialize>(path: &Path, value: &T) -> Result<String, RoiError> {
    serde_json::to_string_pretty(value).map_err(|source| RoiError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_explicit_wins() {
        let format = resolve_format(Some(RecordFormat::Json), Path::new("cell.roi")).unwrap();
        assert_eq!(format, RecordFormat::Json);
    }

    #[test]
    fn test_resolve_format_from_extension() {
        assert_eq!(
            resolve_format(None, Path::new("a/cell.ROI")).unwrap(),
            RecordFormat::Roi
        );
        assert_eq!(
            resolve_format(None, Path::new("cell.json")).unwrap(),
            RecordFormat::Json
        );
    }

    #[test]
    fn test_resolve_format_unknown_extension() {
        let err = resolve_format(None, Path::new("cell.txt")).unwrap_err();
        assert!(matches!(err, RoiError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
