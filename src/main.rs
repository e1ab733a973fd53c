use clap::{Parser, Subcommand};
use knx_sheetbridge::cli;
use knx_sheetbridge::error::BridgeResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(about = "Spreadsheet helpers for KNX projects: merge names into XML, convert to YAML.")]
#[command(long_about = "Sheetbridge - spreadsheet helpers for KNX projects

COMMANDS:
  merge     - Write spreadsheet names into a KNX group-address XML export
  convert   - Convert a spreadsheet to a YAML list of records
  headers   - List the header row of a spreadsheet

EXAMPLES:
  sheetbridge merge names.xlsx export.xml             # → export_updated.xml
  sheetbridge convert points.xlsx -m Address=addr     # → points.yaml
  sheetbridge convert points.xlsx --interactive       # prompt per column
  sheetbridge headers points.xlsx --json

Set RUST_LOG=knx_sheetbridge=debug to trace every matched address.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Merge spreadsheet names into a KNX group-address export.

The spreadsheet must have columns named exactly 'Address' and 'Name'.
Every GroupAddress element (namespace http://knx.org/xml/ga-export/01)
whose Address matches a row gets that row's Name. Addresses are trimmed
before matching; if an address repeats, the last row wins.

Nothing is written when no element was updated.

EXAMPLE:
  sheetbridge merge names.xlsx export.xml -o export_named.xml")]
    /// Merge spreadsheet names into a KNX group-address XML export
    Merge {
        /// Spreadsheet (.xlsx) with 'Address' and 'Name' columns
        excel: PathBuf,

        /// KNX group-address export (.xml)
        xml: PathBuf,

        /// Output file (default: <xml>_updated.xml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Convert a spreadsheet to a YAML list of records.

Row 1 is the header; each following row becomes one mapping with keys in
column order. Numbers stay bare, text is always double-quoted, empty cells
become null.

RENAMING COLUMNS:
  -m FROM=TO            (repeatable)
  --mapping-file F      JSON object {\"FROM\": \"TO\", ...}
  --interactive         prompt for every header

Later sources win: file, then -m pairs, then interactive answers.

EXAMPLE:
  sheetbridge convert points.xlsx -m Address=addr -m Name=label -o points.yaml")]
    /// Convert a spreadsheet to YAML
    Convert {
        /// Spreadsheet (.xlsx)
        excel: PathBuf,

        /// Output file (default: <excel>.yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rename a column: FROM=TO
        #[arg(short = 'm', long = "map", value_name = "FROM=TO")]
        maps: Vec<String>,

        /// JSON file with a flat {FROM: TO} mapping
        #[arg(long)]
        mapping_file: Option<PathBuf>,

        /// Prompt for an output key per header
        #[arg(short, long)]
        interactive: bool,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the non-empty header cells of a spreadsheet
    Headers {
        /// Spreadsheet (.xlsx)
        excel: PathBuf,

        /// Print a JSON array instead of one header per line
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "knx_sheetbridge=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> BridgeResult<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Merge { verbose, .. } | Commands::Convert { verbose, .. } => *verbose,
        Commands::Headers { .. } => false,
    };
    init_tracing(verbose);

    match cli.command {
        Commands::Merge {
            excel,
            xml,
            output,
            verbose,
        } => cli::merge(excel, xml, output, verbose),

        Commands::Convert {
            excel,
            output,
            maps,
            mapping_file,
            interactive,
            verbose,
        } => cli::convert(excel, output, maps, mapping_file, interactive, verbose),

        Commands::Headers { excel, json } => cli::headers(excel, json),
    }
}
