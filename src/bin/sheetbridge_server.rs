//! Sheetbridge API Server binary
//!
//! HTTP front end for merging spreadsheet names into KNX XML exports and
//! converting spreadsheets to YAML.

use clap::Parser;
use knx_sheetbridge::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "sheetbridge-server")]
#[command(version)]
#[command(about = "Sheetbridge API Server - upload spreadsheets, download XML or YAML")]
#[command(long_about = r#"
Sheetbridge API Server

Endpoints (multipart/form-data uploads):
  - POST /process-xml        - 'excel' (.xlsx) + 'xml' (.xml) → updated XML download
  - POST /process-yaml       - 'excel' (.xlsx) + optional 'field_mapping' JSON → YAML download
  - POST /get-excel-headers  - 'excel' (.xlsx) → JSON list of header cells

Additional endpoints:
  - GET  /health             - Health check
  - GET  /version            - Server version info
  - GET  /                   - API documentation

Example usage:
  sheetbridge-server                           # Start on localhost:5678
  sheetbridge-server --host 0.0.0.0 --port 8080

  curl -F excel=@names.xlsx -F xml=@export.xml \
    -o export_updated.xml http://localhost:5678/process-xml
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBRIDGE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5678", env = "SHEETBRIDGE_PORT")]
    port: u16,

    /// Upload size ceiling per request, in MiB
    #[arg(long, default_value = "16", env = "SHEETBRIDGE_MAX_UPLOAD_MB")]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    run_api_server(config).await
}
