//! Scanbridge - SARIF exporter for the scanning platform
//!
//! The `scanbridge` command authenticates against the platform, pulls one
//! release's static-analysis vulnerabilities, and writes a SARIF 2.1.0
//! document for CI annotation upload. Releases still being analysed (or
//! suspended) are skipped without failing the job.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use scanbridge_client::{derive_api_url, ApiClient, Credentials, Throttle};
use scanbridge_export::{init_tracing, run_export, ExportConfig, ExportOutcome};

#[derive(Parser)]
#[command(name = "scanbridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export a release's static-analysis findings as SARIF 2.1.0", long_about = None)]
struct Cli {
    /// Portal base URL of the scanning platform, e.g. https://scan.example.com
    #[arg(long, env = "SCANBRIDGE_BASE_URL")]
    base_url: String,

    /// Release whose vulnerabilities are exported
    #[arg(long, env = "SCANBRIDGE_RELEASE_ID")]
    release_id: u64,

    /// Output path for the SARIF document
    #[arg(
        short,
        long,
        env = "SCANBRIDGE_OUTPUT",
        default_value = "scanbridge.sarif"
    )]
    output: PathBuf,

    /// Client id for the client-credentials grant (preferred when set)
    #[arg(long, env = "SCANBRIDGE_CLIENT_ID")]
    client_id: Option<String>,

    /// Client secret for the client-credentials grant
    #[arg(long, env = "SCANBRIDGE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Tenant name for the password grant
    #[arg(long, env = "SCANBRIDGE_TENANT")]
    tenant: Option<String>,

    /// User name for the password grant
    #[arg(long, env = "SCANBRIDGE_USER")]
    user: Option<String>,

    /// Password for the password grant
    #[arg(long, env = "SCANBRIDGE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let credentials = Credentials {
        tenant: cli.tenant,
        user: cli.user,
        password: cli.password,
        client_id: cli.client_id,
        client_secret: cli.client_secret,
    };

    let api_url = derive_api_url(&cli.base_url).context("Failed to derive the API endpoint")?;

    let client = ApiClient::connect(&api_url, &credentials)
        .await
        .context("Failed to authenticate against the scanning platform")?;

    let config = ExportConfig::new(cli.release_id, &cli.base_url, cli.output);
    let throttle = Arc::new(Throttle::for_detail_fetches());

    let outcome = run_export(Arc::new(client), throttle, &config)
        .await
        .context("Export failed")?;

    match outcome {
        ExportOutcome::Written {
            path,
            results,
            skipped,
        } => {
            info!(
                results = results,
                skipped_items = skipped,
                path = %path.display(),
                "SARIF export complete"
            );
        }
        ExportOutcome::SkippedRelease { status, suspended } => {
            info!(
                status = ?status,
                suspended = suspended,
                "release is not ready for export, nothing written"
            );
        }
    }

    Ok(())
}
