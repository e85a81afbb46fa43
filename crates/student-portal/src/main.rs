//! Student Portal CLI
//!
//! Chat with the troubleshooting assistant and file complaints from the
//! terminal.
//!
//! # Usage
//!
//! ```bash
//! student-portal --student-id STU001 --student-name "Asha"
//!
//! # Custom configuration file and service address
//! student-portal --config portal.toml --base-url http://support.campus.local:5000 \
//!     --student-id STU001 --student-name "Asha"
//!
//! # Environment overrides
//! PORTAL_TIMEOUT_SECS=10 RUST_LOG=triage=debug student-portal --student-id STU001 --student-name Asha
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;

use student_portal::Session;
use triage::{HttpAdviceClient, HttpClassificationClient, PortalConfig, Requester};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the support services (overrides config and PORTAL_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Logged-in student's id
    #[arg(long)]
    student_id: String,

    /// Logged-in student's display name
    #[arg(long)]
    student_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't interleave with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config =
        PortalConfig::load(args.config.as_deref()).context("Failed to load portal config")?;
    if let Some(url) = args.base_url {
        config.service.base_url = url;
        config.validate().context("Invalid --base-url")?;
    }

    info!(
        base_url = %config.service.base_url,
        timeout_secs = config.service.timeout_secs,
        "Student portal starting"
    );

    let advice =
        HttpAdviceClient::new(&config.service).context("Failed to build advice client")?;
    let classifier = HttpClassificationClient::new(&config.service)
        .context("Failed to build classification client")?;
    let requester = Requester::new(args.student_id, args.student_name);

    let mut session = Session::new(&config, requester, advice, classifier)
        .context("Failed to start portal session")?;
    let mut out = stdout();
    session
        .run(BufReader::new(stdin()), &mut out)
        .await
        .context("Portal session failed")?;

    Ok(())
}
