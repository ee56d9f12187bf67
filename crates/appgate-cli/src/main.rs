//! Appgate - Mobile App Version Gate CLI
//!
//! The `appgate` command administers the app version table and evaluates
//! user agents against it.
//!
//! ## Commands
//!
//! - `versions add`: Record a version (deadline, latest flag) for a platform
//! - `versions list`: Show the current versions, or the full change history
//! - `check`: Run a user agent through the gate and print the verdict
//! - `config`: Print the effective gate configuration

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use http::{Request, Response, StatusCode};
use serde::Serialize;
use tracing::{info, Level};

use appgate_core::{
    apply_headers, upgrade_required, AppVersionUpgrade, GateConfig, GateVerdict, METRICS,
};
use appgate_state::{
    AppVersionConfig, FileVersionLedger, InMemorySnapshotCache, Platform, VersionRecord,
};

type Provider = AppVersionConfig<FileVersionLedger, InMemorySnapshotCache>;

#[derive(Parser)]
#[command(name = "appgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mobile app version gate", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Version ledger file (JSON lines)
    #[arg(
        long,
        global = true,
        env = "APPGATE_STORE",
        default_value = ".appgate/versions.jsonl"
    )]
    store: PathBuf,

    /// Gate configuration file (TOML)
    #[arg(long, global = true, env = "APPGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configured app versions
    Versions {
        #[command(subcommand)]
        action: VersionsAction,
    },

    /// Evaluate a user agent against the configured versions
    Check {
        /// Raw User-Agent header value
        #[arg(short, long)]
        user_agent: String,

        /// Request path used for mobile-traffic detection
        #[arg(short, long, default_value = "/api/mobile/")]
        path: String,
    },

    /// Print the effective gate configuration
    Config,
}

#[derive(Subcommand)]
enum VersionsAction {
    /// Record a version for a platform
    Add {
        /// Platform (ios or android)
        #[arg(long)]
        platform: Platform,

        /// Version string, major.minor.patch[.suffix]
        #[arg(long = "app-version")]
        version: String,

        /// Last supported date (RFC 3339 or YYYY-MM-DD, UTC)
        #[arg(long, value_parser = parse_expire_at)]
        expire_at: Option<DateTime<Utc>>,

        /// Flag this version as the latest release
        #[arg(long)]
        latest: bool,

        /// Who made the change
        #[arg(long)]
        changed_by: Option<String>,
    },

    /// List versions for a platform
    List {
        /// Platform (ios or android)
        #[arg(long)]
        platform: Platform,

        /// Show every recorded change, newest first
        #[arg(long)]
        history: bool,
    },
}

fn parse_expire_at(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{raw}' is neither RFC 3339 nor YYYY-MM-DD"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    appgate_core::init_tracing(cli.json, level);

    let config = match &cli.config {
        Some(path) => GateConfig::load(path)
            .await
            .with_context(|| format!("failed to load gate config {}", path.display()))?,
        None => GateConfig::default(),
    };

    match cli.command {
        Commands::Versions { action } => {
            let provider = open_provider(&cli.store, &config).await?;
            match action {
                VersionsAction::Add {
                    platform,
                    version,
                    expire_at,
                    latest,
                    changed_by,
                } => {
                    cmd_versions_add(&provider, platform, version, expire_at, latest, changed_by)
                        .await?
                }
                VersionsAction::List { platform, history } => {
                    cmd_versions_list(&provider, platform, history).await?
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { user_agent, path } => {
            let provider = open_provider(&cli.store, &config).await?;
            let status = cmd_check(provider, config, &user_agent, &path).await?;
            exit_code_for(status)
        }
        Commands::Config => {
            println!("{}", render_config(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn render_config(config: &GateConfig) -> Result<String> {
    let mut out = toml::to_string_pretty(config).context("failed to render gate config")?;
    let profiles = config.mobile_api.profiles();
    if !profiles.is_empty() {
        out.push_str(&format!("\n# video profile priority: {}\n", profiles.join(" > ")));
    }
    Ok(out)
}

async fn open_provider(store: &Path, config: &GateConfig) -> Result<Provider> {
    let ledger = FileVersionLedger::open(store)
        .await
        .with_context(|| format!("failed to open version ledger {}", store.display()))?;
    Ok(AppVersionConfig::new(ledger, InMemorySnapshotCache::new())
        .with_cache_timeout(Some(config.cache_timeout())))
}

/// Record a version
async fn cmd_versions_add(
    provider: &Provider,
    platform: Platform,
    version: String,
    expire_at: Option<DateTime<Utc>>,
    latest: bool,
    changed_by: Option<String>,
) -> Result<()> {
    let mut record = VersionRecord::new(platform, version).with_latest(latest);
    if let Some(deadline) = expire_at {
        record = record.with_expire_at(deadline);
    }
    if let Some(who) = changed_by {
        record = record.with_changed_by(who);
    }

    let saved = provider
        .save(record)
        .await
        .context("failed to save version record")?;

    println!(
        "Saved {} {}{}{}",
        saved.platform,
        saved.version,
        saved
            .expire_at
            .map(|d| format!(" (supported until {})", d.format("%Y-%m-%d %H:%M:%S UTC")))
            .unwrap_or_default(),
        if saved.is_latest { " [latest]" } else { "" }
    );
    Ok(())
}

/// Show current versions or the full history
async fn cmd_versions_list(provider: &Provider, platform: Platform, history: bool) -> Result<()> {
    let records: Vec<VersionRecord> = if history {
        provider.history(platform).await?
    } else {
        let snapshot = provider.get_all_versions(platform).await?;
        let mut current: Vec<VersionRecord> = snapshot.iter().cloned().collect();
        current.sort_by_cached_key(|r| r.parsed_version().ok());
        current
    };

    if records.is_empty() {
        println!("No versions configured for {platform}. Run 'appgate versions add' first.");
        return Ok(());
    }

    for record in records {
        let marker = if record.is_latest { "* " } else { "  " };
        let expires = record
            .expire_at
            .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        if history {
            println!(
                "{}{:<12} expires {:<24} changed {} by {}",
                marker,
                record.version,
                expires,
                record.change_date.format("%Y-%m-%d %H:%M:%S UTC"),
                record.changed_by.as_deref().unwrap_or("unknown"),
            );
        } else {
            println!("{}{:<12} expires {}", marker, record.version, expires);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckReport {
    mobile: bool,
    status: u16,
    headers: Vec<(String, String)>,
    verdict: Option<GateVerdict>,
}

/// Run one synthetic request through the gate
async fn cmd_check(
    provider: Provider,
    config: GateConfig,
    user_agent: &str,
    path: &str,
) -> Result<StatusCode> {
    let gate = AppVersionUpgrade::new(provider, config);
    let req = Request::builder()
        .uri(path)
        .header(http::header::USER_AGENT, user_agent)
        .body(())
        .context("invalid request path or user agent")?;

    let mobile = gate.config().enabled && gate.is_request_from_mobile_app(&req);
    let verdict = gate.check_request(&req).await?;

    let response = match &verdict {
        Some(verdict) if verdict.outdated => upgrade_required(),
        Some(verdict) => {
            let mut response = Response::new(());
            apply_headers(verdict, &mut response)?;
            response
        }
        None => Response::new(()),
    };

    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().context("non-ASCII header value")?;
            Ok((name.as_str().to_ascii_uppercase(), value.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = CheckReport {
        mobile,
        status: response.status().as_u16(),
        headers,
        verdict,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(status = report.status, "check complete");
    METRICS.flush();

    Ok(response.status())
}

/// Blocked clients exit with status 2.
fn exit_code_for(status: StatusCode) -> Result<ExitCode> {
    match status {
        s if s.is_success() => Ok(ExitCode::SUCCESS),
        StatusCode::UPGRADE_REQUIRED => Ok(ExitCode::from(2)),
        other => bail!("unexpected gate status {other}"),
    }
}
