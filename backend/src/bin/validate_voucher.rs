//! Validate or redeem a voucher code against a canteen snapshot.
//!
//! Prints the verdict as JSON on stdout and exits with status 0 when the
//! redemption is accepted, 1 when it is rejected. Logs go to stderr and are
//! filtered through `RUST_LOG`.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use canteen::config::RedemptionSettings;
use canteen::domain::{MealTypeId, RedemptionService};
use canteen::outbound::snapshot::Snapshot;
use chrono::{DateTime, FixedOffset};
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `validate-voucher` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "validate-voucher",
    about = "Check whether a voucher code may be redeemed for a meal",
    version
)]
struct CliArgs {
    /// Voucher code as printed on the badge or ticket.
    #[arg(long, value_name = "code")]
    code: String,
    /// Meal type identifier.
    #[arg(long = "meal-type", value_name = "uuid")]
    meal_type: MealTypeId,
    /// Evaluate at this RFC 3339 instant instead of the current time.
    #[arg(long, value_name = "rfc3339", value_parser = parse_instant)]
    at: Option<DateTime<FixedOffset>>,
    /// Commit the redemption when accepted.
    #[arg(long)]
    commit: bool,
    /// Snapshot file. Falls back to `REDEMPTION_SNAPSHOT_PATH` or the
    /// bundled fixture.
    #[arg(long, value_name = "path")]
    snapshot: Option<PathBuf>,
}

fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|error| format!("invalid RFC 3339 instant: {error}"))
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = RedemptionSettings::load_from_iter([OsString::from("validate-voucher")])
        .wrap_err("failed to load redemption settings")?;
    let policy = settings
        .policy()
        .wrap_err("invalid redemption settings")?;
    let snapshot_path = args
        .snapshot
        .clone()
        .unwrap_or_else(|| settings.snapshot_path());
    let store = Snapshot::load(&snapshot_path)
        .and_then(Snapshot::into_store)
        .wrap_err_with(|| format!("failed to load snapshot {}", snapshot_path.display()))?;

    let service = RedemptionService::new(Arc::new(store), Arc::new(DefaultClock), policy);
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;

    let verdict = runtime.block_on(async {
        match (args.at, args.commit) {
            (Some(at), true) => service.redeem_at(&args.code, &args.meal_type, at).await,
            (Some(at), false) => {
                service
                    .validate_redemption_at(&args.code, &args.meal_type, at)
                    .await
            }
            (None, true) => service.redeem(&args.code, &args.meal_type).await,
            (None, false) => {
                service
                    .validate_redemption(&args.code, &args.meal_type)
                    .await
            }
        }
    });

    let rendered = serde_json::to_string_pretty(&verdict).wrap_err("failed to render verdict")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").wrap_err("failed to write verdict")?;

    Ok(if verdict.is_accepted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
