use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use foresight_client::{ApiClient, decode_forecast, decode_profile, parse_forecast_csv};
use foresight_core::{
    BalanceTable, DailyClosingBalance, ImportantDatesRecord, classify, evaluate, parse_iso_date,
    today_in_timezone,
};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod auth;
mod cache;
mod config;
mod render;
mod state;
mod widget;

use config::Config;
use widget::UpcomingWidget;

#[derive(Parser, Debug)]
#[command(
    name = "foresight",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FORESIGHT_BUILD_SHA"), ")"),
    about = "Upcoming important dates, countdowns and cash-flow impact"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.foresight/config.toml
    Setup,

    /// Manage the API bearer token
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Show upcoming important dates with countdowns and forecast impact
    Upcoming(UpcomingArgs),

    /// Classify how soon a date is
    Countdown {
        /// Event date (YYYY-MM-DD)
        date: String,

        #[arg(long)]
        today: Option<String>,
    },

    /// Check whether the forecast balance covers a cost on a date
    Impact {
        #[arg(long)]
        date: String,

        #[arg(long)]
        cost: u64,

        #[command(flatten)]
        forecast: ForecastSource,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store a bearer token in ~/.foresight/auth.json
    PasteToken,

    /// Forget the stored bearer token
    Clear,
}

#[derive(Args, Debug)]
struct UpcomingArgs {
    /// Profile user id (default: config [api].user_id)
    #[arg(long)]
    user_id: Option<String>,

    /// Read a saved profile response instead of calling the API
    #[arg(long)]
    profile_file: Option<PathBuf>,

    #[command(flatten)]
    forecast: ForecastSource,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long)]
    today: Option<String>,

    /// Open the detail tooltip for row N
    #[arg(long)]
    detail: Option<usize>,

    /// Print the view as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct ForecastSource {
    /// Forecast owner (default: config [api].user_email)
    #[arg(long)]
    email: Option<String>,

    /// Read a saved forecast response instead of calling the API
    #[arg(long, conflicts_with = "forecast_csv")]
    forecast_file: Option<PathBuf>,

    /// Read daily closing balances from a date,closing_balance CSV
    #[arg(long)]
    forecast_csv: Option<PathBuf>,

    /// Always fetch the forecast, ignoring the local cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Setup => config::init_config()?,
        Command::Auth { command } => match command {
            AuthCommand::PasteToken => auth::paste_token()?,
            AuthCommand::Clear => auth::clear_token()?,
        },
        Command::Upcoming(args) => upcoming(args).await?,
        Command::Countdown { date, today } => {
            let cfg = config::load_config()?;
            let date = parse_date_arg(&date)?;
            let today = resolve_today(today.as_deref(), &cfg)?;
            let c = classify(date, today);
            println!("{} ({}, {} days)", c.label, c.tier.as_str(), c.days);
        }
        Command::Impact { date, cost, forecast } => {
            let cfg = config::load_config()?;
            let date = parse_date_arg(&date)?;
            let days = load_forecast(&forecast, &cfg).await?;
            let table = BalanceTable::from_entries(&days);
            let impact = evaluate(date, cost, &table, cfg.impact_policy());
            println!("{}", impact.verdict.description());
            if let (Some(balance), Some(remaining)) = (impact.closing_balance, impact.remaining) {
                println!(
                    "Balance on {}: {} → {} after {}",
                    date,
                    render::format_money(balance),
                    render::format_money(remaining),
                    render::format_money(cost as f64)
                );
            }
        }
    }

    Ok(())
}

async fn upcoming(args: UpcomingArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let today = resolve_today(args.today.as_deref(), &cfg)?;
    let mut widget = UpcomingWidget::new(today, cfg.impact_policy());

    // Independent sources: neither waits on the other.
    let (profile, forecast) = tokio::join!(
        load_profile(args.user_id.as_deref(), args.profile_file.as_deref(), &cfg),
        load_forecast(&args.forecast, &cfg),
    );
    widget.apply_profile(profile);
    widget.apply_forecast(forecast);

    if let Some(i) = args.detail {
        widget.toggle_tooltip(i);
    }

    let interactive = !args.json && io::stdin().is_terminal();
    loop {
        let view = widget.view();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print!("{}", render::render(&view, interactive));
        }

        if !(interactive && widget.profile_failed() && prompt_retry()?) {
            break;
        }
        widget.begin_profile_retry();
        let profile =
            load_profile(args.user_id.as_deref(), args.profile_file.as_deref(), &cfg).await;
        widget.apply_profile(profile);
        if let Some(i) = args.detail {
            widget.toggle_tooltip(i);
        }
    }

    widget.close();
    Ok(())
}

async fn load_profile(
    user_id: Option<&str>,
    profile_file: Option<&Path>,
    cfg: &Config,
) -> Result<Option<ImportantDatesRecord>> {
    if let Some(p) = profile_file {
        let body = std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        return Ok(decode_profile(&body));
    }

    let user_id = user_id
        .map(str::to_string)
        .or_else(|| cfg.api.user_id.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No user id. Pass --user-id or set config.toml [api].user_id")
        })?;

    let client = ApiClient::new(&cfg.base_url(), auth::resolve_token()?)?;
    Ok(client.fetch_profile(&user_id).await?)
}

async fn load_forecast(source: &ForecastSource, cfg: &Config) -> Result<Vec<DailyClosingBalance>> {
    if let Some(p) = &source.forecast_csv {
        return parse_forecast_csv(p).with_context(|| format!("parsing {}", p.display()));
    }
    if let Some(p) = &source.forecast_file {
        let body = std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        return Ok(decode_forecast(&body));
    }

    let Some(email) = source.email.clone().or_else(|| cfg.api.user_email.clone()) else {
        info!("no forecast owner configured; affordability will not be shown");
        return Ok(vec![]);
    };

    let now = Utc::now();
    if !source.no_cache {
        if let Some(cached) = cache::load_fresh(&email, now, cfg.cache_max_age()?) {
            debug!(fetched_at = %cached.fetched_at_utc, "using cached forecast");
            return Ok(cached.daily_cashflow);
        }
    }

    let client = ApiClient::new(&cfg.base_url(), auth::resolve_token()?)?;
    let days = client.fetch_forecast(&email).await?;
    cache::store(&email, &days, now);
    Ok(days)
}

fn resolve_today(explicit: Option<&str>, cfg: &Config) -> Result<NaiveDate> {
    match explicit {
        Some(s) => parse_date_arg(s),
        None => today_in_timezone(&cfg.display.timezone, Utc::now()),
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    match parse_iso_date(s) {
        Some(d) => Ok(d),
        None => bail!("invalid date '{s}' (expected YYYY-MM-DD)"),
    }
}

fn prompt_retry() -> Result<bool> {
    print!("Retry? [y/N]: ");
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(matches!(s.trim().to_lowercase().as_str(), "y" | "yes"))
}
