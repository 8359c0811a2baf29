#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use chrono::TimeZone;
use clap::{CommandFactory, Parser, Subcommand};
use daybook_core::Calendar;
use daybook_core::config::{self, DaybookConfig};
use daybook_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "daybook: mood and time journal reports",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Event file: a JSON array or JSON Lines of event records.
    #[arg(long, global = true, value_name = "FILE")]
    events: Option<PathBuf>,

    /// IANA timezone for day boundaries (overrides DAYBOOK_TZ and config).
    #[arg(long, global = true, value_name = "IANA")]
    timezone: Option<String>,

    /// Config file (default: <config dir>/daybook/config.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Input",
        about = "Validate an event file",
        long_about = "Load an event file and check ordering, mood ranges, timestamps, and ids.",
        after_help = "EXAMPLES:\n    daybook --events journal.json validate\n\n    # Emit machine-readable output\n    daybook --events journal.jsonl validate --json"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Show one day's grid row",
        long_about = "Show the time blocks drawn for one day, with overnight intervals split at midnight.",
        after_help = "EXAMPLES:\n    daybook --events journal.json grid --date 2024-03-05\n\n    # In another zone\n    daybook --events journal.json --timezone Asia/Tokyo grid"
    )]
    Grid(cmd::grid::GridArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Summarize days",
        long_about = "Duration-weighted mood, awake wakefulness, sleep hours, and notes per day.",
        after_help = "EXAMPLES:\n    daybook --events journal.json day --date 2024-03-01 --to 2024-03-07"
    )]
    Day(cmd::day::DayArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Trend series over calendar buckets",
        after_help = "EXAMPLES:\n    daybook --events journal.json trend categories --granularity monthly --count 6\n\n    daybook --events journal.json trend categories --category Sleep --category Work --no-other\n\n    daybook --events journal.json trend mood --from 2024-03-01 --to 2024-03-02 --sample-minutes 30\n\n    daybook --events journal.json trend mood-buckets --granularity weekly --page -1"
    )]
    Trend {
        #[command(subcommand)]
        command: cmd::trend::TrendCommand,
    },

    #[command(
        next_help_heading = "Input",
        about = "List category spellings and merge candidates",
        long_about = "Group categories that differ only by case or surrounding whitespace and propose merges.",
        after_help = "EXAMPLES:\n    daybook --events journal.json categories\n\n    # Every category, including those spelled one way\n    daybook --events journal.json categories --all"
    )]
    Categories(cmd::categories::CategoriesArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    daybook completions bash > /etc/bash_completion.d/daybook"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAYBOOK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "daybook=debug,info"
        } else {
            "daybook=info,warn"
        })
    });

    let format = env::var("DAYBOOK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DaybookConfig> {
    match path {
        Some(path) => config::load_config(path),
        None => config::load_user_config(),
    }
}

/// Run a data command with the calendar resolved for this invocation.
fn dispatch<Tz: TimeZone>(
    command: &Commands,
    ctx: &cmd::Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    match command {
        Commands::Validate(args) => cmd::validate::run_validate(args, ctx, cal),
        Commands::Grid(args) => cmd::grid::run_grid(args, ctx, cal),
        Commands::Day(args) => cmd::day::run_day(args, ctx, cal),
        Commands::Trend { command } => cmd::trend::run_trend(command, ctx, cal),
        Commands::Categories(args) => cmd::categories::run_categories(args, ctx),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

fn run(command: &Commands, timezone: Option<&str>, ctx: &cmd::Context) -> anyhow::Result<()> {
    match timezone {
        Some(name) => dispatch(command, ctx, &Calendar::named(name)?),
        None => dispatch(command, ctx, &Calendar::local()),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let (config, config_error) = match load_config(cli.config.as_ref()) {
        Ok(config) => (config, None),
        Err(err) => (DaybookConfig::default(), Some(err)),
    };
    let output = resolve_output_mode(cli.format, cli.json, &config);

    if let Some(err) = config_error {
        let error = CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError);
        render_error(output, &error).context("failed to write error")?;
        return Ok(ExitCode::FAILURE);
    }

    let timezone = config::resolve_timezone(cli.timezone.as_deref(), &config);
    let zone = timezone.clone().unwrap_or_else(|| "local".to_string());
    debug!(%zone, output = output.as_str(), "invocation resolved");

    let ctx = cmd::Context {
        config,
        output,
        zone,
        events: cli.events,
    };

    match run(&cli.command, timezone.as_deref(), &ctx) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            render_error(output, &CliError::from_anyhow(&err))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
