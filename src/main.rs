//! Run Planner - Main Entry Point
//!
//! This is the main executable for the run-planner application.
//! It handles CLI argument parsing, configuration loading, and prints the
//! plan for the next long run.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Arg, ArgAction, Command};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use run_planner::{
    config::{CliArgs, PlannerSettings},
    plan::{
        assemble_plan_with_threshold, estimate_run_duration, format_pace, load_recent_runs,
        next_planned_run, round_up_minutes, PlanSummary, PlannedRun, RunActivity, Schedule,
    },
    route::{compose_two_loops, Geocoder, GoogleDirectionsClient, GoogleGeocoder, TwoLoopRoute},
    FULL_VERSION, NAME, VERSION,
};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
}

/// Calendar blocks are rounded up to this many minutes
const CALENDAR_ROUNDING_MIN: u32 = 15;

/// Print a section heading
fn print_heading(title: &str) {
    println!(
        "\n{bold}{blue}=== {} ==={reset}",
        title,
        bold = colors::BOLD,
        blue = colors::BLUE,
        reset = colors::RESET
    );
}

/// Print one aligned label/value line
fn print_field(label: &str, value: impl std::fmt::Display) {
    println!(
        "  {dim}{:<21}{reset}: {}",
        label,
        value,
        dim = colors::DIM,
        reset = colors::RESET
    );
}

/// Print the planned run
fn print_planned_run(run: &PlannedRun) {
    print_heading("Next Planned Run");
    print_field("Date", run.date.format("%d.%m.%Y"));
    print_field("Distance", format!("{} km", run.distance_km));
    if let Some(week) = run.week {
        print_field("Week", week);
    }
}

/// Print the recent runs table
fn print_recent_runs(runs: &[RunActivity]) {
    print_heading("Recent Runs");
    if runs.is_empty() {
        println!(
            "  {yellow}No run history available, using default pace{reset}",
            yellow = colors::YELLOW,
            reset = colors::RESET
        );
        return;
    }
    for run in runs {
        let pace = run
            .pace_min_per_km()
            .map(format_pace)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<40} {:>5.2} km  {:>4.1} km/h  {}",
            run.name, run.distance_km, run.average_speed_kmh, pace
        );
    }
}

/// Print the duration estimate
fn print_estimate(run: &PlannedRun, est_minutes: f64, block_minutes: u32, buffer_min: u32) {
    print_heading("Estimated Performance");
    print_field("Estimated pace", format_pace(est_minutes / run.distance_km));
    print_field("Estimated run time", format!("{:.0} min", est_minutes));
    print_field(
        &format!("Calendar block (+{})", buffer_min),
        format!("{} min", block_minutes),
    );
}

/// Print loops, suggested plan and the shareable link
fn print_route(route: &TwoLoopRoute, plan: &PlanSummary) {
    let combined = &route.combined;

    print_heading("Loops (calibrated)");
    print_field("Loop A", format!("{:.2} km", combined.loop_a_km));
    print_field("Loop B", format!("{:.2} km", combined.loop_b_km));
    print_field("A+B", format!("{:.2} km", plan.cycle_km));

    for (name, result) in [("A", &route.loop_a), ("B", &route.loop_b)] {
        if !result.converged {
            println!(
                "  {yellow}Loop {} did not converge after {} rounds{reset}",
                name,
                result.iterations,
                yellow = colors::YELLOW,
                reset = colors::RESET
            );
        }
    }

    print_heading("Suggested Plan");
    if plan.full_cycles > 0 {
        println!("  Run {}x: A -> B", plan.full_cycles);
    }
    match plan.extra_loop {
        Some(extra) => {
            let extra_km = extra.length_km(combined.loop_a_km, combined.loop_b_km);
            println!("  Then add one extra loop: {} ({:.2} km)", extra, extra_km);
            let total = plan.planned_route_km(combined.loop_a_km, combined.loop_b_km);
            print_field("Planned route", format!("{:.2} km", total));
        }
        None => println!("  No extra loop needed; you'll be very close to plan."),
    }

    println!(
        "\n{green}{bold}Route link (A then B):{reset}\n{}",
        combined.link,
        green = colors::GREEN,
        bold = colors::BOLD,
        reset = colors::RESET
    );
}

/// Parse a `YYYY-MM-DD` date argument
fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author("Run-Planner Team")
        .about("Plans the next long run with calibrated looped routes")
        .long_about(
            "Run Planner prepares the next long run:\n\
             - Picks the next planned run from a schedule file\n\
             - Estimates pace from recent runs\n\
             - Builds two loops of a preferred length from a start address\n\
             - Suggests how many loops cover the planned distance",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("write-config")
                .long("write-config")
                .value_name("FILE")
                .help("Write the effective configuration (TOML or JSON) and exit")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("schedule")
                .short('s')
                .long("schedule")
                .value_name("FILE")
                .help("Schedule file with planned runs (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("distance")
                .short('d')
                .long("distance")
                .value_name("KM")
                .help("Planned distance, instead of reading a schedule")
                .value_parser(clap::value_parser!(f64))
                .conflicts_with("schedule"),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .value_name("YYYY-MM-DD")
                .help("Date of the planned run (default: today)")
                .value_parser(parse_date)
                .requires("distance"),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .value_name("FILE")
                .help("Activity export (JSON) used for the pace estimate")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDRESS")
                .help("Start address (prompted if omitted)"),
        )
        .arg(
            Arg::new("bearing")
                .short('b')
                .long("bearing")
                .value_name("DEG")
                .help("Initial direction in degrees, 0=N 90=E 180=S 270=W (prompted if omitted)")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true),
        )
        .arg(
            Arg::new("loop-km")
                .long("loop-km")
                .value_name("KM")
                .help("Preferred length of one loop (default: 6.2)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("max-iters")
                .long("max-iters")
                .value_name("COUNT")
                .help("Calibration rounds per loop (default: 6)")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .value_name("KM")
                .help("Accepted loop length error (default: 0.2)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("MS")
                .help("Request timeout in milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("history-limit")
                .long("history-limit")
                .value_name("COUNT")
                .help("Number of recent runs to consider")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("directions-key")
                .long("directions-key")
                .value_name("KEY")
                .help("Directions API key"),
        )
        .arg(
            Arg::new("geocoding-key")
                .long("geocoding-key")
                .value_name("KEY")
                .help("Geocoding API key (default: directions key)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress logging except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        config_file: matches.get_one::<PathBuf>("config").cloned(),
        directions_key: matches.get_one::<String>("directions-key").cloned(),
        geocoding_key: matches.get_one::<String>("geocoding-key").cloned(),
        timeout_ms: matches.get_one::<u64>("timeout").copied(),
        target_loop_km: matches.get_one::<f64>("loop-km").copied(),
        max_iters: matches.get_one::<u32>("max-iters").copied(),
        tol_km: matches.get_one::<f64>("tolerance").copied(),
        history_limit: matches.get_one::<usize>("history-limit").copied(),
    }
}

/// Work out which run to plan: explicit distance, or the schedule's next entry
fn resolve_planned_run(matches: &clap::ArgMatches, today: NaiveDate) -> Result<Option<PlannedRun>> {
    if let Some(&distance_km) = matches.get_one::<f64>("distance") {
        if !(distance_km.is_finite() && distance_km > 0.0) {
            bail!("Planned distance must be positive, got {}", distance_km);
        }
        let date = matches.get_one::<NaiveDate>("date").copied().unwrap_or(today);
        return Ok(Some(PlannedRun {
            date,
            distance_km,
            week: None,
        }));
    }

    let Some(path) = matches.get_one::<PathBuf>("schedule") else {
        bail!("Either --distance or --schedule is required");
    };
    let schedule = Schedule::from_file(path)
        .with_context(|| format!("Failed to load schedule {}", path.display()))?;
    Ok(next_planned_run(&schedule, today).cloned())
}

/// Ask for a value on stdin
fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Save the merged settings so they can be reused with --config
fn write_config(settings: &PlannerSettings, path: &Path) -> Result<()> {
    settings
        .to_file(path)
        .with_context(|| format!("Failed to write configuration {}", path.display()))?;
    info!("Wrote configuration to {}", path.display());
    Ok(())
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Plan the route part: geocode, compose loops, assemble the plan
async fn plan_route(
    settings: &PlannerSettings,
    run: &PlannedRun,
    address: &str,
    bearing: f64,
) -> Result<(TwoLoopRoute, PlanSummary)> {
    let geocoder = GoogleGeocoder::new(
        settings.geocoding_url.clone(),
        settings.geocoding_key()?,
        settings.request_timeout(),
    )?;
    let start = geocoder
        .geocode(address)
        .await
        .context("Failed to resolve start address")?;

    let oracle = GoogleDirectionsClient::new(
        settings.directions_url.clone(),
        settings.directions_key()?,
        settings.request_timeout(),
    )?;

    info!(
        "Calibrating {:.1} km loops from {} at {:.0}°",
        settings.target_loop_km, start, bearing
    );
    let route = compose_two_loops(
        &oracle,
        start,
        settings.target_loop_km,
        bearing,
        &settings.calibration,
    )
    .await
    .context("Failed to build loops")?;

    let plan = assemble_plan_with_threshold(
        run.distance_km,
        route.combined.loop_a_km,
        route.combined.loop_b_km,
        settings.extra_loop_threshold_km,
    )?;

    Ok((route, plan))
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let matches = build_cli().get_matches();

    // Initialize logging
    init_tracing(matches.get_count("verbose"), matches.get_flag("quiet"));

    // Load configuration with full precedence chain
    let settings = parse_cli_args(&matches)
        .load_settings()
        .context("Failed to load configuration")?;
    info!("Starting {}", FULL_VERSION);

    if let Some(path) = matches.get_one::<PathBuf>("write-config") {
        write_config(&settings, path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let Some(run) = resolve_planned_run(&matches, today)? else {
        println!("No upcoming run found in the schedule.");
        return Ok(());
    };
    print_planned_run(&run);

    let runs = match matches.get_one::<PathBuf>("history") {
        Some(path) => load_recent_runs(path, settings.history_limit)
            .with_context(|| format!("Failed to load run history {}", path.display()))?,
        None => Vec::new(),
    };
    print_recent_runs(&runs);

    let est_minutes = estimate_run_duration(run.distance_km, &runs, settings.pace_window_ratio);
    let block_minutes = round_up_minutes(
        est_minutes + f64::from(settings.calendar_buffer_min),
        CALENDAR_ROUNDING_MIN,
    );
    print_estimate(&run, est_minutes, block_minutes, settings.calendar_buffer_min);

    println!();
    let address = match matches.get_one::<String>("address") {
        Some(address) => address.clone(),
        None => prompt("Start address")?,
    };
    let bearing = match matches.get_one::<f64>("bearing") {
        Some(&bearing) => bearing,
        None => prompt("Initial direction (deg, 0=N, 90=E, 180=S, 270=W)")?
            .parse::<f64>()
            .context("Direction must be a number of degrees")?,
    };

    let (route, plan) = plan_route(&settings, &run, &address, bearing).await?;
    print_route(&route, &plan);

    Ok(())
}
