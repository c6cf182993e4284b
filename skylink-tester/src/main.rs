mod flightgen;
mod report;
mod scenarios;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;

use scenarios::{find, ScenarioResult, CATALOG};

#[derive(Debug, Parser)]
#[command(name = "skylink-tester", version)]
#[command(about = "Automated QA sweeps for the Skylink ACARS engine")]
struct Args {
    /// Scenarios to run (comma-separated), or "all"
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "warn" }),
    );
    builder.init();

    if args.list_scenarios {
        println!("{}", "Available scenarios".bold());
        for (name, description, _) in CATALOG {
            println!("  {} - {description}", name.cyan());
        }
        return Ok(());
    }

    let requested = if args.scenarios == "all" {
        CATALOG.iter().map(|(n, _, _)| (*n).to_string()).collect()
    } else {
        split_csv(&args.scenarios)
    };
    let seeds: Vec<u64> = split_csv(&args.seeds)
        .iter()
        .map(|s| s.parse().map_err(|_| anyhow::anyhow!("bad seed: {s}")))
        .collect::<Result<_>>()?;

    let started = Instant::now();
    let mut results = Vec::new();
    for name in &requested {
        let Some(run) = find(name) else {
            bail!("unknown scenario: {name} (try --list-scenarios)");
        };
        for &seed in &seeds {
            let outcome = run(seed);
            results.push(ScenarioResult {
                name: name.clone(),
                seed,
                passed: outcome.is_ok(),
                error: outcome.err().map(|e| format!("{e:#}")),
            });
        }
    }

    match args.report.as_str() {
        "json" => {
            let json = report::json_report(&results);
            match &args.output {
                Some(path) => fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
        _ => report::console_report(&results, started.elapsed()),
    }

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}
