//! HOSTING-Q CLI: headless demo runs and configuration inspection.
//!
//! Commands:
//! - `run`: drive one view's run lifecycle and print the result
//! - `config show`: print the effective configuration as TOML
//! - `config path`: print the default config file location

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostq_core::chart::{allocation_bars, format_percent, schedule_chart, sorted_distribution};
use hostq_core::config::{default_config_path, ServiceProvider};
use hostq_core::domain::{CvarResult, PortfolioResult, RunPayload, ScheduledTask, ShapeError};
use hostq_core::lifecycle::run_to_completion;
use hostq_core::{
    service, AppConfig, DemoView, OptimizationService, QuantumBackend, RunLifecycle, RunRequest,
    RunStatus, SchedulingParams, ViewParams,
};

#[derive(Parser)]
#[command(
    name = "hostq",
    about = "HOSTING-Q CLI — quantum-inspired optimization demos"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one demo view and print its result.
    Run {
        /// View: portfolio, scheduling or risk.
        view: DemoView,

        /// Simulated backend: dwave, ibm, willow, azure.
        #[arg(long)]
        backend: Option<QuantumBackend>,

        /// Number of tasks (scheduling only, 3-8).
        #[arg(long, default_value_t = 5)]
        tasks: u8,

        /// Number of resources (scheduling only, 2-5).
        #[arg(long, default_value_t = 3)]
        resources: u8,

        /// Offline mode: use the synthetic generator, no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Seed for the synthetic generator.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the outcome as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Config file. Defaults to the per-user config path.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML (API key redacted).
    Show {
        /// Config file. Defaults to the per-user config path.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default config file path.
    Path,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("HOSTQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            view,
            backend,
            tasks,
            resources,
            offline,
            seed,
            json,
            config,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if offline {
                cfg.service.provider = ServiceProvider::Synthetic;
            }
            if let Some(seed) = seed {
                cfg.service.seed = seed;
            }
            let backend = backend.unwrap_or(cfg.ui.default_backend);
            let params = match view {
                DemoView::Portfolio => ViewParams::Portfolio,
                DemoView::Scheduling => {
                    ViewParams::Scheduling(SchedulingParams::new(tasks, resources))
                }
                DemoView::Risk => ViewParams::Risk,
            };
            let request = RunRequest::new(backend, params);
            let service = service::from_config(&cfg.service);
            run_cmd(service.as_ref(), &request, json)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => {
                let mut cfg = load_config(config.as_deref())?;
                if cfg.service.api_key.is_some() {
                    cfg.service.api_key = Some("<redacted>".into());
                }
                print!("{}", cfg.to_toml_string()?);
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", default_config_path().display());
                Ok(())
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    AppConfig::load(&path).with_context(|| format!("loading {}", path.display()))
}

fn run_cmd(service: &dyn OptimizationService, request: &RunRequest, as_json: bool) -> Result<()> {
    info!(
        service = service.name(),
        view = ?request.view(),
        backend = %request.backend,
        "running"
    );
    match request.view() {
        DemoView::Portfolio => {
            let lc = drive::<PortfolioResult>(service, request);
            report(&lc, request, as_json, print_portfolio)
        }
        DemoView::Scheduling => {
            let lc = drive::<Vec<ScheduledTask>>(service, request);
            report(&lc, request, as_json, |tasks| print_schedule(tasks))
        }
        DemoView::Risk => {
            let lc = drive::<CvarResult>(service, request);
            report(&lc, request, as_json, print_risk)
        }
    }
}

fn drive<R>(service: &dyn OptimizationService, request: &RunRequest) -> RunLifecycle<R>
where
    R: TryFrom<RunPayload, Error = ShapeError>,
{
    let mut lifecycle = RunLifecycle::new();
    run_to_completion(&mut lifecycle, service, request);
    lifecycle
}

fn report<R: Serialize>(
    lifecycle: &RunLifecycle<R>,
    request: &RunRequest,
    as_json: bool,
    print_table: impl Fn(&R),
) -> Result<()> {
    let status = lifecycle.status();
    if as_json {
        let out = json!({
            "view": request.view(),
            "backend": request.backend,
            "status": status,
            "result": lifecycle.result(),
            "explanation": lifecycle.explanation(),
            "error": lifecycle.error(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if let Some(result) = lifecycle.result() {
        println!("{}", status.text(request.backend));
        println!();
        print_table(result);
        println!();
        println!("Quantum Approach Explanation");
        println!("{}", lifecycle.explanation());
    }

    if status == RunStatus::Error {
        bail!(
            "run failed: {}",
            lifecycle.error().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_portfolio(result: &PortfolioResult) {
    println!("{:<18} {:>10}", "Expected Return", format_percent(result.expected_return));
    println!("{:<18} {:>10}", "Volatility", format_percent(result.volatility));
    println!("{:<18} {:>10.2}", "Sharpe Ratio", result.sharpe_ratio);
    println!();
    println!("{:<24} {:>10}", "Asset", "Weight");
    println!("{}", "-".repeat(35));
    for (asset, pct) in allocation_bars(&result.allocations) {
        println!("{:<24} {:>10}", asset, format_percent(pct));
    }
}

fn print_schedule(tasks: &[ScheduledTask]) {
    let chart = schedule_chart(tasks);
    println!("{:<16} {:<16} {:>8} {:>8}", "Resource", "Task", "Start", "End");
    println!("{}", "-".repeat(51));
    for row in &chart.rows {
        for (task, [start, end]) in &row.intervals {
            println!(
                "{:<16} {:<16} {:>7.1}h {:>7.1}h",
                row.resource, task, start, end
            );
        }
    }
}

fn print_risk(result: &CvarResult) {
    println!("{:<24} {:>10}", "Value-at-Risk (95%)", format_percent(result.var95));
    println!("{:<24} {:>10}", "Conditional VaR (95%)", format_percent(result.cvar95));
    println!();
    println!("{:>10} {:>12}", "Return %", "Probability");
    println!("{}", "-".repeat(23));
    for point in sorted_distribution(&result.distribution) {
        println!("{:>10.2} {:>12.4}", point.value, point.probability);
    }
}
