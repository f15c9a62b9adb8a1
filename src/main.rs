//! Wealth Forecast CLI
//!
//! Runs the monthly forecast for a household configuration and writes the
//! resulting snapshots to CSV.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wealth_forecast::store::{load_or_initialize, write_amortization_report, write_snapshots};
use wealth_forecast::{load_plan, ForecastEngine};

#[derive(Parser, Debug)]
#[command(
    name = "wealth_forecast",
    about = "Monthly household net worth forecast with debt payoff waterfall"
)]
struct Cli {
    /// Household configuration (JSON)
    config: PathBuf,

    /// Forecast output CSV
    #[arg(short, long, default_value = "wealth_forecast.csv")]
    output: PathBuf,

    /// Current-state CSV; created from the configuration on first run
    #[arg(long, default_value = "current_wealth.csv")]
    state: PathBuf,

    /// Also export the mortgage amortization schedule to this CSV
    #[arg(long)]
    amortization: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let plan = load_plan(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    let take_home = plan.monthly_take_home();
    let layout = plan.entities.layout();

    let loaded = load_or_initialize(&cli.state, &plan.entities, plan.forecast.start_month)
        .with_context(|| format!("reading state {}", cli.state.display()))?;
    if loaded.initialized {
        write_snapshots(&cli.state, &layout, std::slice::from_ref(&loaded.snapshot))
            .with_context(|| format!("writing state {}", cli.state.display()))?;
        println!("Initialized {}", cli.state.display());
    }

    if let Some(path) = &cli.amortization {
        match &plan.entities.mortgage {
            Some(mortgage) => write_amortization_report(path, mortgage.schedule())
                .with_context(|| format!("writing amortization report {}", path.display()))?,
            None => log::warn!("no mortgage configured; skipping amortization report"),
        }
    }

    let engine = ForecastEngine::new(plan.entities, plan.forecast);
    let result = engine.run(&loaded.snapshot).context("running forecast")?;

    let rows: Vec<_> = result.all_snapshots().cloned().collect();
    write_snapshots(&cli.output, &layout, &rows)
        .with_context(|| format!("writing forecast {}", cli.output.display()))?;

    let summary = result.summary();
    println!("Wealth Forecast");
    println!("===============\n");
    println!("Monthly take-home pay: ${:.2}", take_home);
    println!(
        "Months: {} ({} to {})",
        summary.total_months, loaded.snapshot.month, summary.final_month
    );
    println!();

    println!(
        "{:>8} {:>16} {:>16} {:>16}",
        "Month", "Total Wealth", "Liabilities", "Brokerage"
    );
    println!("{}", "-".repeat(60));
    for snapshot in result.all_snapshots().step_by(12) {
        println!(
            "{:>8} {:>16.2} {:>16.2} {:>16.2}",
            snapshot.month.to_string(),
            snapshot.total_wealth,
            snapshot.total_liabilities(),
            snapshot.brokerage_balance
        );
    }
    println!();

    for payoff in &result.payoffs {
        println!("{} paid off in {}", payoff.name, payoff.month);
    }
    println!(
        "Final wealth: ${:.2} (change ${:.2}), redirected to brokerage: ${:.2}",
        summary.final_wealth, summary.wealth_change, summary.redirected_total
    );
    if summary.warnings > 0 {
        println!("{} month(s) skipped for missing schedule rows", summary.warnings);
    }
    println!("Forecast written to {}", cli.output.display());

    Ok(())
}
