//! Export amortization schedules for every configured loan
//!
//! Writes `<name>_amortization.csv` per loan (mortgage included) with all
//! `term + 1` rows, origination month first.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use wealth_forecast::amortization::build_many;
use wealth_forecast::entities::{Liability, Mortgage};
use wealth_forecast::load_plan;
use wealth_forecast::store::write_amortization_report;

#[derive(Parser, Debug)]
#[command(
    name = "amortization_table",
    about = "Write a full amortization schedule for each configured loan"
)]
struct Cli {
    /// Household configuration (JSON)
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let plan = load_plan(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    std::fs::create_dir_all(&cli.dir)
        .with_context(|| format!("creating {}", cli.dir.display()))?;

    // The mortgage already holds its schedule; other loans are built here
    let mut names = Vec::new();
    let mut terms = Vec::new();
    for loan in &plan.entities.loans {
        names.push(loan.name().to_string());
        terms.push(loan.schedule_terms());
    }

    let start = Instant::now();
    let built = build_many(&terms);
    log::debug!("built {} schedule(s) in {:?}", built.len(), start.elapsed());

    let mut schedules = Vec::with_capacity(built.len() + 1);
    if let Some(mortgage) = &plan.entities.mortgage {
        schedules.push((Mortgage::NAME.to_string(), mortgage.schedule().as_ref().clone()));
    }
    for (name, schedule) in names.into_iter().zip(built) {
        let schedule = schedule.with_context(|| format!("building schedule for {}", name))?;
        schedules.push((name, schedule));
    }

    if schedules.is_empty() {
        println!("No loans configured");
        return Ok(());
    }

    println!(
        "{:<16} {:>8} {:>12} {:>14} {:>10}",
        "Loan", "Rows", "Payment", "Interest", "Payoff"
    );
    println!("{}", "-".repeat(64));
    for (name, schedule) in &schedules {
        let path = cli.dir.join(format!("{}_amortization.csv", name));
        write_amortization_report(&path, schedule)
            .with_context(|| format!("writing {}", path.display()))?;

        let payoff = schedule
            .payoff_month()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:>8} {:>12.2} {:>14.2} {:>10}",
            name,
            schedule.len(),
            schedule.base_payment(),
            schedule.total_interest(),
            payoff
        );
    }

    Ok(())
}
