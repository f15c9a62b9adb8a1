//! Compare recurring prepayment amounts side by side
//!
//! Each `--extra` amount becomes one scenario applied to the mortgage, or to
//! `--loan NAME` when given. All scenarios run in parallel against the same
//! opening balances.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use wealth_forecast::entities::Mortgage;
use wealth_forecast::{load_plan, PrepaymentVariant, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(
    name = "compare_prepayments",
    about = "Run the forecast under several recurring prepayment amounts"
)]
struct Cli {
    /// Household configuration (JSON)
    config: PathBuf,

    /// Recurring extra payment to try; repeat for several scenarios
    #[arg(long = "extra", required = true, num_args = 1..)]
    extras: Vec<f64>,

    /// Apply the extra to this loan instead of the mortgage
    #[arg(long)]
    loan: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(bad) = cli.extras.iter().find(|e| !e.is_finite() || **e < 0.0) {
        bail!("extra payment must be non-negative, got {}", bad);
    }

    let plan = load_plan(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    let target = cli.loan.clone().unwrap_or_else(|| Mortgage::NAME.to_string());

    let mut variants = vec![PrepaymentVariant::baseline()];
    variants.extend(cli.extras.iter().map(|&extra| match &cli.loan {
        Some(name) => PrepaymentVariant::loan(name, extra),
        None => PrepaymentVariant::mortgage(extra),
    }));

    let runner = ScenarioRunner::from_plan(plan);
    let start = Instant::now();
    let results = runner.run_all(&variants);
    let (hits, misses) = runner.cache_stats();
    log::info!(
        "{} scenario(s) in {:?}, schedule cache {} hit(s) / {} miss(es)",
        variants.len(),
        start.elapsed(),
        hits,
        misses
    );

    println!("Prepayment comparison for {}", target);
    println!(
        "{:<22} {:>16} {:>16} {:>16} {:>10}",
        "Scenario", "Final Wealth", "Liabilities", "Redirected", "Payoff"
    );
    println!("{}", "-".repeat(84));

    for (variant, result) in variants.iter().zip(results) {
        let summary =
            result.with_context(|| format!("running scenario `{}`", variant.label))?;
        let payoff = summary
            .payoff_month(&target)
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<22} {:>16.2} {:>16.2} {:>16.2} {:>10}",
            summary.label,
            summary.final_wealth,
            summary.final_liabilities,
            summary.redirected_total,
            payoff
        );
    }

    Ok(())
}
