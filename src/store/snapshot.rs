//! Wealth snapshot CSV files

use super::{finish, format_cents, io_error, write_atomically};
use crate::calendar::YearMonth;
use crate::entities::EntitySet;
use crate::error::StoreError;
use crate::forecast::{SnapshotLayout, WealthSnapshot};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Current state as read from (or synthesized for) a state file
#[derive(Debug, Clone)]
pub struct LoadedState {
    pub snapshot: WealthSnapshot,

    /// True when no file existed and the snapshot came from configuration
    pub initialized: bool,
}

/// Write snapshots as CSV with the layout's header
pub fn write_snapshots_to_writer<W: Write>(
    writer: W,
    layout: &SnapshotLayout,
    snapshots: &[WealthSnapshot],
) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(layout.column_names())?;

    for snapshot in snapshots {
        if !snapshot.matches_layout(layout) {
            return Err(StoreError::Malformed(format!(
                "snapshot for {} does not match the column layout",
                snapshot.month
            )));
        }

        let mut record = Vec::with_capacity(layout.column_count());
        record.push(snapshot.month.to_string());
        record.push(format_cents(snapshot.total_wealth));
        record.push(format_cents(snapshot.mortgage_balance));
        record.extend(snapshot.other_loan_balances.iter().map(|&v| format_cents(v)));
        record.extend(snapshot.savings_balances.iter().map(|&v| format_cents(v)));
        record.extend(snapshot.retirement_balances.iter().map(|&v| format_cents(v)));
        record.push(format_cents(snapshot.brokerage_balance));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Replace `path` with the given snapshots
pub fn write_snapshots(
    path: &Path,
    layout: &SnapshotLayout,
    snapshots: &[WealthSnapshot],
) -> Result<(), StoreError> {
    write_atomically(path, |w| write_snapshots_to_writer(w, layout, snapshots))?;
    log::info!("saved {} snapshot(s) to {}", snapshots.len(), path.display());
    Ok(())
}

/// Recover the layout from a header row
fn parse_header(header: &csv::StringRecord) -> Result<SnapshotLayout, StoreError> {
    let columns: Vec<&str> = header.iter().collect();
    let fixed_ok = columns.len() >= 4
        && columns[0] == SnapshotLayout::MONTH
        && columns[1] == SnapshotLayout::TOTAL_WEALTH
        && columns[2] == SnapshotLayout::MORTGAGE
        && columns[columns.len() - 1] == SnapshotLayout::BROKERAGE;
    if !fixed_ok {
        return Err(StoreError::Malformed(format!("unexpected header {:?}", columns)));
    }

    let mut layout = SnapshotLayout::default();
    // Groups must appear in order: loans, savings, retirement
    let mut group = 0;
    for column in &columns[3..columns.len() - 1] {
        let (rank, target, name) = if let Some(name) =
            column.strip_prefix(SnapshotLayout::LOAN_PREFIX)
        {
            (0, &mut layout.loans, name)
        } else if let Some(name) = column.strip_prefix(SnapshotLayout::SAVINGS_PREFIX) {
            (1, &mut layout.savings, name)
        } else if let Some(name) = column.strip_prefix(SnapshotLayout::RETIREMENT_PREFIX) {
            (2, &mut layout.retirement, name)
        } else {
            return Err(StoreError::Malformed(format!("unknown column `{}`", column)));
        };
        if rank < group {
            return Err(StoreError::Malformed(format!(
                "column `{}` is out of order",
                column
            )));
        }
        group = rank;
        target.push(name.to_string());
    }

    Ok(layout)
}

fn parse_amount(record: &csv::StringRecord, index: usize, line: usize) -> Result<f64, StoreError> {
    let field = record.get(index).unwrap_or_default().trim();
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            StoreError::Malformed(format!("row {}: `{}` is not a number", line, field))
        })
}

/// Read every row; totals are recomputed from the balances
pub fn read_snapshots_from_reader<R: Read>(
    reader: R,
) -> Result<(SnapshotLayout, Vec<WealthSnapshot>), StoreError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let layout = parse_header(rdr.headers()?)?;

    let loans = layout.loans.len();
    let savings = layout.savings.len();
    let retirement = layout.retirement.len();

    let mut snapshots = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;

        let label = record.get(0).unwrap_or_default();
        let month: YearMonth = label
            .parse()
            .map_err(|e| StoreError::Malformed(format!("row {}: {}", line, e)))?;

        let amounts = (2..record.len())
            .map(|idx| parse_amount(&record, idx, line))
            .collect::<Result<Vec<_>, _>>()?;
        // amounts: mortgage, loans, savings, retirement, brokerage
        let (mortgage, rest) = amounts.split_at(1);
        let (loan_balances, rest) = rest.split_at(loans);
        let (savings_balances, rest) = rest.split_at(savings);
        let (retirement_balances, brokerage) = rest.split_at(retirement);

        snapshots.push(WealthSnapshot::assemble(
            month,
            mortgage[0],
            loan_balances.to_vec(),
            savings_balances.to_vec(),
            retirement_balances.to_vec(),
            brokerage[0],
        ));
    }

    Ok((layout, snapshots))
}

pub fn read_snapshots(path: &Path) -> Result<(SnapshotLayout, Vec<WealthSnapshot>), StoreError> {
    let file = File::open(path).map_err(io_error(path))?;
    read_snapshots_from_reader(BufReader::new(file))
}

/// Latest persisted snapshot, or the configured opening balances
///
/// When the file is absent a snapshot for `month` is synthesized from the
/// entity set; the caller decides whether to persist it.
pub fn load_or_initialize(
    path: &Path,
    entities: &EntitySet,
    month: YearMonth,
) -> Result<LoadedState, StoreError> {
    if !path.exists() {
        log::info!(
            "{} not found, starting from configured balances at {}",
            path.display(),
            month
        );
        return Ok(LoadedState {
            snapshot: entities.opening_snapshot(month),
            initialized: true,
        });
    }

    let (layout, mut snapshots) = read_snapshots(path)?;
    if layout != entities.layout() {
        return Err(StoreError::Malformed(format!(
            "{} has columns {:?}, configuration expects {:?}",
            path.display(),
            layout.column_names(),
            entities.layout().column_names()
        )));
    }
    let snapshot = snapshots
        .pop()
        .ok_or_else(|| StoreError::Malformed(format!("{} has no rows", path.display())))?;

    log::info!("loaded state for {} from {}", snapshot.month, path.display());
    Ok(LoadedState {
        snapshot,
        initialized: false,
    })
}
