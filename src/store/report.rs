//! Amortization schedule export

use super::{finish, format_cents, write_atomically};
use crate::amortization::AmortizationSchedule;
use crate::error::StoreError;
use std::io::Write;
use std::path::Path;

const REPORT_HEADER: [&str; 5] = ["month", "payment", "interest", "principal", "balance"];

/// Write every schedule row, origination month included, rounded to cents
pub fn write_amortization_report_to_writer<W: Write>(
    writer: W,
    schedule: &AmortizationSchedule,
) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REPORT_HEADER)?;

    for row in schedule.rows() {
        wtr.write_record([
            row.month.to_string(),
            format_cents(row.payment),
            format_cents(row.interest),
            format_cents(row.principal),
            format_cents(row.balance),
        ])?;
    }

    finish(wtr)
}

pub fn write_amortization_report(
    path: &Path,
    schedule: &AmortizationSchedule,
) -> Result<(), StoreError> {
    write_atomically(path, |w| write_amortization_report_to_writer(w, schedule))?;
    log::info!(
        "wrote {}-row amortization report to {}",
        schedule.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::build;

    #[test]
    fn test_report_has_every_row() {
        let schedule = build(320_100.0, 0.0299, 360, "08-2020", 0.0, 0.0, 0.0).unwrap();
        let mut buf = Vec::new();
        write_amortization_report_to_writer(&mut buf, &schedule).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 362);
        assert_eq!(lines[0], "month,payment,interest,principal,balance");
        assert!(lines[1].starts_with("08-2020,"));
        assert!(lines[1].contains(",797.58,"));
        assert!(lines[361].starts_with("08-2050,0.00,0.00,0.00,0.00"));
    }
}
