//! Import a cash-flow forecast exported as CSV.
//!
//! Expected columns: `date,closing_balance`. A header row is optional; rows
//! whose date or balance does not parse are skipped. Dates may be
//! `YYYY-MM-DD` or `MM/DD/YYYY`, balances may carry `$` and thousands commas.

use chrono::NaiveDate;
use foresight_core::{DailyClosingBalance, parse_iso_date};
use std::io::Read;
use std::path::Path;

use crate::error::ImportError;

pub fn parse_forecast_csv(
    path: impl AsRef<Path>,
) -> Result<Vec<DailyClosingBalance>, ImportError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ImportError::Open {
        path: path.display().to_string(),
        source: csv::Error::from(e),
    })?;
    parse_forecast_csv_reader(file)
}

pub fn parse_forecast_csv_reader<R: Read>(
    reader: R,
) -> Result<Vec<DailyClosingBalance>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let Some(date) = record.get(0).and_then(parse_date) else {
            continue;
        };
        let Some(closing_balance) = record.get(1).and_then(parse_amount) else {
            continue;
        };
        out.push(DailyClosingBalance {
            date,
            closing_balance,
        });
    }

    Ok(out)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_iso_date(s).or_else(|| NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").ok())
}

fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.trim().parse().ok().filter(|b: &f64| b.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_header_and_mixed_formats() {
        let data = "date,closing_balance\n\
                    2026-10-20,1500.25\n\
                    10/21/2026,\"$1,240.00\"\n\
                    ,99\n\
                    2026-10-23,n/a\n\
                    2026-10-24,-75\n";
        let days = parse_forecast_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
        assert_eq!(days[1].closing_balance, 1240.0);
        assert_eq!(days[2].closing_balance, -75.0);
    }

    #[test]
    fn skips_non_finite_balances() {
        let data = "2026-11-01,inf\n2026-11-02,NaN\n2026-11-03,-infinity\n2026-11-04,12.5\n";
        let days = parse_forecast_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].closing_balance, 12.5);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = parse_forecast_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ImportError::Open { .. }));
    }
}
