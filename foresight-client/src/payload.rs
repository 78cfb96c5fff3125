//! Tolerant decoding of the two endpoint bodies.
//!
//! Profile: `{ "profile": { "important_dates": {...} | null, ... } }`
//! Forecast: `{ "forecast": { "daily_cashflow": [{ "date", "closing_balance" }, ...] } }`
//!
//! Anything that does not match is logged and decoded as "no data".

use foresight_core::{DailyClosingBalance, ImportantDatesRecord, parse_iso_date};
use serde_json::Value;
use tracing::warn;

pub fn decode_profile(body: &str) -> Option<ImportantDatesRecord> {
    let doc: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "profile response is not JSON");
            return None;
        }
    };

    let dates = doc.pointer("/profile/important_dates")?;
    if dates.is_null() {
        return None;
    }

    match serde_json::from_value(dates.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "important_dates has an unexpected shape");
            None
        }
    }
}

pub fn decode_forecast(body: &str) -> Vec<DailyClosingBalance> {
    let doc: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "forecast response is not JSON");
            return vec![];
        }
    };

    let Some(rows) = doc
        .pointer("/forecast/daily_cashflow")
        .and_then(Value::as_array)
    else {
        warn!("forecast response has no daily_cashflow array");
        return vec![];
    };

    let out: Vec<DailyClosingBalance> = rows.iter().filter_map(decode_day).collect();
    if out.len() < rows.len() {
        warn!(dropped = rows.len() - out.len(), "skipped malformed daily_cashflow entries");
    }
    out
}

fn decode_day(row: &Value) -> Option<DailyClosingBalance> {
    let date = row.get("date").and_then(Value::as_str).and_then(parse_iso_date)?;
    let closing_balance: f64 = match row.get("closing_balance")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    // "NaN" and "inf" parse as f64 but are not balances.
    if !closing_balance.is_finite() {
        return None;
    }
    Some(DailyClosingBalance {
        date,
        closing_balance,
    })
}
