//! Forecast Impact Evaluator: can the projected balance absorb an event's cost?
//!
//! The evaluator reads exactly one closing balance, keyed by the event date.
//! It never projects, interpolates or falls back to a neighbouring day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Projected end-of-day balance for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClosingBalance {
    pub date: NaiveDate,
    pub closing_balance: f64,
}

/// Read-only lookup of closing balances by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceTable {
    by_date: HashMap<NaiveDate, f64>,
}

impl BalanceTable {
    /// Later entries win when a date repeats.
    pub fn from_entries(entries: &[DailyClosingBalance]) -> Self {
        let by_date = entries.iter().map(|e| (e.date, e.closing_balance)).collect();
        Self { by_date }
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.by_date.get(&date).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }
}

impl FromIterator<DailyClosingBalance> for BalanceTable {
    fn from_iter<I: IntoIterator<Item = DailyClosingBalance>>(iter: I) -> Self {
        let by_date = iter.into_iter().map(|e| (e.date, e.closing_balance)).collect();
        Self { by_date }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactVerdict {
    Covered,
    Tight,
    Shortfall,
    /// Cannot assess; render no affordability marker.
    Unknown,
}

impl ImpactVerdict {
    pub fn icon(&self) -> Option<&'static str> {
        match self {
            ImpactVerdict::Covered => Some("✓"),
            ImpactVerdict::Tight => Some("!"),
            ImpactVerdict::Shortfall => Some("✗"),
            ImpactVerdict::Unknown => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ImpactVerdict::Covered => "Covered by forecast balance",
            ImpactVerdict::Tight => "Tight: little left after this expense",
            ImpactVerdict::Shortfall => "Shortfall: balance won't cover this",
            ImpactVerdict::Unknown => "No forecast for this date",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpactPolicy {
    /// Remaining balance at or below this (but not negative) is "tight".
    pub tight_margin: f64,
}

impl Default for ImpactPolicy {
    fn default() -> Self {
        Self { tight_margin: 500.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub verdict: ImpactVerdict,
    pub closing_balance: Option<f64>,
    pub remaining: Option<f64>,
}

impl Impact {
    pub fn unknown() -> Self {
        Self {
            verdict: ImpactVerdict::Unknown,
            closing_balance: None,
            remaining: None,
        }
    }
}

pub fn evaluate(date: NaiveDate, cost: u64, table: &BalanceTable, policy: ImpactPolicy) -> Impact {
    if cost == 0 || table.is_empty() {
        return Impact::unknown();
    }
    // NaN or infinite balances cannot be assessed.
    let Some(closing_balance) = table.get(date).filter(|b| b.is_finite()) else {
        return Impact::unknown();
    };

    let remaining = closing_balance - cost as f64;
    let verdict = if remaining > policy.tight_margin {
        ImpactVerdict::Covered
    } else if remaining >= 0.0 {
        ImpactVerdict::Tight
    } else {
        ImpactVerdict::Shortfall
    };

    Impact {
        verdict,
        closing_balance: Some(closing_balance),
        remaining: Some(remaining),
    }
}
