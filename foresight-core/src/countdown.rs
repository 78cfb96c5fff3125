//! Countdown Classifier: days-until-event to an urgency tier and label.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::days_until;

/// Display bucket derived from days-until-event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    /// Within a week (0-7 days)
    Urgent,
    /// Within a month (8-30 days)
    Soon,
    /// Within a quarter (31-90 days)
    Upcoming,
    /// More than 90 days out
    Distant,
}

impl UrgencyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Urgent => "urgent",
            UrgencyTier::Soon => "soon",
            UrgencyTier::Upcoming => "upcoming",
            UrgencyTier::Distant => "distant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub label: String,
    pub tier: UrgencyTier,
}

const URGENT_MAX_DAYS: i64 = 7;
const SOON_MAX_DAYS: i64 = 30;
const UPCOMING_MAX_DAYS: i64 = 90;

pub fn classify(event_date: NaiveDate, today: NaiveDate) -> Countdown {
    classify_days(days_until(event_date, today))
}

/// Total over all day counts. Negative counts only show up for stale input and
/// are reported as overdue within the urgent tier.
pub fn classify_days(days: i64) -> Countdown {
    let (label, tier) = if days <= URGENT_MAX_DAYS {
        let label = match days {
            d if d < 0 => "Overdue".to_string(),
            0 => "Today".to_string(),
            d => day_label(d),
        };
        (label, UrgencyTier::Urgent)
    } else if days <= SOON_MAX_DAYS {
        (day_label(days), UrgencyTier::Soon)
    } else if days <= UPCOMING_MAX_DAYS {
        (day_label(days), UrgencyTier::Upcoming)
    } else {
        let months = (days as f64 / 30.0).round() as i64;
        let label = if months == 1 {
            "1 month".to_string()
        } else {
            format!("{months} months")
        };
        (label, UrgencyTier::Distant)
    };

    Countdown { days, label, tier }
}

fn day_label(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}
