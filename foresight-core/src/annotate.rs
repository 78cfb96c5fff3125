//! Pair each upcoming event with its countdown and forecast impact.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::countdown::{Countdown, classify};
use crate::impact::{BalanceTable, Impact, ImpactPolicy, evaluate};
use crate::important_dates::NormalizedEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    pub event: NormalizedEvent,
    pub countdown: Countdown,
    pub impact: Impact,
}

/// `forecast` is `None` while the forecast is loading or after it failed;
/// every impact is then unknown.
pub fn annotate(
    events: &[NormalizedEvent],
    today: NaiveDate,
    forecast: Option<&BalanceTable>,
    policy: ImpactPolicy,
) -> Vec<AnnotatedEvent> {
    events
        .iter()
        .map(|e| AnnotatedEvent {
            event: e.clone(),
            countdown: classify(e.date, today),
            impact: forecast
                .map(|t| evaluate(e.date, e.cost, t, policy))
                .unwrap_or_else(Impact::unknown),
        })
        .collect()
}
