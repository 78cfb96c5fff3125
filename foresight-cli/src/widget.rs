//! Upcoming-dates widget state.
//!
//! Profile and forecast load independently. The list is shown as soon as the
//! profile arrives; until the forecast is loaded every impact is unknown.

use chrono::NaiveDate;
use foresight_core::{
    AnnotatedEvent, BalanceTable, DailyClosingBalance, ImpactPolicy, ImportantDatesRecord,
    NormalizedEvent, annotate, normalize,
};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            _ => None,
        }
    }
}

/// What the widget currently shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum View {
    Loading,
    Error {
        message: String,
        retryable: bool,
    },
    Empty,
    List {
        rows: Vec<AnnotatedEvent>,
        tooltip: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        forecast_note: Option<String>,
    },
}

#[derive(Debug)]
pub struct UpcomingWidget {
    today: NaiveDate,
    policy: ImpactPolicy,
    profile: LoadState<Vec<NormalizedEvent>>,
    forecast: LoadState<BalanceTable>,
    tooltip: Option<usize>,
    closed: bool,
}

impl UpcomingWidget {
    pub fn new(today: NaiveDate, policy: ImpactPolicy) -> Self {
        Self {
            today,
            policy,
            profile: LoadState::Loading,
            forecast: LoadState::Loading,
            tooltip: None,
            closed: false,
        }
    }

    /// Returns false when the result was dropped because the widget is closed.
    pub fn apply_profile<E: Display>(
        &mut self,
        result: Result<Option<ImportantDatesRecord>, E>,
    ) -> bool {
        if self.closed {
            return false;
        }
        self.profile = match result {
            Ok(record) => LoadState::Loaded(normalize(record.as_ref(), self.today)),
            Err(e) => LoadState::Failed(e.to_string()),
        };
        self.tooltip = None;
        true
    }

    pub fn apply_forecast<E: Display>(
        &mut self,
        result: Result<Vec<DailyClosingBalance>, E>,
    ) -> bool {
        if self.closed {
            return false;
        }
        self.forecast = match result {
            Ok(days) => LoadState::Loaded(BalanceTable::from_entries(&days)),
            Err(e) => LoadState::Failed(e.to_string()),
        };
        true
    }

    /// User asked to retry a failed profile load; the caller re-issues the request.
    pub fn begin_profile_retry(&mut self) -> bool {
        if self.closed || !matches!(self.profile, LoadState::Failed(_)) {
            return false;
        }
        self.profile = LoadState::Loading;
        true
    }

    pub fn profile_failed(&self) -> bool {
        matches!(self.profile, LoadState::Failed(_))
    }

    /// Opening the tooltip that is already open closes it.
    pub fn toggle_tooltip(&mut self, index: usize) {
        let len = self.profile.loaded().map_or(0, Vec::len);
        if index >= len {
            return;
        }
        self.tooltip = if self.tooltip == Some(index) { None } else { Some(index) };
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.tooltip = None;
    }

    pub fn view(&self) -> View {
        let events = match &self.profile {
            LoadState::Loading => return View::Loading,
            LoadState::Failed(message) => {
                return View::Error {
                    message: message.clone(),
                    retryable: !self.closed,
                };
            }
            LoadState::Loaded(events) => events,
        };

        if events.is_empty() {
            return View::Empty;
        }

        let forecast_note = match &self.forecast {
            LoadState::Loaded(t) if t.is_empty() => {
                Some("Forecast has no daily balances".to_string())
            }
            LoadState::Loaded(_) => None,
            LoadState::Loading => Some("Forecast still loading".to_string()),
            LoadState::Failed(e) => Some(format!("Forecast unavailable: {e}")),
        };

        View::List {
            rows: annotate(events, self.today, self.forecast.loaded(), self.policy),
            tooltip: self.tooltip,
            forecast_note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foresight_core::{DatedCost, ImpactVerdict};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn record() -> ImportantDatesRecord {
        ImportantDatesRecord {
            vacation: Some(DatedCost {
                date: Some("2026-11-01".to_string()),
                cost: 800,
            }),
            wedding: Some(DatedCost {
                date: Some("2026-12-05".to_string()),
                cost: 300,
            }),
            ..Default::default()
        }
    }

    fn forecast() -> Vec<DailyClosingBalance> {
        vec![DailyClosingBalance {
            date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            closing_balance: 2000.0,
        }]
    }

    fn widget() -> UpcomingWidget {
        UpcomingWidget::new(today(), ImpactPolicy::default())
    }

    #[test]
    fn starts_loading() {
        assert!(matches!(widget().view(), View::Loading));
    }

    #[test]
    fn list_renders_before_forecast_arrives() {
        let mut w = widget();
        w.apply_profile(Ok::<_, String>(Some(record())));
        let View::List { rows, forecast_note, .. } = w.view() else {
            panic!("expected list");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.impact.verdict == ImpactVerdict::Unknown));
        assert_eq!(forecast_note.as_deref(), Some("Forecast still loading"));

        w.apply_forecast(Ok::<_, String>(forecast()));
        let View::List { rows, forecast_note, .. } = w.view() else {
            panic!("expected list");
        };
        assert_eq!(rows[0].impact.verdict, ImpactVerdict::Covered);
        assert_eq!(rows[1].impact.verdict, ImpactVerdict::Unknown);
        assert!(forecast_note.is_none());
    }

    #[test]
    fn forecast_failure_degrades_to_unknown() {
        let mut w = widget();
        w.apply_forecast(Err::<Vec<DailyClosingBalance>, _>("HTTP 500"));
        w.apply_profile(Ok::<_, String>(Some(record())));
        let View::List { rows, forecast_note, .. } = w.view() else {
            panic!("expected list");
        };
        assert!(rows.iter().all(|r| r.impact.verdict == ImpactVerdict::Unknown));
        assert_eq!(forecast_note.as_deref(), Some("Forecast unavailable: HTTP 500"));
    }

    #[test]
    fn profile_failure_offers_retry() {
        let mut w = widget();
        w.apply_profile(Err::<Option<ImportantDatesRecord>, _>("connection refused"));
        assert!(matches!(w.view(), View::Error { retryable: true, .. }));

        assert!(w.begin_profile_retry());
        assert!(matches!(w.view(), View::Loading));
        assert!(!w.begin_profile_retry());

        w.apply_profile(Ok::<_, String>(None));
        assert!(matches!(w.view(), View::Empty));
    }

    #[test]
    fn tooltip_toggles_and_ignores_out_of_range() {
        let mut w = widget();
        w.toggle_tooltip(0);
        w.apply_profile(Ok::<_, String>(Some(record())));
        w.toggle_tooltip(5);
        w.toggle_tooltip(1);
        assert!(matches!(w.view(), View::List { tooltip: Some(1), .. }));
        w.toggle_tooltip(1);
        assert!(matches!(w.view(), View::List { tooltip: None, .. }));
    }

    #[test]
    fn closed_widget_ignores_late_results() {
        let mut w = widget();
        w.close();
        assert!(!w.apply_profile(Ok::<_, String>(Some(record()))));
        assert!(!w.apply_forecast(Ok::<_, String>(forecast())));
        assert!(matches!(w.view(), View::Loading));
    }

    #[test]
    fn view_serializes_with_status_tag() {
        let mut w = widget();
        w.apply_profile(Ok::<_, String>(None));
        let json = serde_json::to_value(w.view()).unwrap();
        assert_eq!(json["status"], "empty");
    }
}
