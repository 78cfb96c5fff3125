//! Important-dates record and the Event Normalizer.
//!
//! A profile stores a sparse record: a recurring birthday, a handful of named
//! one-off dates that each carry a cost, and an open list of custom events.
//! [`ImportantDatesRecord::sources`] flattens it into [`EventSource`] variants and
//! [`normalize`] resolves every variant into the same [`NormalizedEvent`] shape.

use chrono::{Datelike, NaiveDate};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::time::parse_iso_date;

/// A dated expense as stored on the profile (`{date, cost}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedCost {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_cost")]
    pub cost: u64,
}

/// A user-defined event (`{name, date, cost}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEvent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_cost")]
    pub cost: u64,
}

/// The `important_dates` object of a user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantDatesRecord {
    /// Recurs every year on the same month/day.
    #[serde(default, deserialize_with = "lenient_text")]
    pub birthday: Option<String>,
    #[serde(default, deserialize_with = "lenient_dated")]
    pub vacation: Option<DatedCost>,
    #[serde(default, deserialize_with = "lenient_dated")]
    pub car_inspection: Option<DatedCost>,
    #[serde(default, deserialize_with = "lenient_dated")]
    pub wedding: Option<DatedCost>,
    #[serde(default, deserialize_with = "lenient_dated")]
    pub insurance_renewal: Option<DatedCost>,
    /// Malformed entries are skipped; a non-list value counts as empty.
    #[serde(default, alias = "customEvents", deserialize_with = "lenient_custom_events")]
    pub custom_events: Vec<CustomEvent>,
}

/// Fixed single-occurrence fields of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedKind {
    Vacation,
    CarInspection,
    Wedding,
    InsuranceRenewal,
}

impl NamedKind {
    pub const ALL: [NamedKind; 4] = [
        NamedKind::Vacation,
        NamedKind::CarInspection,
        NamedKind::Wedding,
        NamedKind::InsuranceRenewal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NamedKind::Vacation => "Vacation",
            NamedKind::CarInspection => "Car inspection",
            NamedKind::Wedding => "Wedding",
            NamedKind::InsuranceRenewal => "Insurance renewal",
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            NamedKind::Vacation => EventCategory::Vacation,
            NamedKind::CarInspection => EventCategory::CarInspection,
            NamedKind::Wedding => EventCategory::Wedding,
            NamedKind::InsuranceRenewal => EventCategory::InsuranceRenewal,
        }
    }
}

/// Category tag used for icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Birthday,
    Vacation,
    CarInspection,
    Wedding,
    InsuranceRenewal,
    Custom,
}

impl EventCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            EventCategory::Birthday => "🎂",
            EventCategory::Vacation => "✈️",
            EventCategory::CarInspection => "🚗",
            EventCategory::Wedding => "💍",
            EventCategory::InsuranceRenewal => "🛡️",
            EventCategory::Custom => "📅",
        }
    }
}

/// One event-bearing entry of a record, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// Month/day taken from the stored date; the year is ignored.
    Birthday(NaiveDate),
    Named(NamedKind, NaiveDate, u64),
    Custom { name: String, date: NaiveDate, cost: u64 },
}

/// An event resolved against "today", ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub name: String,
    pub date: NaiveDate,
    pub cost: u64,
    pub category: EventCategory,
}

impl ImportantDatesRecord {
    pub fn named(&self, kind: NamedKind) -> Option<&DatedCost> {
        match kind {
            NamedKind::Vacation => self.vacation.as_ref(),
            NamedKind::CarInspection => self.car_inspection.as_ref(),
            NamedKind::Wedding => self.wedding.as_ref(),
            NamedKind::InsuranceRenewal => self.insurance_renewal.as_ref(),
        }
    }

    /// Flatten the record into sources. Entries whose date is missing or does
    /// not parse are dropped.
    pub fn sources(&self) -> Vec<EventSource> {
        let mut out = Vec::new();

        if let Some(d) = self.birthday.as_deref().and_then(parse_iso_date) {
            out.push(EventSource::Birthday(d));
        }

        for kind in NamedKind::ALL {
            let Some(entry) = self.named(kind) else {
                continue;
            };
            if let Some(d) = entry.date.as_deref().and_then(parse_iso_date) {
                out.push(EventSource::Named(kind, d, entry.cost));
            }
        }

        for ev in &self.custom_events {
            if let Some(d) = ev.date.as_deref().and_then(parse_iso_date) {
                out.push(EventSource::Custom {
                    name: ev.name.clone(),
                    date: d,
                    cost: ev.cost,
                });
            }
        }

        out
    }
}

impl EventSource {
    /// Resolve against `today`. Returns `None` for one-off dates in the past.
    pub fn resolve(&self, today: NaiveDate) -> Option<NormalizedEvent> {
        match self {
            EventSource::Birthday(stored) => Some(NormalizedEvent {
                name: "Birthday".to_string(),
                date: next_annual_occurrence(*stored, today),
                cost: 0,
                category: EventCategory::Birthday,
            }),
            EventSource::Named(kind, date, cost) => (*date >= today).then(|| NormalizedEvent {
                name: kind.label().to_string(),
                date: *date,
                cost: *cost,
                category: kind.category(),
            }),
            EventSource::Custom { name, date, cost } => (*date >= today).then(|| NormalizedEvent {
                name: display_name(name),
                date: *date,
                cost: *cost,
                category: EventCategory::Custom,
            }),
        }
    }
}

/// Build the sorted list of upcoming events. A missing record yields no events.
pub fn normalize(record: Option<&ImportantDatesRecord>, today: NaiveDate) -> Vec<NormalizedEvent> {
    let Some(record) = record else {
        return vec![];
    };

    let mut events: Vec<NormalizedEvent> = record
        .sources()
        .iter()
        .filter_map(|s| s.resolve(today))
        .collect();

    // Stable: same-day events keep record order.
    events.sort_by_key(|e| e.date);
    events
}

/// Next date on or after `today` that falls on the month/day of `stored`.
///
/// Feb 29 falls on Mar 1 in non-leap years.
pub fn next_annual_occurrence(stored: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = on_month_day(today.year(), stored.month(), stored.day());
    if this_year >= today {
        this_year
    } else {
        on_month_day(today.year() + 1, stored.month(), stored.day())
    }
}

fn on_month_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(NaiveDate::MIN)
}

fn display_name(raw: &str) -> String {
    let raw = raw.trim();
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Custom event".to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCost {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

/// Costs arrive as integers, floats, numeric strings or null. Anything that is
/// not a non-negative number counts as zero.
fn lenient_cost<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawCost> = Option::deserialize(deserializer)?;
    let cost = match raw {
        Some(RawCost::Whole(n)) => n,
        Some(RawCost::Fractional(f)) if f.is_finite() && f > 0.0 => f.round() as u64,
        Some(RawCost::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map_or(0, |f| f.round() as u64),
        _ => 0,
    };
    Ok(cost)
}

/// A field that holds the wrong shape of value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Lenient::Valid(v) => Some(v),
            Lenient::Invalid(_) => None,
        }
    }
}

/// A named field given as anything but `{date, cost}` is treated as absent,
/// so one bad field does not discard the rest of the record.
fn lenient_dated<'de, D>(deserializer: D) -> Result<Option<DatedCost>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Lenient<DatedCost>> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(Lenient::into_option))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Lenient<String>> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(Lenient::into_option))
}

fn lenient_custom_events<'de, D>(deserializer: D) -> Result<Vec<CustomEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Lenient<Vec<Lenient<CustomEvent>>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(Lenient::into_option)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Lenient::into_option)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dated(date: &str, cost: u64) -> Option<DatedCost> {
        Some(DatedCost {
            date: Some(date.to_string()),
            cost,
        })
    }

    #[test]
    fn missing_record_is_empty() {
        assert!(normalize(None, d(2026, 10, 19)).is_empty());
    }

    #[test]
    fn birthday_rolls_to_next_year_once_passed() {
        let record = ImportantDatesRecord {
            birthday: Some("1991-03-14".to_string()),
            ..Default::default()
        };
        let out = normalize(Some(&record), d(2026, 10, 19));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, d(2027, 3, 14));
        assert_eq!(out[0].cost, 0);
        assert_eq!(out[0].category, EventCategory::Birthday);
    }

    #[test]
    fn birthday_today_stays_today() {
        let record = ImportantDatesRecord {
            birthday: Some("1991-10-19".to_string()),
            ..Default::default()
        };
        let out = normalize(Some(&record), d(2026, 10, 19));
        assert_eq!(out[0].date, d(2026, 10, 19));
    }

    #[test]
    fn leap_day_birthday_in_common_year() {
        assert_eq!(next_annual_occurrence(d(2000, 2, 29), d(2026, 1, 10)), d(2026, 3, 1));
        assert_eq!(next_annual_occurrence(d(2000, 2, 29), d(2027, 6, 1)), d(2028, 2, 29));
    }

    #[test]
    fn past_one_off_dates_are_dropped() {
        let record = ImportantDatesRecord {
            vacation: dated("2026-10-18", 1500),
            wedding: dated("2026-10-19", 300),
            car_inspection: dated("2027-01-05", 80),
            ..Default::default()
        };
        let out = normalize(Some(&record), d(2026, 10, 19));
        let names: Vec<&str> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Wedding", "Car inspection"]);
        assert_eq!(out[0].cost, 300);
    }

    #[test]
    fn custom_names_are_capitalized_and_sorted() {
        let record = ImportantDatesRecord {
            insurance_renewal: dated("2026-12-01", 900),
            custom_events: vec![
                CustomEvent {
                    name: "dentist".to_string(),
                    date: Some("2026-11-02".to_string()),
                    cost: 120,
                },
                CustomEvent {
                    name: "  ".to_string(),
                    date: Some("2026-10-25".to_string()),
                    cost: 0,
                },
                CustomEvent {
                    name: "concert".to_string(),
                    date: Some("2025-01-01".to_string()),
                    cost: 60,
                },
            ],
            ..Default::default()
        };
        let out = normalize(Some(&record), d(2026, 10, 19));
        let names: Vec<&str> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Custom event", "Dentist", "Insurance renewal"]);
    }

    #[test]
    fn unparseable_dates_are_treated_as_absent() {
        let record = ImportantDatesRecord {
            birthday: Some("someday".to_string()),
            vacation: Some(DatedCost { date: None, cost: 50 }),
            ..Default::default()
        };
        assert!(record.sources().is_empty());
    }

    #[test]
    fn deserializes_loose_profile_shapes() {
        let json = r#"{
            "birthday": "1988-07-04T00:00:00Z",
            "vacation": {"date": "2026-12-20", "cost": 2400.4},
            "wedding": {"date": "2027-05-01", "cost": "1800"},
            "car_inspection": null,
            "customEvents": [{"name": "gym renewal", "date": "2026-11-30", "cost": null}]
        }"#;
        let record: ImportantDatesRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.vacation.as_ref().unwrap().cost, 2400);
        assert_eq!(record.wedding.as_ref().unwrap().cost, 1800);
        assert!(record.car_inspection.is_none());
        assert_eq!(record.custom_events.len(), 1);
        assert_eq!(record.custom_events[0].cost, 0);

        let null_list: ImportantDatesRecord =
            serde_json::from_str(r#"{"custom_events": null}"#).unwrap();
        assert!(null_list.custom_events.is_empty());
    }

    #[test]
    fn one_malformed_field_keeps_the_rest_of_the_record() {
        let json = r#"{
            "birthday": "1990-04-02",
            "vacation": "2026-12-01",
            "wedding": 17,
            "car_inspection": {"date": "2026-11-10", "cost": 60},
            "custom_events": [
                {"name": "recital", "date": "2026-11-20", "cost": 40},
                "not an event",
                {"name": "bake sale", "date": "2026-12-02"}
            ]
        }"#;
        let record: ImportantDatesRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.birthday.as_deref(), Some("1990-04-02"));
        assert!(record.vacation.is_none());
        assert!(record.wedding.is_none());
        assert_eq!(record.car_inspection.as_ref().unwrap().cost, 60);
        assert_eq!(record.custom_events.len(), 2);

        let out = normalize(Some(&record), d(2026, 10, 19));
        let names: Vec<&str> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Car inspection", "Recital", "Bake sale", "Birthday"]);
    }

    #[test]
    fn wrong_types_for_birthday_and_custom_list_are_absent() {
        let json = r#"{"birthday": 19900402, "customEvents": {"name": "x"}}"#;
        let record: ImportantDatesRecord = serde_json::from_str(json).unwrap();
        assert!(record.birthday.is_none());
        assert!(record.custom_events.is_empty());
    }
}
