//! foresight-core: upcoming important dates, countdowns and forecast impact

pub mod annotate;
pub mod countdown;
pub mod impact;
pub mod important_dates;
pub mod time;

pub use annotate::{AnnotatedEvent, annotate};
pub use countdown::{Countdown, UrgencyTier, classify, classify_days};
pub use impact::{BalanceTable, DailyClosingBalance, Impact, ImpactPolicy, ImpactVerdict, evaluate};
pub use important_dates::{
    CustomEvent, DatedCost, EventCategory, EventSource, ImportantDatesRecord, NamedKind,
    NormalizedEvent, next_annual_occurrence, normalize,
};
pub use time::{DEFAULT_TIMEZONE, days_until, parse_iso_date, today_in_timezone};
