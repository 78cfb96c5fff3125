//! Plain-text rendering of the widget view.

use foresight_core::{AnnotatedEvent, ImpactVerdict};

use crate::widget::View;

/// `prompt_follows` is set when the caller will ask to retry right after.
pub fn render(view: &View, prompt_follows: bool) -> String {
    match view {
        View::Loading => "Loading upcoming dates…\n".to_string(),
        View::Error { message, retryable } => {
            let mut out = format!("Couldn't load your important dates: {message}\n");
            if *retryable && !prompt_follows {
                out.push_str("Run the command again to retry.\n");
            }
            out
        }
        View::Empty => {
            "No upcoming dates. Add birthdays, trips or custom events to your profile.\n"
                .to_string()
        }
        View::List {
            rows,
            tooltip,
            forecast_note,
        } => {
            let mut out = String::from("Upcoming dates\n\n");
            for (i, row) in rows.iter().enumerate() {
                out.push_str(&render_row(i, row));
                out.push('\n');
                if *tooltip == Some(i) {
                    out.push_str(&render_tooltip(row));
                    out.push('\n');
                }
            }
            if let Some(note) = forecast_note {
                out.push_str(&format!("\n({note})\n"));
            }
            out
        }
    }
}

fn render_row(index: usize, row: &AnnotatedEvent) -> String {
    let cost = if row.event.cost > 0 {
        format_money(row.event.cost as f64)
    } else {
        String::new()
    };
    let marker = row.impact.verdict.icon().unwrap_or(" ");
    format!(
        "{:>2}. {} {:<22} {}  {:>10} {:<9} {:>10} {}",
        index,
        row.event.category.icon(),
        row.event.name,
        row.event.date.format("%a %b %e"),
        row.countdown.label,
        row.countdown.tier.as_str(),
        cost,
        marker,
    )
}

fn render_tooltip(row: &AnnotatedEvent) -> String {
    let impact = &row.impact;
    match (impact.verdict, impact.closing_balance, impact.remaining) {
        (ImpactVerdict::Unknown, _, _) if row.event.cost == 0 => {
            "     No cost recorded for this date.".to_string()
        }
        (ImpactVerdict::Unknown, _, _) => {
            "     No forecast balance for this date.".to_string()
        }
        (verdict, Some(balance), Some(remaining)) => format!(
            "     {}. Projected balance {} on {}, {} after this expense.",
            verdict.description(),
            format_money(balance),
            row.event.date.format("%Y-%m-%d"),
            format_money(remaining),
        ),
        (verdict, _, _) => format!("     {}.", verdict.description()),
    }
}

/// `$1,234.50`, `-$75.00`
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use foresight_core::{
        BalanceTable, DailyClosingBalance, EventCategory, ImpactPolicy, NormalizedEvent, annotate,
    };

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(999.5), "$999.50");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_money(-75.0), "-$75.00");
    }

    #[test]
    fn list_with_open_tooltip() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let events = vec![NormalizedEvent {
            name: "Vacation".to_string(),
            date,
            cost: 1500,
            category: EventCategory::Vacation,
        }];
        let table = BalanceTable::from_entries(&[DailyClosingBalance {
            date,
            closing_balance: 1700.0,
        }]);
        let rows = annotate(&events, today, Some(&table), ImpactPolicy::default());
        let text = render(
            &View::List {
                rows,
                tooltip: Some(0),
                forecast_note: None,
            },
            false,
        );
        assert!(text.contains("Vacation"));
        assert!(text.contains("Today"));
        assert!(text.contains("$1,500.00"));
        assert!(text.contains(
            "Projected balance $1,700.00 on 2026-10-19, $200.00 after this expense."
        ));
    }

    fn failed_view() -> View {
        View::Error {
            message: "HTTP 503".to_string(),
            retryable: true,
        }
    }

    #[test]
    fn error_view_mentions_rerun_without_prompt() {
        let text = render(&failed_view(), false);
        assert!(text.contains("HTTP 503"));
        assert!(text.contains("Run the command again to retry."));
    }

    #[test]
    fn error_view_leaves_retry_to_the_prompt() {
        let text = render(&failed_view(), true);
        assert!(text.contains("HTTP 503"));
        assert!(!text.contains("Run the command again"));
    }
}
