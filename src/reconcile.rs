//! Joining common days, showings and table slots into suggestions.
//!
//! A table qualifies for a showing when it starts exactly two hours after
//! the movie does.

use std::collections::HashSet;

use crate::{Showing, Suggestion, TableSlot, TableWindow};

/// Hours between a movie starting and the table booking starting.
pub const DINNER_DELAY_HOURS: u32 = 2;

/// Keep the slots whose day abbreviation starts one of the given day names.
pub fn slots_on_days<'a>(slots: &'a [TableSlot], days: &[String]) -> Vec<&'a TableSlot> {
    slots
        .iter()
        .filter(|slot| {
            days.iter()
                .any(|day| day.to_ascii_lowercase().starts_with(&slot.day_prefix))
        })
        .collect()
}

/// For every showing, the windows of matching-day slots starting two hours
/// after it. Concatenated in showing order, duplicates kept.
pub fn reservation_windows(
    slots: &[TableSlot],
    showings: &[Showing],
    days: &[String],
) -> Vec<TableWindow> {
    let on_days = slots_on_days(slots, days);
    showings
        .iter()
        .flat_map(|showing| {
            let target = showing.start_hour() + DINNER_DELAY_HOURS;
            on_days
                .iter()
                .filter(move |slot| slot.window.start_hour == target)
                .map(|slot| slot.window)
        })
        .collect()
}

/// Cross days, showings and windows into deduplicated suggestions.
///
/// A window starting in the same hour as the showing is never paired with it.
pub fn assemble(days: &[String], showings: &[Showing], windows: &[TableWindow]) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for day in days {
        for showing in showings {
            for window in windows {
                if window.start_hour == showing.start_hour() {
                    continue;
                }
                let suggestion = Suggestion {
                    day: day.clone(),
                    title: showing.title.clone(),
                    start: showing.start,
                    window: *window,
                };
                if seen.insert(suggestion.clone()) {
                    out.push(suggestion);
                }
            }
        }
    }

    out
}

/// Reconcile everything scraped into the final suggestion list.
pub fn suggest(days: &[String], showings: &[Showing], slots: &[TableSlot]) -> Vec<Suggestion> {
    let windows = reservation_windows(slots, showings, days);
    assemble(days, showings, &windows)
}
