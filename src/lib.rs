use std::fmt;

use chrono::{NaiveTime, Timelike};
use scraper::Selector;

pub mod calendar;
pub mod cinema;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod links;
pub mod planner;
pub mod reconcile;
pub mod restaurant;

pub use error::{Error, Result};
pub use fetch::{Fetcher, Page};
pub use planner::{Config, Outcome, Planner, Progress, Stage};
pub use restaurant::Credentials;

/// A movie start time with at least one free seat, as reported by the cinema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Showing {
    pub title: String,
    pub start: NaiveTime,
}

impl Showing {
    /// Build a showing from a cinema time string like `"16:00"`.
    pub fn parse(title: impl Into<String>, time: &str) -> Option<Self> {
        let start = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
        Some(Self {
            title: title.into(),
            start,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }
}

/// A bookable restaurant slot decoded from a code like `fri1820`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSlot {
    /// Three-letter day abbreviation, lowercased.
    pub day_prefix: String,
    pub window: TableWindow,
}

/// Start and end hour of a table booking, displayed as `18-20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl fmt::Display for TableWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.start_hour, self.end_hour)
    }
}

/// One proposed evening: a common day, a showing and a table window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suggestion {
    pub day: String,
    pub title: String,
    pub start: NaiveTime,
    pub window: TableWindow,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "On {}, \"{}\" begins at {}, and there is a free table between {:02}:00-{:02}:00.",
            self.day,
            self.title,
            self.start.format("%H:%M"),
            self.window.start_hour,
            self.window.end_hour
        )
    }
}

/// Compile a CSS selector, reporting a bad query as a parse error.
pub(crate) fn selector(query: &str) -> Result<Selector> {
    Selector::parse(query).map_err(|e| Error::parse_error(format!("selector {query:?}: {e}")))
}

/// Trait that every site scraper implements
#[async_trait::async_trait]
pub trait Scraper {
    type Output;

    /// Fetch and extract this site's data
    async fn scrape(&self, fetcher: &Fetcher) -> Result<Self::Output>;
}
