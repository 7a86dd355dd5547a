use std::fmt;

use log::info;
use url::Url;

use crate::calendar::CalendarScraper;
use crate::cinema::CinemaScraper;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::links::{LinkScraper, SiteLinks};
use crate::reconcile;
use crate::restaurant::{Credentials, RestaurantScraper};
use crate::{Scraper, Suggestion};

/// Everything a run needs to know up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub start_url: Url,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Links,
    AvailableDays,
    Showtimes,
    Reservations,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Links => "Scraping Links",
            Stage::AvailableDays => "Scraping Available Days",
            Stage::Showtimes => "Scraping Showtimes",
            Stage::Reservations => "Scraping Possible Reservations",
        };
        f.write_str(name)
    }
}

/// Receives a notification each time a stage has finished.
pub trait Progress {
    fn stage_done(&mut self, stage: Stage);
}

impl Progress for Vec<Stage> {
    fn stage_done(&mut self, stage: Stage) {
        self.push(stage);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The calendars share no day, so nothing past them was scraped.
    NoCommonDay,
    Suggestions(Vec<Suggestion>),
}

pub struct Planner {
    config: Config,
    fetcher: Fetcher,
}

impl Planner {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            fetcher: Fetcher::new()?,
        })
    }

    pub async fn run(&self, progress: &mut (dyn Progress + Send)) -> Result<Outcome> {
        let links = LinkScraper::new(self.config.start_url.clone())
            .scrape(&self.fetcher)
            .await?;
        let sites = SiteLinks::classify(&links)?;
        progress.stage_done(Stage::Links);

        let days = CalendarScraper::new(sites.calendar).scrape(&self.fetcher).await?;
        progress.stage_done(Stage::AvailableDays);
        if days.is_empty() {
            info!("No common day, stopping early");
            return Ok(Outcome::NoCommonDay);
        }

        let showings = CinemaScraper::new(sites.cinema, days.clone())
            .scrape(&self.fetcher)
            .await?;
        progress.stage_done(Stage::Showtimes);

        let slots = RestaurantScraper::new(sites.restaurant, self.config.credentials.clone())
            .scrape(&self.fetcher)
            .await?;
        progress.stage_done(Stage::Reservations);

        Ok(Outcome::Suggestions(reconcile::suggest(&days, &showings, &slots)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels() {
        let lines: Vec<String> = [
            Stage::Links,
            Stage::AvailableDays,
            Stage::Showtimes,
            Stage::Reservations,
        ]
        .iter()
        .map(|s| format!("{s}...OK"))
        .collect();
        assert_eq!(lines[0], "Scraping Links...OK");
        assert_eq!(lines[3], "Scraping Possible Reservations...OK");
    }

    #[test]
    fn vec_records_progress() {
        let mut seen: Vec<Stage> = Vec::new();
        seen.stage_done(Stage::Links);
        assert_eq!(seen, vec![Stage::Links]);
    }
}
