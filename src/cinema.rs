use log::{debug, info, warn};
use scraper::Html;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::{Scraper, Showing, selector};

/// One `<option>` of the cinema's select lists, keyed by its numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CinemaOption {
    pub id: u32,
    pub label: String,
}

/// The movie and day choices offered by the cinema page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CinemaOptions {
    pub movies: Vec<CinemaOption>,
    pub days: Vec<CinemaOption>,
}

impl CinemaOptions {
    /// Read both select lists. Options without a numeric value are
    /// placeholders and are left out; movies come back in ascending id order.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);

        let options = |name: &str| -> Result<Vec<CinemaOption>> {
            let select = document
                .select(&selector(&format!("select[name=\"{name}\"]"))?)
                .next()
                .ok_or_else(|| Error::parse_error(format!("cinema page has no {name} select")))?;

            Ok(select
                .select(&selector("option")?)
                .filter_map(|opt| {
                    let id = opt.value().attr("value")?.trim().parse::<u32>().ok()?;
                    let label = opt.text().collect::<String>().trim().to_string();
                    Some(CinemaOption { id, label })
                })
                .collect())
        };

        let mut movies = options("movie")?;
        movies.sort_by_key(|m| m.id);
        let days = options("day")?;

        Ok(Self { movies, days })
    }

    pub fn day_id(&self, day: &str) -> Option<u32> {
        self.days
            .iter()
            .find(|d| d.label.eq_ignore_ascii_case(day.trim()))
            .map(|d| d.id)
    }
}

/// One entry of the `check` endpoint's answer.
#[derive(Debug, Deserialize)]
pub struct Screening {
    pub status: i64,
    pub time: String,
}

/// Pair the bookable screenings of one movie with its title.
pub fn available_showings(title: &str, screenings: &[Screening]) -> Vec<Showing> {
    screenings
        .iter()
        .filter(|s| s.status != 0)
        .filter_map(|s| {
            let showing = Showing::parse(title, &s.time);
            if showing.is_none() {
                warn!("Skipping {title:?}: unreadable start time {:?}", s.time);
            }
            showing
        })
        .collect()
}

pub fn check_url(base: &Url, day: u32, movie: u32) -> Result<Url> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/check?day={day:02}&movie={movie:02}"))?)
}

/// Collects the showings with free seats for each common day.
pub struct CinemaScraper {
    url: Url,
    days: Vec<String>,
}

impl CinemaScraper {
    pub fn new(url: Url, days: Vec<String>) -> Self {
        Self { url, days }
    }

    async fn showings_for_day(
        &self,
        fetcher: &Fetcher,
        options: &CinemaOptions,
        day: &str,
    ) -> Result<Vec<Showing>> {
        let Some(day_id) = options.day_id(day) else {
            warn!("Cinema offers no {day:?} option");
            return Ok(Vec::new());
        };

        let mut showings = Vec::new();
        for movie in &options.movies {
            let url = check_url(&self.url, day_id, movie.id)?;
            let screenings: Vec<Screening> = match fetcher.get_json(&url).await {
                Ok(s) => s,
                Err(e) => {
                    warn!("Skipping {:?} on {day}: {e}", movie.label);
                    continue;
                }
            };
            showings.extend(available_showings(&movie.label, &screenings));
        }
        debug!("{day}: {} showings", showings.len());
        Ok(showings)
    }
}

#[async_trait::async_trait]
impl Scraper for CinemaScraper {
    type Output = Vec<Showing>;

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Vec<Showing>> {
        let page = match fetcher.get_page(&self.url).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Cinema page unreachable: {e}");
                return Ok(Vec::new());
            }
        };
        let options = match CinemaOptions::parse(&page.body) {
            Ok(o) => o,
            Err(e) => {
                warn!("Cinema page unusable: {e}");
                return Ok(Vec::new());
            }
        };

        let mut showings = Vec::new();
        for day in &self.days {
            showings.extend(self.showings_for_day(fetcher, &options, day).await?);
        }
        info!("{} showings across {} days", showings.len(), self.days.len());
        Ok(showings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CINEMA_PAGE: &str = r#"
        <form>
          <select name="day" id="day">
            <option value="" selected disabled>--- Pick a day ---</option>
            <option value="05">Friday</option>
            <option value="06">Saturday</option>
            <option value="07">Sunday</option>
          </select>
          <select name="movie" id="movie">
            <option value="" selected disabled>--- Pick a movie ---</option>
            <option value="03">Keep Your Seats, Please</option>
            <option value="01">The Flying Deuces</option>
            <option value="02">A Day at the Races</option>
          </select>
        </form>"#;

    #[test]
    fn parses_options_by_value_not_position() {
        let options = CinemaOptions::parse(CINEMA_PAGE).unwrap();
        let ids: Vec<u32> = options.movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(options.movies[2].label, "Keep Your Seats, Please");
        assert_eq!(options.day_id("friday"), Some(5));
        assert_eq!(options.day_id("Monday"), None);
    }

    #[test]
    fn missing_select_is_a_parse_error() {
        let html = r#"<select name="day"><option value="05">Friday</option></select>"#;
        assert!(matches!(CinemaOptions::parse(html), Err(Error::Parse(_))));
    }

    #[test]
    fn drops_fully_booked_screenings() {
        let screenings: Vec<Screening> = serde_json::from_str(
            r#"[{"status":0,"day":"05","time":"10:00","movie":"01"},
                {"status":1,"day":"05","time":"16:00","movie":"01"}]"#,
        )
        .unwrap();
        let showings = available_showings("The Flying Deuces", &screenings);
        assert_eq!(showings, vec![Showing::parse("The Flying Deuces", "16:00").unwrap()]);
    }

    #[test]
    fn check_url_pads_ids() {
        let base = Url::parse("http://x.test/cinema/").unwrap();
        assert_eq!(
            check_url(&base, 5, 1).unwrap().as_str(),
            "http://x.test/cinema/check?day=05&movie=01"
        );
    }
}
