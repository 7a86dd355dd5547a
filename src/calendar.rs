use log::{debug, info};
use scraper::{ElementRef, Html};
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::{Fetcher, Page};
use crate::links::extract_links;
use crate::{Scraper, selector};

fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse one friend's calendar table and return the days marked `ok`,
/// in the order the table lists them.
pub fn parse_ok_days(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let table = document
        .select(&selector("table")?)
        .next()
        .ok_or_else(|| Error::parse_error("calendar page has no table"))?;

    let days: Vec<String> = table.select(&selector("th")?).map(cell_text).collect();
    let statuses: Vec<String> = table.select(&selector("td")?).map(cell_text).collect();

    if days.len() != statuses.len() {
        return Err(Error::parse_error(format!(
            "calendar has {} day headers but {} status cells",
            days.len(),
            statuses.len()
        )));
    }

    Ok(days
        .into_iter()
        .zip(statuses)
        .filter(|(_, status)| status.eq_ignore_ascii_case("ok"))
        .map(|(day, _)| day)
        .collect())
}

/// Days present in every list, in the order of the first one.
pub fn common_days(lists: &[Vec<String>]) -> Vec<String> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter(|day| rest.iter().all(|other| other.contains(*day)))
        .cloned()
        .collect()
}

/// Links on the calendar index that point at friends' pages. Anything off
/// the index's own origin is navigation and is not followed.
pub fn friend_links(index: &Page) -> Result<Vec<Url>> {
    let origin = index.url.origin();
    Ok(extract_links(index)?
        .into_iter()
        .filter(|url| {
            let same = url.origin() == origin;
            if !same {
                debug!("Not following off-site link {url}");
            }
            same
        })
        .collect())
}

/// Follows the calendar index to every friend's page and intersects them.
pub struct CalendarScraper {
    url: Url,
}

impl CalendarScraper {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait::async_trait]
impl Scraper for CalendarScraper {
    type Output = Vec<String>;

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Vec<String>> {
        let index = fetcher.get_page(&self.url).await?;
        let friend_pages = friend_links(&index)?;

        let mut lists = Vec::new();
        for url in friend_pages {
            let page = fetcher.get_page(&url).await?;
            let ok = parse_ok_days(&page.body)
                .map_err(|e| Error::parse_error(format!("{url}: {e}")))?;
            debug!("{url}: ok on {ok:?}");
            lists.push(ok);
        }

        let days = common_days(&lists);
        info!("common days across {} calendars: {days:?}", lists.len());
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn picks_ok_days_case_insensitively() {
        let html = r#"
            <h2>Paul</h2>
            <table>
              <thead><tr><th>Friday</th><th>Saturday</th><th>Sunday</th></tr></thead>
              <tbody><tr><td>ok</td><td>--</td><td> OK </td></tr></tbody>
            </table>"#;
        assert_eq!(parse_ok_days(html).unwrap(), days(&["Friday", "Sunday"]));
    }

    #[test]
    fn mismatched_columns_fail_loudly() {
        let html = r#"
            <table>
              <tr><th>Friday</th><th>Saturday</th></tr>
              <tr><td>ok</td></tr>
            </table>"#;
        assert!(matches!(parse_ok_days(html), Err(Error::Parse(_))));
    }

    #[test]
    fn missing_table_is_a_parse_error() {
        assert!(matches!(parse_ok_days("<p>closed</p>"), Err(Error::Parse(_))));
    }

    #[test]
    fn friend_links_stay_on_the_calendar_site() {
        let index = Page {
            url: Url::parse("http://x.test/calendar/").unwrap(),
            body: r#"
                <ul>
                  <li><a href="./paul.html">Paul</a></li>
                  <li><a href="http://x.test/calendar/peter.html">Peter</a></li>
                </ul>
                <footer><a href="https://elsewhere.test/about">About</a></footer>"#
                .to_string(),
        };
        let links: Vec<String> = friend_links(&index)
            .unwrap()
            .iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            links,
            vec![
                "http://x.test/calendar/paul.html",
                "http://x.test/calendar/peter.html"
            ]
        );
    }

    #[test]
    fn common_days_is_the_intersection() {
        let lists = vec![
            days(&["Friday", "Saturday", "Sunday"]),
            days(&["Saturday", "Friday"]),
            days(&["Friday", "Sunday", "Saturday"]),
        ];
        assert_eq!(common_days(&lists), days(&["Friday", "Saturday"]));
    }

    #[test]
    fn any_empty_list_empties_the_result() {
        let lists = vec![days(&["Friday"]), days(&[]), days(&["Friday"])];
        assert!(common_days(&lists).is_empty());
        assert!(common_days(&[]).is_empty());
    }

    #[test]
    fn disjoint_lists_share_nothing() {
        let lists = vec![days(&["Friday"]), days(&["Saturday"])];
        assert!(common_days(&lists).is_empty());
    }
}
