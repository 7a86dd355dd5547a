use std::collections::BTreeSet;

use log::debug;
use scraper::Html;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::{Fetcher, Page};
use crate::{Scraper, selector};

/// Collect every absolute or `./`-relative anchor on the page, resolved
/// against the page's own URL, sorted and without duplicates.
pub fn extract_links(page: &Page) -> Result<Vec<Url>> {
    let document = Html::parse_document(&page.body);
    let anchor_selector = selector("a[href]")?;

    // A <base href> changes what relative links resolve against.
    let base = match document
        .select(&selector("base[href]")?)
        .next()
        .and_then(|b| b.value().attr("href"))
    {
        Some(href) => page.url.join(href.trim())?,
        None => page.url.clone(),
    };

    let mut links = BTreeSet::new();
    for a in document.select(&anchor_selector) {
        let href = match a.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };
        if href.starts_with("http://") || href.starts_with("https://") {
            links.insert(Url::parse(href)?);
        } else if href.starts_with("./") {
            links.insert(base.join(href)?);
        }
    }

    Ok(links.into_iter().collect())
}

/// The three sites linked from the start page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLinks {
    pub calendar: Url,
    pub cinema: Url,
    pub restaurant: Url,
}

impl SiteLinks {
    /// Assign each link a role by the keyword in its path. Falls back to the
    /// sorted order when there are exactly three unrecognisable links.
    pub fn classify(links: &[Url]) -> Result<Self> {
        let find = |keywords: &[&str]| {
            links
                .iter()
                .find(|l| {
                    let path = l.path().to_lowercase();
                    keywords.iter().any(|k| path.contains(k))
                })
                .cloned()
        };

        match (
            find(&["calendar"]),
            find(&["cinema"]),
            find(&["dinner", "restaurant"]),
        ) {
            (Some(calendar), Some(cinema), Some(restaurant)) => Ok(Self {
                calendar,
                cinema,
                restaurant,
            }),
            _ if links.len() == 3 => Ok(Self {
                calendar: links[0].clone(),
                cinema: links[1].clone(),
                restaurant: links[2].clone(),
            }),
            _ => Err(Error::parse_error(format!(
                "expected calendar, cinema and restaurant links, found {}",
                links.len()
            ))),
        }
    }
}

/// Fetches a link index page and extracts its links.
pub struct LinkScraper {
    url: Url,
}

impl LinkScraper {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait::async_trait]
impl Scraper for LinkScraper {
    type Output = Vec<Url>;

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Vec<Url>> {
        let page = fetcher.get_page(&self.url).await?;
        let links = extract_links(&page)?;
        debug!("{} links on {}", links.len(), page.url);
        Ok(links)
    }
}
