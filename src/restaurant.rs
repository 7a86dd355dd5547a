use log::{debug, info, warn};
use reqwest::header;
use scraper::Html;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::{Scraper, TableSlot, TableWindow, selector};

/// Login for the restaurant's booking page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "zeke".to_string(),
            password: "coys".to_string(),
        }
    }
}

fn login_url(base: &Url) -> Result<Url> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/login"))?)
}

/// Pull `name=value` out of a `Set-Cookie` header.
fn session_cookie(set_cookie: &str, url: &Url) -> Result<String> {
    let cookie = cookie_store::Cookie::parse(set_cookie, url)
        .map_err(|e| Error::auth_error(format!("unreadable session cookie: {e}")))?;
    Ok(format!("{}={}", cookie.name(), cookie.value()))
}

/// Log in and return the HTML of the page the login redirects to.
pub async fn authorized_page(
    fetcher: &Fetcher,
    base: &Url,
    credentials: &Credentials,
) -> Result<String> {
    let url = login_url(base)?;
    let resp = fetcher.post_json(&url, credentials).await?;

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::auth_error("login response carries no session cookie"))?;
    let cookie = session_cookie(set_cookie, &url)?;

    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::auth_error("login response carries no redirect"))?;
    let target = url.join(location)?;
    debug!("Logged in, following redirect to {target}");

    fetcher.get_with_cookie(&target, &cookie).await
}

impl TableSlot {
    /// Decode `ddd` + start hour + end hour, e.g. `fri1820`.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() != 7 || !code.is_ascii() {
            return None;
        }
        let (day, hours) = code.split_at(3);
        if !day.chars().all(|c| c.is_ascii_alphabetic())
            || !hours.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            day_prefix: day.to_ascii_lowercase(),
            window: TableWindow {
                start_hour: hours[..2].parse().ok()?,
                end_hour: hours[2..].parse().ok()?,
            },
        })
    }
}

/// Every free slot offered on the booking page.
pub fn parse_slots(html: &str) -> Result<Vec<TableSlot>> {
    let document = Html::parse_document(html);
    let input_selector = selector("input[name=\"group1\"]")?;

    Ok(document
        .select(&input_selector)
        .filter_map(|input| input.value().attr("value"))
        .filter_map(|code| {
            let slot = TableSlot::from_code(code);
            if slot.is_none() {
                warn!("Skipping malformed slot code {code:?}");
            }
            slot
        })
        .collect())
}

/// Logs into the restaurant and reads its free table slots.
pub struct RestaurantScraper {
    url: Url,
    credentials: Credentials,
}

impl RestaurantScraper {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self { url, credentials }
    }
}

#[async_trait::async_trait]
impl Scraper for RestaurantScraper {
    type Output = Vec<TableSlot>;

    async fn scrape(&self, fetcher: &Fetcher) -> Result<Vec<TableSlot>> {
        let html = authorized_page(fetcher, &self.url, &self.credentials).await?;
        let slots = parse_slots(&html)?;
        info!("{} free table slots", slots.len());
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_slot_codes() {
        let slot = TableSlot::from_code("fri1820").unwrap();
        assert_eq!(slot.day_prefix, "fri");
        assert_eq!(slot.window.to_string(), "18-20");
        assert_eq!(TableSlot::from_code("SAT1416").unwrap().day_prefix, "sat");
    }

    #[test]
    fn rejects_malformed_codes() {
        for code in ["", "fri18", "fri18200", "f1i1820", "friXX20", "fré1820"] {
            assert!(TableSlot::from_code(code).is_none(), "{code}");
        }
    }

    #[test]
    fn reads_group1_inputs_only() {
        let html = r#"
            <form>
              <input type="radio" name="group1" value="fri1416">
              <input type="radio" name="group1" value="fri1820">
              <input type="radio" name="group1" value="broken">
              <input type="radio" name="group2" value="sat1820">
            </form>"#;
        let windows: Vec<String> = parse_slots(html)
            .unwrap()
            .iter()
            .map(|s| s.window.to_string())
            .collect();
        assert_eq!(windows, vec!["14-16", "18-20"]);
    }

    #[test]
    fn keeps_only_cookie_pair() {
        let url = Url::parse("http://x.test/dinner/login").unwrap();
        let cookie = session_cookie("session=abc123; Path=/; HttpOnly", &url).unwrap();
        assert_eq!(cookie, "session=abc123");
    }

    #[test]
    fn login_url_ignores_trailing_slash() {
        let base = Url::parse("http://x.test/dinner/").unwrap();
        assert_eq!(login_url(&base).unwrap().as_str(), "http://x.test/dinner/login");
    }
}
