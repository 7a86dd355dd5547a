use log::debug;
use reqwest::{Client, Response, header, redirect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Result;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// A fetched HTML document together with the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Thin wrapper over two reqwest clients: one following redirects, one not.
pub struct Fetcher {
    client: Client,
    no_redirect: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        let no_redirect = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            no_redirect,
        })
    }

    /// GET an HTML page. Redirects are followed and the final URL is kept so
    /// relative links can be resolved against it.
    pub async fn get_page(&self, url: &Url) -> Result<Page> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        let url = resp.url().clone();
        let body = resp.text().await?;
        Ok(Page { url, body })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!("GET {url} (json)");
        let resp = self
            .client
            .get(url.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json,text/javascript,*/*;q=0.1")
            .send()
            .await?
            .error_for_status()?;

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body without following redirects; a 3xx answer is returned
    /// to the caller as-is.
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> Result<Response> {
        debug!("POST {url}");
        let resp = self
            .no_redirect
            .post(url.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .json(body)
            .send()
            .await?;

        if resp.status().is_redirection() {
            return Ok(resp);
        }
        Ok(resp.error_for_status()?)
    }

    pub async fn get_with_cookie(&self, url: &Url, cookie: &str) -> Result<String> {
        debug!("GET {url} (with session cookie)");
        let resp = self
            .no_redirect
            .get(url.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, cookie)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.text().await?)
    }
}
