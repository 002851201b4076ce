use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const BROWSER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Result of fetching one page. Timeouts, connection errors and non-2xx
/// statuses all collapse into `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Page(String),
    Unavailable,
}

impl Fetched {
    pub fn into_page(self) -> Option<String> {
        match self {
            Fetched::Page(body) => Some(body),
            Fetched::Unavailable => None,
        }
    }
}

/// Anything that can hand out HTML pages by URL.
pub trait PageSource {
    fn get(&self, url: &str) -> Fetched;
}

/// Live pages over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpSource;

impl PageSource for HttpSource {
    fn get(&self, url: &str) -> Fetched {
        match fetch_text(url) {
            Ok(body) => {
                debug!(url, bytes = body.len(), "fetched");
                Fetched::Page(body)
            }
            Err(err) => {
                warn!(url, "request failed: {err:#}");
                Fetched::Unavailable
            }
        }
    }
}

fn fetch_text(url: &str) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .header(USER_AGENT, BROWSER_AGENT)
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}"));
    }
    Ok(body)
}
