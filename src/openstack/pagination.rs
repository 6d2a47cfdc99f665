//! Linked-page iteration
//!
//! OpenStack list APIs return bounded pages; each page body may carry a
//! `<resource>_links` array whose `rel = "next"` entry points at the following page.
//! [`Pager`] walks those links lazily: a page is only requested once the previous
//! one has been handed out. The walk is finite and cannot be restarted.

use crate::error::{ExporterError, Result};
use crate::openstack::client::ServiceClient;
use std::collections::HashSet;
use tracing::debug;

/// One raw page of a list response
#[derive(Debug, Clone)]
pub struct Page {
    url: String,
    body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// URL of the following page, if the body advertises one
    ///
    /// Bodies that are not JSON have no next link; decoding them is reported
    /// separately by the caller.
    pub fn next_link(&self, links_key: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value
            .get(links_key)?
            .as_array()?
            .iter()
            .find(|link| link.get("rel").and_then(|rel| rel.as_str()) == Some("next"))
            .and_then(|link| link.get("href"))
            .and_then(|href| href.as_str())
            .filter(|href| !href.is_empty())
            .map(str::to_string)
    }
}

/// Lazy sequence of pages for one list request
pub struct Pager<'a> {
    client: &'a ServiceClient,
    links_key: &'static str,
    first: Option<Page>,
    next_url: Option<String>,
    visited: HashSet<String>,
    index: usize,
}

impl<'a> Pager<'a> {
    pub(crate) fn new(client: &'a ServiceClient, first: Page, links_key: &'static str) -> Self {
        let mut visited = HashSet::new();
        visited.insert(first.url.clone());
        Self {
            client,
            links_key,
            first: Some(first),
            next_url: None,
            visited,
            index: 0,
        }
    }

    /// Yield the next page, fetching it if needed
    ///
    /// Returns `None` once the last page was handed out or after an error.
    /// Fetch failures after the first page are [`ExporterError::PageIteration`].
    pub async fn next_page(&mut self) -> Option<Result<Page>> {
        let page = match self.first.take() {
            Some(page) => page,
            None => {
                let url = self.next_url.take()?;
                if !self.visited.insert(url.clone()) {
                    return Some(Err(ExporterError::PageIteration(format!(
                        "next link of page {} points back to already visited {}",
                        self.index, url
                    ))));
                }

                debug!("Fetching page {} from {}", self.index + 1, url);
                match self.client.get(&url).await {
                    Ok(body) => Page::new(url, body),
                    Err(e) => {
                        return Some(Err(ExporterError::PageIteration(format!(
                            "failed to fetch page {} ({}): {}",
                            self.index + 1,
                            url,
                            e
                        ))))
                    }
                }
            }
        };

        self.index += 1;
        self.next_url = page.next_link(self.links_key);
        Some(Ok(page))
    }
}
