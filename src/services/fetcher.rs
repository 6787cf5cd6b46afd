// src/services/fetcher.rs

//! Page fetching.
//!
//! The monitor only sees the [`PageFetcher`] trait. [`HttpFetcher`] is the
//! default implementation: a `reqwest` client that follows numbered listing
//! pages in place of a browser's scroll-to-load.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;
use crate::utils::with_query_param;

/// Source of rendered listing HTML.
///
/// The monitor owns its fetcher for the whole run and calls [`close`] exactly
/// once when the loop exits.
///
/// [`close`]: PageFetcher::close
#[async_trait]
pub trait PageFetcher: Send {
    /// Fetch the fully loaded page at `url`.
    ///
    /// Return [`AppError::Resource`] only when the fetcher can never succeed
    /// again; every other error skips a single cycle.
    async fn fetch(&mut self, url: &str) -> Result<String>;

    /// Release the underlying resource.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: Option<Client>,
    max_pages: usize,
    page_param: String,
}

impl HttpFetcher {
    /// Build the HTTP client.
    ///
    /// Failure here is a [`AppError::Resource`] error: without a client the
    /// monitor cannot run.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| AppError::resource(format!("invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
            log::info!("Using proxy for all requests");
        }

        let client = builder
            .build()
            .map_err(|e| AppError::resource(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Some(client),
            max_pages: config.max_pages.max(1),
            page_param: config.page_param.clone(),
        })
    }

    async fn fetch_one(client: &Client, url: &Url) -> Result<PageResponse> {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::fetch(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(PageResponse::Status(status));
        }

        response
            .text()
            .await
            .map(PageResponse::Body)
            .map_err(|e| AppError::fetch(url.as_str(), e))
    }
}

/// Outcome of one page request that reached the server.
enum PageResponse {
    Body(String),
    Status(StatusCode),
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &str) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AppError::resource("HTTP fetcher is closed"))?;
        let base = Url::parse(url)?;

        let first = match Self::fetch_one(client, &base).await? {
            PageResponse::Body(body) => body,
            PageResponse::Status(status) => {
                return Err(AppError::fetch(url, format!("HTTP {status}")));
            }
        };
        let mut pages = vec![first];

        // Later pages end at the first missing, empty or repeated page.
        for page in 2..=self.max_pages {
            let page_url = with_query_param(&base, &self.page_param, &page.to_string());
            let body = match Self::fetch_one(client, &page_url).await? {
                PageResponse::Body(body) => body,
                PageResponse::Status(status) => {
                    log::debug!("Pagination ended at page {}: HTTP {}", page - 1, status);
                    break;
                }
            };
            if body.trim().is_empty() || pages.last() == Some(&body) {
                log::debug!("Pagination ended at page {}", page - 1);
                break;
            }
            pages.push(body);
        }

        Ok(pages.join("\n"))
    }

    async fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            log::debug!("HTTP fetcher closed");
        }
        Ok(())
    }
}
