// src/services/extractor.rs

//! Product extraction from listing HTML.

use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ExtractorConfig, ProductRecord, Snapshot};
use crate::utils::{normalize_whitespace, resolve_url};

/// Turns raw listing HTML into a [`Snapshot`].
pub trait ProductExtractor: Send + Sync {
    /// Extract every product on the page.
    ///
    /// Blocks that cannot be parsed are skipped. A page with no product
    /// blocks at all is an [`AppError::EmptyPage`].
    fn extract(&self, html: &str) -> Result<Snapshot>;
}

/// Selector-driven extractor for catalog listing pages.
#[derive(Debug)]
pub struct ListingExtractor {
    base_url: Url,
    block: Selector,
    link: Selector,
    title: Selector,
    image: Selector,
    alt: Selector,
    in_stock: Selector,
    out_of_stock: Option<Regex>,
}

impl ListingExtractor {
    /// Compile the configured selectors. Links resolve against `base_url`.
    pub fn new(config: &ExtractorConfig, base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            block: Self::parse_selector(&config.block_selector)?,
            link: Self::parse_selector(&config.link_selector)?,
            title: Self::parse_selector(&config.title_selector)?,
            image: Self::parse_selector(&config.image_selector)?,
            alt: Self::parse_selector(&config.alt_selector)?,
            in_stock: Self::parse_selector(&config.in_stock_selector)?,
            out_of_stock: Self::build_phrase_matcher(&config.out_of_stock_phrases)?,
        })
    }

    fn parse_block(&self, block: &ElementRef) -> Option<ProductRecord> {
        let link_elem = block.select(&self.link).next()?;
        let href = link_elem.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let link = resolve_url(&self.base_url, href);

        // A title attribute, even an empty one, takes precedence over the
        // link text; alt text only fills in an empty name.
        let name = match block
            .select(&self.title)
            .next()
            .and_then(|e| e.value().attr("title"))
        {
            Some(title) => normalize_whitespace(title),
            None => normalize_whitespace(&link_elem.text().collect::<String>()),
        };
        let name = if name.is_empty() {
            block
                .select(&self.alt)
                .next()
                .and_then(|e| e.value().attr("alt"))
                .map(normalize_whitespace)
                .unwrap_or_default()
        } else {
            name
        };

        let image = block
            .select(&self.image)
            .next()
            .and_then(|e| e.value().attr("src"))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Some(ProductRecord {
            name,
            link,
            image,
            in_stock: self.is_in_stock(block),
        })
    }

    /// In stock when the add-to-cart marker is present and no
    /// out-of-stock phrase appears anywhere in the block.
    fn is_in_stock(&self, block: &ElementRef) -> bool {
        if block.select(&self.in_stock).next().is_none() {
            return false;
        }
        match &self.out_of_stock {
            Some(matcher) => !matcher.is_match(&block.text().collect::<String>()),
            None => true,
        }
    }

    fn build_phrase_matcher(phrases: &[String]) -> Result<Option<Regex>> {
        let alternatives: Vec<String> = phrases
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(None);
        }

        RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map(Some)
            .map_err(|e| AppError::config(format!("invalid out-of-stock phrases: {e}")))
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

impl ProductExtractor for ListingExtractor {
    fn extract(&self, html: &str) -> Result<Snapshot> {
        let document = Html::parse_document(html);
        let mut snapshot = Snapshot::new();
        let mut blocks = 0usize;

        for block in document.select(&self.block) {
            blocks += 1;
            match self.parse_block(&block) {
                Some(record) => {
                    snapshot.insert(record.link.clone(), record);
                }
                None => log::debug!("Skipping product block without a usable link"),
            }
        }

        if blocks == 0 {
            return Err(AppError::EmptyPage);
        }
        log::debug!("Extracted {} products from {} blocks", snapshot.len(), blocks);
        Ok(snapshot)
    }
}
