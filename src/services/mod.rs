//! Service layer for the monitor.
//!
//! This module contains the collaborators the monitor loop drives:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Product extraction (`ProductExtractor`, `ListingExtractor`)

mod extractor;
mod fetcher;

pub use extractor::{ListingExtractor, ProductExtractor};
pub use fetcher::{HttpFetcher, PageFetcher};
