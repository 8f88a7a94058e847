//! HTTP fetching for the audited page and its site-level resources
//!
//! This module handles all HTTP requests made by an audit:
//! - Building the HTTP client with an identifying user agent
//! - Fetching the primary page with manual, bounded redirect handling
//! - Fetching robots.txt, the XML sitemap and llms.txt concurrently
//! - Classifying transport failures

mod auxiliary;
mod client;
mod error;
mod page;

pub use auxiliary::{fetch_auxiliary, AuxiliaryFetch, AuxiliaryResources};
pub use client::build_http_client;
pub use error::{classify_reqwest_error, FetchError};
pub use page::{fetch_page, FetchOptions, FetchResult};
