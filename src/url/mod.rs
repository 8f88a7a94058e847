//! URL handling module for seo-audit
//!
//! This module normalizes the audit target, extracts domains and decides
//! whether a link stays on the audited site.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_site, strip_www};
pub use normalize::{is_tracking_param, normalize_target_url, origin_of};
