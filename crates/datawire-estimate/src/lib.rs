//! Transfer size estimation for the datawire network usage estimator.
//!
//! The browser only exposes request/response metadata, so byte counts are
//! approximated:
//!
//! - [`SizeEstimator`] - Upload estimates from headers and URL, download
//!   estimates from URL sniffing
//! - [`DownloadRuleTable`] - Ordered URL rules backing the download estimate
//! - [`ContentLength`] - Classification of a response's `content-length`
//! - [`extract_domain`] - URL to hostname for per-site attribution
//! - [`format_bytes`] / [`badge_text`] - Human-readable sizes

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod data;
mod domain;
mod estimator;

pub use data::{DownloadRule, DownloadRuleTable};
pub use domain::{UNKNOWN_DOMAIN, extract_domain};
pub use estimator::{
    ContentLength, Header, RequestMeta, SizeEstimator, badge_text, estimate_download_size_from_url,
    estimate_upload_size, format_bytes,
};
