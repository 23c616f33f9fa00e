//! Usage aggregation for the datawire network usage estimator.
//!
//! This crate turns individual transfer observations into running totals:
//!
//! - [`UsageLedger`] - Session, daily, per-domain and recent-activity views
//! - [`RecentActivity`] - Trailing window used for the instantaneous rate
//! - [`UsageSnapshot`] - Consistent copy of all views for the UI
//! - [`DurableState`] - The persisted subset, as loaded from storage
//! - [`RolloverOutcome`] - What a day rollover check changed

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod ledger;
mod snapshot;
mod window;

pub use ledger::{RolloverOutcome, UsageLedger};
pub use snapshot::{DailyUsage, DurableState, DurableView, SiteUsage, UsageSnapshot};
pub use window::RecentActivity;
