//! Core types for the datawire network usage estimator.
//!
//! This crate provides the fundamental data structures used throughout datawire:
//!
//! - [`UsageTotals`] - Upload and download byte counters
//! - [`Direction`] - Which way a transfer went
//! - [`Session`] - Running totals since the last reset
//! - [`DayKey`] / [`DayCalendar`] - Calendar day bucketing with an explicit offset
//! - [`ActivityRecord`] - A single entry of the recent-activity window
//! - [`Settings`] - User-facing alert and retention settings
//! - [`Clock`] - Injectable time source

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod activity;
mod clock;
mod day;
mod error;
mod session;
mod settings;
mod totals;

pub use activity::{ActivityRecord, TransferRate};
pub use clock::{Clock, ManualClock, SystemClock};
pub use day::{DayCalendar, DayKey};
pub use error::{DataWireError, Result};
pub use session::Session;
pub use settings::{DEFAULT_RETENTION_DAYS, Settings};
pub use totals::{Direction, UsageTotals};
