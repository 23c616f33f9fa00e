//! Background monitoring for the datawire network usage estimator.
//!
//! This crate hosts the ledger inside a long-running process:
//!
//! - [`UsageMonitor`] - Applies request events and answers UI queries
//! - [`Scheduler`] - Periodic persistence, rollover and alert tasks
//! - [`UsageStore`] - Typed persistence over a [`KeyValueStore`]
//! - [`JsonFileStore`] / [`MemoryStore`] - Storage backends
//! - [`AlertEvaluator`] - Daily usage threshold checks
//! - [`Notifier`] - Delivery of [`NotificationIntent`]s
//! - [`MonitorConfig`] - Intervals, windows and alert policy

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod alert;
mod config;
mod events;
mod monitor;
mod query;
mod scheduler;
mod state;
mod storage;

pub use alert::{AlertEvaluator, LogNotifier, NotificationIntent, Notifier, NotifyError};
pub use config::MonitorConfig;
pub use events::{InboundMessage, RequestEvent, ShortcutCommand, status_allows_fallback};
pub use monitor::{Lifecycle, UsageMonitor};
pub use query::{QUERY_TIMED_OUT, QueryRequest, QueryResponse, UNKNOWN_ACTION};
pub use scheduler::Scheduler;
pub use state::{
    CURRENT_SESSION_KEY, DAILY_USAGE_KEY, Result, SETTINGS_KEY, SITE_USAGE_KEY, StateError,
    UsageStore,
};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
