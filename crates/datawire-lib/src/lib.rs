//! Browser data usage estimation and aggregation engine.
//!
//! This is a facade crate that re-exports functionality from the datawire
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use datawire_lib::prelude::*;
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let mut ledger = UsageLedger::new(now);
//!
//! let request = RequestMeta::new("https://example.com/index.html", "GET");
//! ledger.record_upload(estimate_upload_size(&request), &request.url, now);
//! ledger.record_download(5120, "https://example.com/app.js", now);
//!
//! let snapshot = ledger.snapshot(now);
//! assert_eq!(snapshot.site_usage["example.com"].download, 5120);
//! println!("today: {}", format_bytes(snapshot.today_total));
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use datawire_types::*;

// Re-export estimation
pub use datawire_estimate::{
    ContentLength, DownloadRule, DownloadRuleTable, Header, RequestMeta, SizeEstimator,
    UNKNOWN_DOMAIN, badge_text, estimate_download_size_from_url, estimate_upload_size,
    extract_domain, format_bytes,
};

// Re-export aggregation
#[cfg(feature = "ledger")]
pub use datawire_ledger::{
    DailyUsage, DurableState, DurableView, RecentActivity, RolloverOutcome, SiteUsage,
    UsageLedger, UsageSnapshot,
};

// Re-export the monitor
#[cfg(feature = "daemon")]
pub use datawire_daemon::{
    AlertEvaluator, InboundMessage, JsonFileStore, KeyValueStore, Lifecycle, LogNotifier,
    MemoryStore, MonitorConfig, NotificationIntent, Notifier, NotifyError, QueryRequest,
    QueryResponse, RequestEvent, Scheduler, ShortcutCommand, StateError, UsageMonitor, UsageStore,
};

/// Prelude module for convenient imports.
///
/// ```
/// use datawire_lib::prelude::*;
/// ```
pub mod prelude {
    pub use datawire_types::{
        Clock, DataWireError, DayCalendar, DayKey, Direction, Session, Settings, SystemClock,
        TransferRate, UsageTotals,
    };

    pub use datawire_estimate::{
        Header, RequestMeta, SizeEstimator, estimate_download_size_from_url,
        estimate_upload_size, extract_domain, format_bytes,
    };

    #[cfg(feature = "ledger")]
    pub use datawire_ledger::{UsageLedger, UsageSnapshot};

    #[cfg(feature = "daemon")]
    pub use datawire_daemon::{
        InboundMessage, MonitorConfig, NotificationIntent, Notifier, QueryRequest, QueryResponse,
        RequestEvent, Scheduler, UsageMonitor, UsageStore,
    };
}
