//! Activity logging for Storevault
//!
//! Records who ran which export or restore against which backup, in an
//! append-only JSONL file. The log sits outside any transactional unit and
//! a failure to write it never fails the operation being recorded.
//!
//! # Example
//!
//! ```rust,ignore
//! use storevault::audit::{record_activity, ActivityAction, ActivityEntry, ActivityLog};
//!
//! let log = ActivityLog::new(paths.activity_log());
//! record_activity(
//!     &log,
//!     ActivityEntry::new("admin", ActivityAction::RestoreApplied, backup.id),
//! );
//! ```

mod entry;
mod logger;

pub use entry::{ActivityAction, ActivityEntry};
pub use logger::{record_activity, ActivityLog, ActivitySink};
