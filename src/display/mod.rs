//! Display formatting for terminal output
//!
//! Provides utilities for formatting backup records for terminal display.

pub mod backup;

pub use backup::{format_backup_details, format_backup_list, format_size};
