//! Configuration module for Storevault
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Operator settings persistence

pub mod paths;
pub mod settings;

pub use paths::StorePaths;
pub use settings::Settings;
