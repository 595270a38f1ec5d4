//! Storevault - backup export and restore for a storefront store
//!
//! This library snapshots the storefront's entity collections (categories,
//! products, customers, settings and, for archival, orders) into portable
//! JSON documents, and re-applies those documents to a live store under an
//! explicit conflict policy, in dependency order, with per-record fault
//! isolation and a side-effect-free preview mode.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and operator settings
//! - `error`: Custom error types
//! - `models`: Storefront entities and backup records
//! - `storage`: JSON file entity store with a transactional unit
//! - `backup`: Snapshot builder, restore planner and executor, backup manager
//! - `audit`: Activity log of exports and restores
//! - `cli`, `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use storevault::config::{paths::StorePaths, settings::Settings};
//! use storevault::storage::Storage;
//!
//! let paths = StorePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod storage;

pub use error::{StoreError, StoreResult};
