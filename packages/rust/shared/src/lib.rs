//! Shared types, error model, and configuration for the TubeLab client.
//!
//! This crate is the foundation depended on by the client library and CLI.
//! It provides:
//! - [`TubeLabError`] — the unified error type
//! - Validated identifiers ([`ChannelId`], [`VideoId`]) and API records
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, DEFAULT_BASE_URL, SearchDefaultsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, TubeLabError};
pub use types::{
    ChannelHit, ChannelId, FindBy, OutlierHit, Scan, ScanMode, ScanRequest, VideoDetails, VideoId,
};
