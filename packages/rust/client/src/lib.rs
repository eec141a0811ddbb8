//! Typed client for the TubeLab public API.
//!
//! This crate provides:
//! - [`TubeLabClient`] — authenticated HTTP access to the search, scan, and
//!   video endpoints
//! - [`filters`] — typed search filters and their query-string encoding
//! - [`pagination`] — the bounded client-side page accumulator

pub mod client;
pub mod filters;
pub mod pagination;

pub use client::{ClientOptions, TubeLabClient};
pub use filters::{
    ChannelFilters, ContentKind, OutlierFilters, PublishedWindow, Quality, QueryPairs, Range,
    RelatedSearch, SearchBy, SortBy, StatsKind, VideoKind,
};
pub use pagination::{HARD_CAP, PAGE_SIZE, Page, PageRequest, PaginationInfo, fetch_all};
