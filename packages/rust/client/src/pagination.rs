//! Client-side pagination: a bounded accumulator over a paged search endpoint.
//!
//! The TubeLab search endpoints return results one page at a time.
//! [`fetch_all`] repeatedly invokes an injected page-fetch function,
//! collecting hits until the requested limit is reached or the server
//! runs out of data. There are no retries: a failed page fetch
//! propagates unchanged and discards everything collected so far.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

use tubelab_shared::Result;

/// The server's maximum efficient page size.
pub const PAGE_SIZE: usize = 40;

/// Safety ceiling on accumulated results, applied regardless of the
/// caller-requested limit or server behavior.
pub const HARD_CAP: usize = 1000;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Offset and size for one page fetch.
///
/// `from` is a page index, not an item offset: the shipped connector
/// increments it by one per iteration while also sending `size`, and this
/// client preserves that contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub from: u32,
    pub size: usize,
}

/// Server-reported pagination state accompanying a page of hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub from: u64,
    pub size: u64,
    pub total: u64,
}

/// One response batch from a search endpoint.
///
/// Decoding is deliberately lenient: a missing or non-array `hits` field
/// becomes an empty page (end-of-data, not an error), and malformed
/// pagination info degrades to `None` so the short-page fallback applies.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "lenient_hits")]
    pub hits: Vec<T>,
    #[serde(default, deserialize_with = "lenient_pagination")]
    pub pagination: Option<PaginationInfo>,
}

fn lenient_hits<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn lenient_pagination<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<PaginationInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Fetch pages until `requested_limit` hits are collected or the server
/// runs out of data.
///
/// The limit is clamped to [`HARD_CAP`]. Each iteration requests
/// `min(PAGE_SIZE, remaining)` so the final page is never over-fetched,
/// and the result never exceeds the limit even if the server over-returns.
/// A zero limit returns an empty vec without invoking `fetch_page`.
#[instrument(skip(fetch_page))]
pub async fn fetch_all<T, F>(requested_limit: usize, mut fetch_page: F) -> Result<Vec<T>>
where
    F: AsyncFnMut(PageRequest) -> Result<Page<T>>,
{
    let limit = requested_limit.min(HARD_CAP);
    let mut collected: Vec<T> = Vec::new();
    let mut page: u32 = 0;

    while collected.len() < limit {
        let remaining = limit - collected.len();
        let request_size = PAGE_SIZE.min(remaining);

        debug!(page, request_size, collected = collected.len(), "fetching page");
        let response = fetch_page(PageRequest {
            from: page,
            size: request_size,
        })
        .await?;

        let received = response.hits.len();
        if received == 0 {
            break;
        }

        collected.extend(response.hits.into_iter().take(remaining));

        // A short page means the server ran out, with or without
        // pagination info.
        if received < request_size {
            break;
        }
        if let Some(info) = response.pagination {
            if info.from + info.size >= info.total {
                break;
            }
        }

        page += 1;
    }

    debug!(collected = collected.len(), "accumulation done");
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubelab_shared::TubeLabError;

    fn full_page(size: usize) -> Page<u32> {
        Page {
            hits: vec![7; size],
            pagination: None,
        }
    }

    #[tokio::test]
    async fn zero_limit_never_fetches() {
        let mut calls = 0u32;
        let result = fetch_all(0, async |_req: PageRequest| {
            calls += 1;
            Ok(full_page(PAGE_SIZE))
        })
        .await
        .expect("accumulate");

        assert!(result.is_empty());
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn limit_is_clamped_to_hard_cap() {
        // Server happily returns full pages forever; the cap must stop us.
        let mut calls = 0u32;
        let result = fetch_all(5000, async |req: PageRequest| {
            calls += 1;
            Ok(full_page(req.size))
        })
        .await
        .expect("accumulate");

        assert_eq!(result.len(), HARD_CAP);
        assert_eq!(calls as usize, HARD_CAP / PAGE_SIZE);
    }

    #[tokio::test]
    async fn full_pages_without_total_stop_at_limit() {
        let result = fetch_all(120, async |req: PageRequest| Ok(full_page(req.size)))
            .await
            .expect("accumulate");

        assert_eq!(result.len(), 120);
    }

    #[tokio::test]
    async fn short_page_ends_accumulation() {
        let mut calls = 0u32;
        let result = fetch_all(200, async |_req: PageRequest| {
            calls += 1;
            Ok(full_page(12))
        })
        .await
        .expect("accumulate");

        assert_eq!(result.len(), 12);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn pagination_total_ends_accumulation() {
        let mut calls = 0u32;
        let result = fetch_all(200, async |req: PageRequest| {
            calls += 1;
            Ok(Page {
                hits: vec![7u32; req.size],
                pagination: Some(PaginationInfo {
                    from: 0,
                    size: 40,
                    total: 40,
                }),
            })
        })
        .await
        .expect("accumulate");

        assert_eq!(result.len(), 40);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn fetch_failure_discards_collected_items() {
        let mut calls = 0u32;
        let result: Result<Vec<u32>> = fetch_all(200, async |req: PageRequest| {
            calls += 1;
            if calls == 1 {
                Ok(full_page(req.size))
            } else {
                Err(TubeLabError::Transport("connection reset".into()))
            }
        })
        .await;

        assert_eq!(calls, 2);
        match result {
            Err(TubeLabError::Transport(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn final_page_is_sized_to_remaining() {
        // limit 45: first call asks for 40, second for the remaining 5.
        let mut sizes: Vec<(u32, usize)> = Vec::new();
        let result = fetch_all(45, async |req: PageRequest| {
            sizes.push((req.from, req.size));
            Ok(full_page(req.size))
        })
        .await
        .expect("accumulate");

        assert_eq!(result.len(), 45);
        assert_eq!(sizes, vec![(0, 40), (1, 5)]);
    }

    #[tokio::test]
    async fn over_returning_server_is_sliced_to_limit() {
        let result = fetch_all(10, async |_req: PageRequest| Ok(full_page(40)))
            .await
            .expect("accumulate");

        assert_eq!(result.len(), 10);
    }

    #[test]
    fn missing_hits_decodes_as_empty_page() {
        let page: Page<u32> = serde_json::from_str(r#"{}"#).expect("decode");
        assert!(page.hits.is_empty());
        assert!(page.pagination.is_none());

        let page: Page<u32> =
            serde_json::from_str(r#"{"hits": "not-a-list"}"#).expect("decode");
        assert!(page.hits.is_empty());
    }

    #[test]
    fn malformed_pagination_decodes_as_none() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"hits": [1, 2], "pagination": {"from": "zero", "size": 40, "total": 80}}"#,
        )
        .expect("decode");
        assert_eq!(page.hits, vec![1, 2]);
        assert!(page.pagination.is_none());
    }

    #[test]
    fn well_formed_pagination_decodes() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"hits": [1], "pagination": {"from": 0, "size": 40, "total": 80}}"#,
        )
        .expect("decode");
        assert_eq!(
            page.pagination,
            Some(PaginationInfo {
                from: 0,
                size: 40,
                total: 80,
            })
        );
    }
}
