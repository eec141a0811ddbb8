//! Domain types for the TubeLab API: validated YouTube identifiers,
//! search hits, and scan descriptors.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeLabError};

/// A YouTube channel ID is exactly 24 characters, starts with `UC`, and uses
/// the URL-safe base64 alphabet.
static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("channel id regex"));

/// A YouTube video ID is exactly 11 URL-safe base64 characters.
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id regex"));

// ---------------------------------------------------------------------------
// ChannelId / VideoId
// ---------------------------------------------------------------------------

/// A validated YouTube channel identifier (`UC…`, 24 characters).
///
/// Invalid IDs are rejected client-side, before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Validate and wrap a raw channel ID string.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if CHANNEL_ID_RE.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(TubeLabError::validation(format!(
                "'{raw}' is not a valid YouTube channel ID \
                 (expected 24 characters starting with 'UC')"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ChannelId {
    type Err = TubeLabError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A validated YouTube video identifier (11 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Validate and wrap a raw video ID string.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if VIDEO_ID_RE.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(TubeLabError::validation(format!(
                "'{raw}' is not a valid YouTube video ID (expected 11 characters)"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VideoId {
    type Err = TubeLabError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Search hits
// ---------------------------------------------------------------------------

/// One channel returned by the channel search endpoints.
///
/// Commonly used fields are typed; everything else the API returns is kept
/// verbatim in `extra` so hits pass through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_views: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_views: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos_count: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One outlier video returned by the outlier search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_views_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Detail record for a single video lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

/// How a scan discovers its starting set: search queries or seed channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindBy {
    Query,
    Channels,
}

/// How many outliers and channels a scan searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Fast,
    Standard,
    Test,
}

impl std::str::FromStr for ScanMode {
    type Err = TubeLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fast" => Ok(Self::Fast),
            "standard" => Ok(Self::Standard),
            "test" => Ok(Self::Test),
            other => Err(TubeLabError::validation(format!(
                "unknown scan mode '{other}' (expected fast, standard, or test)"
            ))),
        }
    }
}

/// Body for `POST /v1/scans`.
///
/// Channel-seeded scans reuse the `query` field for the seed IDs, matching
/// the API's request shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub find_by: FindBy,
    pub query: Vec<String>,
    pub mode: ScanMode,
}

/// Maximum number of search queries a scan accepts.
const SCAN_MAX_QUERIES: usize = 10;

impl ScanRequest {
    /// Start a scan from up to ten search queries.
    pub fn from_queries(queries: Vec<String>, mode: ScanMode) -> Result<Self> {
        if queries.is_empty() {
            return Err(TubeLabError::validation(
                "a scan needs at least one search query",
            ));
        }
        if queries.len() > SCAN_MAX_QUERIES {
            return Err(TubeLabError::validation(format!(
                "a scan accepts at most {SCAN_MAX_QUERIES} queries, got {}",
                queries.len()
            )));
        }
        Ok(Self {
            find_by: FindBy::Query,
            query: queries,
            mode,
        })
    }

    /// Start a scan from seed channels. Every ID is validated first.
    pub fn from_channels(channels: Vec<ChannelId>, mode: ScanMode) -> Result<Self> {
        if channels.is_empty() {
            return Err(TubeLabError::validation(
                "a scan needs at least one seed channel",
            ));
        }
        Ok(Self {
            find_by: FindBy::Channels,
            query: channels.into_iter().map(|c| c.0).collect(),
            mode,
        })
    }
}

/// A scan as returned by `GET /v1/scans/{id}` and `POST /v1/scans`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ScanMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_accepts_valid() {
        let id = ChannelId::new("UChn5jutPQB_bRjnG80pzl5w").expect("valid channel id");
        assert_eq!(id.as_str(), "UChn5jutPQB_bRjnG80pzl5w");
    }

    #[test]
    fn channel_id_rejects_wrong_prefix_and_length() {
        assert!(ChannelId::new("UAhn5jutPQB_bRjnG80pzl5w").is_err());
        assert!(ChannelId::new("UCshort").is_err());
        assert!(ChannelId::new("UChn5jutPQB_bRjnG80pzl5wXX").is_err());
        assert!(ChannelId::new("").is_err());
    }

    #[test]
    fn video_id_accepts_valid() {
        let id: VideoId = "dQw4w9WgXcQ".parse().expect("valid video id");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }

    #[test]
    fn video_id_rejects_invalid() {
        assert!(VideoId::new("tooshort").is_err());
        assert!(VideoId::new("dQw4w9WgXcQQ").is_err());
        assert!(VideoId::new("dQw4w9WgXc!").is_err());
    }

    #[test]
    fn channel_hit_preserves_unknown_fields() {
        let json = r#"{
            "channelId": "UChn5jutPQB_bRjnG80pzl5w",
            "title": "Some Channel",
            "subscribers": 1200,
            "classificationQuality": "positive"
        }"#;
        let hit: ChannelHit = serde_json::from_str(json).expect("deserialize hit");
        assert_eq!(hit.subscribers, Some(1200));
        assert_eq!(
            hit.extra.get("classificationQuality").and_then(|v| v.as_str()),
            Some("positive")
        );

        let back = serde_json::to_value(&hit).expect("serialize hit");
        assert_eq!(back["classificationQuality"], "positive");
    }

    #[test]
    fn scan_request_query_body_shape() {
        let req = ScanRequest::from_queries(vec!["minecraft".into()], ScanMode::Fast)
            .expect("valid request");
        let body = serde_json::to_value(&req).expect("serialize");
        assert_eq!(body["findBy"], "query");
        assert_eq!(body["query"][0], "minecraft");
        assert_eq!(body["mode"], "fast");
    }

    #[test]
    fn scan_request_limits_queries() {
        let queries: Vec<String> = (0..11).map(|i| format!("q{i}")).collect();
        assert!(ScanRequest::from_queries(queries, ScanMode::Fast).is_err());
        assert!(ScanRequest::from_queries(vec![], ScanMode::Fast).is_err());
    }

    #[test]
    fn scan_request_from_channels_uses_query_field() {
        let id = ChannelId::new("UChn5jutPQB_bRjnG80pzl5w").expect("valid id");
        let req = ScanRequest::from_channels(vec![id], ScanMode::Standard).expect("valid request");
        assert_eq!(req.find_by, FindBy::Channels);
        assert_eq!(req.query, vec!["UChn5jutPQB_bRjnG80pzl5w".to_string()]);
    }
}
