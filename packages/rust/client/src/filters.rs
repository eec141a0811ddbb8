//! Typed search filters and their query-string encoding.
//!
//! Every recognized filter is a named field here; there is no string-keyed
//! pass-through, so an unknown parameter cannot reach the wire. Each
//! `apply` method pushes the exact camelCase query keys the TubeLab API
//! expects onto the outgoing parameter list.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use tubelab_shared::{ChannelId, Result, TubeLabError, VideoId};

/// Query parameters accumulated for one request.
pub type QueryPairs = Vec<(String, String)>;

/// Maximum number of exclude keywords accepted by the outlier endpoints.
const MAX_EXCLUDE_KEYWORDS: usize = 20;

/// Maximum number of seed videos for a related-outlier search.
const MAX_RELATED_VIDEOS: usize = 10;

/// Maximum number of seed channels for a related-outlier search.
const MAX_RELATED_CHANNELS: usize = 2;

/// Format a numeric bound without a trailing `.0` for whole values.
fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// An optional numeric range, encoded as `{key}From` / `{key}To`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl Range {
    pub fn from(value: f64) -> Self {
        Self {
            from: Some(value),
            to: None,
        }
    }

    pub fn between(from: f64, to: f64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    fn push(&self, key: &str, out: &mut QueryPairs) {
        if let Some(from) = self.from {
            out.push((format!("{key}From"), fmt_number(from)));
        }
        if let Some(to) = self.to {
            out.push((format!("{key}To"), fmt_number(to)));
        }
    }
}

/// Relative upload-date window, rendered as an absolute RFC 3339 cutoff.
///
/// Months are 30-day approximations, matching the shipped connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedWindow {
    LastWeek,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    LastYear,
}

impl PublishedWindow {
    /// The earliest accepted upload instant, relative to `now`.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            Self::LastWeek => 7,
            Self::LastMonth => 30,
            Self::LastThreeMonths => 90,
            Self::LastSixMonths => 180,
            Self::LastYear => 360,
        };
        now - Duration::days(days)
    }

    fn push(self, now: DateTime<Utc>, out: &mut QueryPairs) {
        out.push((
            "publishedAtFrom".into(),
            self.cutoff(now).to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
    }
}

impl std::str::FromStr for PublishedWindow {
    type Err = TubeLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1week" => Ok(Self::LastWeek),
            "1month" => Ok(Self::LastMonth),
            "3months" => Ok(Self::LastThreeMonths),
            "6months" => Ok(Self::LastSixMonths),
            "1year" => Ok(Self::LastYear),
            other => Err(TubeLabError::validation(format!(
                "unknown window '{other}' (expected 1week, 1month, 3months, 6months, or 1year)"
            ))),
        }
    }
}

macro_rules! keyword_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_param(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = TubeLabError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    other => Err(TubeLabError::validation(format!(
                        concat!("unknown ", stringify!($name), " '{}' (expected one of: ",
                            $($token, " ",)+ ")"),
                        other
                    ))),
                }
            }
        }
    };
}

keyword_enum! {
    /// Channel content composition (`contentKind`).
    ContentKind {
        Video => "video",
        Short => "short",
        LongForm => "long-form",
        ShortForm => "short-form",
    }
}

keyword_enum! {
    /// Which content kind channel statistics are computed over (`filterBy`).
    StatsKind {
        Video => "video",
        Short => "short",
    }
}

keyword_enum! {
    /// Outlier content kind (`type`).
    VideoKind {
        Video => "video",
        Short => "short",
    }
}

keyword_enum! {
    /// AI content-quality classification (`classificationQuality`).
    Quality {
        Positive => "positive",
        Neutral => "neutral",
        Negative => "negative",
    }
}

keyword_enum! {
    /// Semantic vs lexical query matching (`by`).
    SearchBy {
        Semantic => "semantic",
        Lexical => "lexical",
    }
}

/// Sort order for outlier searches (`sortBy`).
///
/// `Relevance` is the server default and is omitted from the query, as the
/// shipped connector does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Relevance,
    AverageViewsRatio,
    PublishedAt,
    Revenue,
    Rpm,
    Views,
    ZScore,
}

impl SortBy {
    /// Encode onto `out` as `sortBy`; relevance is the server default and
    /// produces nothing.
    pub fn apply(self, out: &mut QueryPairs) {
        let value = match self {
            Self::Relevance => return,
            Self::AverageViewsRatio => "averageViewsRatio",
            Self::PublishedAt => "publishedAt",
            Self::Revenue => "revenue",
            Self::Rpm => "rpm",
            Self::Views => "views",
            Self::ZScore => "zScore",
        };
        out.push(("sortBy".into(), value.into()));
    }
}

impl std::str::FromStr for SortBy {
    type Err = TubeLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "outlier-score" | "average-views-ratio" => Ok(Self::AverageViewsRatio),
            "published-at" => Ok(Self::PublishedAt),
            "revenue" => Ok(Self::Revenue),
            "rpm" => Ok(Self::Rpm),
            "views" => Ok(Self::Views),
            "z-score" => Ok(Self::ZScore),
            other => Err(TubeLabError::validation(format!(
                "unknown sort order '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelFilters
// ---------------------------------------------------------------------------

/// Filters for `/v1/channels` and `/v1/channels/related`.
#[derive(Debug, Clone, Default)]
pub struct ChannelFilters {
    pub content_kind: Option<ContentKind>,
    pub filter_by: Option<StatsKind>,
    pub language: Option<String>,
    pub published_within: Option<PublishedWindow>,
    pub average_views: Range,
    pub median_views: Range,
    pub subscribers: Range,
    pub videos_count: Range,
    /// Lower bound on the avg-views-to-subscribers ratio.
    pub views_to_subscribers_ratio_from: Option<f64>,
}

impl ChannelFilters {
    /// Encode onto `out`. `now` anchors relative date windows.
    pub fn apply(&self, now: DateTime<Utc>, out: &mut QueryPairs) {
        if let Some(kind) = self.content_kind {
            out.push(("contentKind".into(), kind.as_param().into()));
        }
        if let Some(by) = self.filter_by {
            out.push(("filterBy".into(), by.as_param().into()));
        }
        if let Some(lang) = &self.language {
            if !lang.is_empty() {
                out.push(("language".into(), lang.clone()));
            }
        }
        if let Some(window) = self.published_within {
            window.push(now, out);
        }
        self.average_views.push("averageViews", out);
        self.median_views.push("medianViews", out);
        self.subscribers.push("subscribers", out);
        self.videos_count.push("videosCount", out);
        if let Some(ratio) = self.views_to_subscribers_ratio_from {
            out.push(("avgViewsToSubscribersRatioFrom".into(), fmt_number(ratio)));
        }
    }
}

// ---------------------------------------------------------------------------
// OutlierFilters
// ---------------------------------------------------------------------------

/// Filters for `/v1/outliers` and `/v1/outliers/related`.
#[derive(Debug, Clone, Default)]
pub struct OutlierFilters {
    pub kind: Option<VideoKind>,
    pub quality: Option<Quality>,
    /// Whether the channel has faceless potential (`classificationIsFaceless`).
    pub faceless: Option<bool>,
    /// Whether the channel has AdSense enabled (`channelMonetizationAdsense`).
    pub monetized: Option<bool>,
    pub language: Option<String>,
    pub published_within: Option<PublishedWindow>,
    /// Keywords excluded from results, at most twenty.
    pub exclude_keywords: Vec<String>,
    pub search_by: Option<SearchBy>,
    pub views: Range,
    pub subscribers: Range,
    pub z_score: Range,
    /// Outlier score range (`averageViewsRatioFrom/To`).
    pub average_views_ratio: Range,
    pub rpm_estimation: Range,
    pub revenue_estimation: Range,
    /// Duration bounds in minutes; the API expects seconds.
    pub duration_minutes: Range,
    /// Restrict results to a specific scan.
    pub reference_id: Option<String>,
}

impl OutlierFilters {
    /// Encode onto `out`. `now` anchors relative date windows.
    pub fn apply(&self, now: DateTime<Utc>, out: &mut QueryPairs) -> Result<()> {
        if self.exclude_keywords.len() > MAX_EXCLUDE_KEYWORDS {
            return Err(TubeLabError::validation(format!(
                "at most {MAX_EXCLUDE_KEYWORDS} exclude keywords are accepted, got {}",
                self.exclude_keywords.len()
            )));
        }

        if let Some(kind) = self.kind {
            out.push(("type".into(), kind.as_param().into()));
        }
        if let Some(quality) = self.quality {
            out.push(("classificationQuality".into(), quality.as_param().into()));
        }
        if let Some(faceless) = self.faceless {
            out.push(("classificationIsFaceless".into(), faceless.to_string()));
        }
        if let Some(monetized) = self.monetized {
            out.push(("channelMonetizationAdsense".into(), monetized.to_string()));
        }
        if let Some(lang) = &self.language {
            if !lang.is_empty() {
                out.push(("language".into(), lang.clone()));
            }
        }
        if let Some(window) = self.published_within {
            window.push(now, out);
        }
        for keyword in &self.exclude_keywords {
            out.push(("excludeKeyword".into(), keyword.clone()));
        }
        if let Some(by) = self.search_by {
            out.push(("by".into(), by.as_param().into()));
        }
        self.views.push("viewCount", out);
        self.subscribers.push("subscribersCount", out);
        self.z_score.push("zScore", out);
        self.average_views_ratio.push("averageViewsRatio", out);
        self.rpm_estimation.push("rpmEstimation", out);
        self.revenue_estimation.push("revenueEstimation", out);

        // Duration is exposed in minutes but the API filters on seconds.
        let duration_secs = Range {
            from: self.duration_minutes.from.map(|m| m * 60.0),
            to: self.duration_minutes.to.map(|m| m * 60.0),
        };
        duration_secs.push("duration", out);

        if let Some(reference) = &self.reference_id {
            out.push(("referenceId".into(), reference.clone()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RelatedSearch
// ---------------------------------------------------------------------------

/// Seed for a related-outlier search. Exactly one criterion is allowed,
/// which the enum encodes by construction; cardinality bounds are checked
/// before the request is built.
#[derive(Debug, Clone)]
pub enum RelatedSearch {
    /// Up to ten seed videos (`videoId`, repeated).
    Videos(Vec<VideoId>),
    /// Thumbnail similarity to a single video (`thumbnailVideoId`).
    Thumbnail(VideoId),
    /// Up to two seed channels (`relatedChannelId`, repeated).
    Channels(Vec<ChannelId>),
}

impl RelatedSearch {
    /// Check cardinality bounds.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Videos(ids) if ids.is_empty() => Err(TubeLabError::validation(
                "related search needs at least one video ID",
            )),
            Self::Videos(ids) if ids.len() > MAX_RELATED_VIDEOS => {
                Err(TubeLabError::validation(format!(
                    "related search accepts at most {MAX_RELATED_VIDEOS} video IDs, got {}",
                    ids.len()
                )))
            }
            Self::Channels(ids) if ids.is_empty() => Err(TubeLabError::validation(
                "related search needs at least one channel ID",
            )),
            Self::Channels(ids) if ids.len() > MAX_RELATED_CHANNELS => {
                Err(TubeLabError::validation(format!(
                    "related search accepts at most {MAX_RELATED_CHANNELS} channel IDs, got {}",
                    ids.len()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Encode onto `out`. Call [`validate`](Self::validate) first.
    pub fn apply(&self, out: &mut QueryPairs) {
        match self {
            Self::Videos(ids) => {
                for id in ids {
                    out.push(("videoId".into(), id.to_string()));
                }
            }
            Self::Thumbnail(id) => {
                out.push(("thumbnailVideoId".into(), id.to_string()));
            }
            Self::Channels(ids) => {
                for id in ids {
                    out.push(("relatedChannelId".into(), id.to_string()));
                }
            }
        }
    }
}
