//! CLI command definitions, routing, and tracing setup.

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use tubelab_client::{
    ChannelFilters, ClientOptions, ContentKind, OutlierFilters, PublishedWindow, Quality, Range,
    RelatedSearch, SearchBy, SortBy, StatsKind, TubeLabClient, VideoKind,
};
use tubelab_shared::{
    AppConfig, ChannelId, ScanMode, ScanRequest, VideoId, config_file_path, init_config,
    load_config, resolve_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TubeLab — trending YouTube channels and outlier videos for any niche.
#[derive(Parser)]
#[command(
    name = "tubelab",
    version,
    about = "Search trending YouTube channels and outlier videos from the TubeLab API.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search channels from the YouTube niche finder.
    Channels {
        /// Search terms (comma-separated for multiple queries).
        #[arg(short, long)]
        query: String,

        /// Search for channels with related content instead of a direct match.
        #[arg(long)]
        related: bool,

        /// Maximum number of results (defaults from config, hard-capped at 1000).
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        filters: ChannelFilterArgs,
    },

    /// Search outlier videos from the YouTube outliers finder.
    Outliers {
        /// Search terms (comma-separated for multiple queries).
        #[arg(short, long)]
        query: String,

        /// Sort order: relevance, outlier-score, published-at, revenue, rpm,
        /// views, or z-score.
        #[arg(short, long, default_value = "relevance")]
        sort: SortBy,

        /// Maximum number of results (defaults from config, hard-capped at 1000).
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        filters: OutlierFilterArgs,
    },

    /// Search outliers similar to seed videos, a thumbnail, or seed channels.
    SimilarOutliers {
        /// Seed video IDs (repeatable, max 10).
        #[arg(long = "video-id")]
        video_ids: Vec<VideoId>,

        /// Seed video for thumbnail similarity.
        #[arg(long)]
        thumbnail_video_id: Option<VideoId>,

        /// Seed channel IDs (repeatable, max 2).
        #[arg(long = "channel-id")]
        channel_ids: Vec<ChannelId>,

        /// Maximum number of results (defaults from config, hard-capped at 1000).
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        filters: OutlierFilterArgs,
    },

    /// Niche scans: start a new scan or look one up.
    Scan {
        #[command(subcommand)]
        action: ScanAction,
    },

    /// Look up details for a single video.
    Video {
        /// The YouTube video ID (the `v=` part of a watch URL).
        video_id: VideoId,
    },

    /// Check that the configured API key is accepted.
    Verify,

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Scan subcommands.
#[derive(Subcommand)]
pub(crate) enum ScanAction {
    /// Start a scan from search queries or seed channels.
    Start {
        /// Search queries to scan from (repeatable, max 10).
        #[arg(short, long = "query")]
        queries: Vec<String>,

        /// Seed channel IDs to scan from (repeatable).
        #[arg(long = "channel-id")]
        channel_ids: Vec<ChannelId>,

        /// Scan mode: fast, standard, or test.
        #[arg(short, long, default_value = "fast")]
        mode: ScanMode,
    },
    /// Look up a scan by ID.
    Get {
        /// The scan ID.
        id: String,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Filter flags
// ---------------------------------------------------------------------------

/// Channel search filter flags.
#[derive(Args)]
pub(crate) struct ChannelFilterArgs {
    /// Content kind: video, short, long-form, or short-form.
    #[arg(long)]
    content_kind: Option<ContentKind>,

    /// Compute statistics over: video or short.
    #[arg(long)]
    filter_by: Option<StatsKind>,

    /// Detected channel language (ISO code, e.g. en).
    #[arg(long)]
    language: Option<String>,

    /// Upload recency: 1week, 1month, 3months, 6months, or 1year.
    #[arg(long)]
    published_within: Option<PublishedWindow>,

    #[arg(long)]
    subscribers_from: Option<f64>,
    #[arg(long)]
    subscribers_to: Option<f64>,

    #[arg(long)]
    avg_views_from: Option<f64>,
    #[arg(long)]
    avg_views_to: Option<f64>,

    #[arg(long)]
    median_views_from: Option<f64>,
    #[arg(long)]
    median_views_to: Option<f64>,

    #[arg(long)]
    videos_count_from: Option<f64>,
    #[arg(long)]
    videos_count_to: Option<f64>,

    /// Lower bound on the avg-views-to-subscribers ratio.
    #[arg(long)]
    ratio_from: Option<f64>,
}

impl ChannelFilterArgs {
    fn into_filters(self, default_language: &str) -> ChannelFilters {
        ChannelFilters {
            content_kind: self.content_kind,
            filter_by: self.filter_by,
            language: self.language.or_else(|| {
                (!default_language.is_empty()).then(|| default_language.to_string())
            }),
            published_within: self.published_within,
            average_views: range(self.avg_views_from, self.avg_views_to),
            median_views: range(self.median_views_from, self.median_views_to),
            subscribers: range(self.subscribers_from, self.subscribers_to),
            videos_count: range(self.videos_count_from, self.videos_count_to),
            views_to_subscribers_ratio_from: self.ratio_from,
        }
    }
}

/// Outlier search filter flags.
#[derive(Args)]
pub(crate) struct OutlierFilterArgs {
    /// Content kind: video or short.
    #[arg(long = "type")]
    kind: Option<VideoKind>,

    /// AI content-quality classification: positive, neutral, or negative.
    #[arg(long)]
    quality: Option<Quality>,

    /// Only channels with (or without) faceless potential.
    #[arg(long)]
    faceless: Option<bool>,

    /// Only channels with (or without) AdSense monetization.
    #[arg(long)]
    monetized: Option<bool>,

    /// Detected channel language (ISO code, e.g. en).
    #[arg(long)]
    language: Option<String>,

    /// Upload recency: 1week, 1month, 3months, 6months, or 1year.
    #[arg(long)]
    published_within: Option<PublishedWindow>,

    /// Exclude results matching a keyword (repeatable, max 20).
    #[arg(long = "exclude-keyword")]
    exclude_keywords: Vec<String>,

    /// Query matching: semantic or lexical.
    #[arg(long)]
    by: Option<SearchBy>,

    #[arg(long)]
    views_from: Option<f64>,
    #[arg(long)]
    views_to: Option<f64>,

    #[arg(long)]
    subscribers_from: Option<f64>,
    #[arg(long)]
    subscribers_to: Option<f64>,

    #[arg(long)]
    z_score_from: Option<f64>,
    #[arg(long)]
    z_score_to: Option<f64>,

    /// Outlier score (average views ratio) bounds.
    #[arg(long)]
    outlier_score_from: Option<f64>,
    #[arg(long)]
    outlier_score_to: Option<f64>,

    #[arg(long)]
    rpm_from: Option<f64>,
    #[arg(long)]
    rpm_to: Option<f64>,

    #[arg(long)]
    revenue_from: Option<f64>,
    #[arg(long)]
    revenue_to: Option<f64>,

    /// Video duration bounds in minutes.
    #[arg(long)]
    duration_from: Option<f64>,
    #[arg(long)]
    duration_to: Option<f64>,

    /// Restrict results to a specific scan.
    #[arg(long)]
    reference_id: Option<String>,
}

impl OutlierFilterArgs {
    fn into_filters(self, default_language: &str) -> OutlierFilters {
        OutlierFilters {
            kind: self.kind,
            quality: self.quality,
            faceless: self.faceless,
            monetized: self.monetized,
            language: self.language.or_else(|| {
                (!default_language.is_empty()).then(|| default_language.to_string())
            }),
            published_within: self.published_within,
            exclude_keywords: self.exclude_keywords,
            search_by: self.by,
            views: range(self.views_from, self.views_to),
            subscribers: range(self.subscribers_from, self.subscribers_to),
            z_score: range(self.z_score_from, self.z_score_to),
            average_views_ratio: range(self.outlier_score_from, self.outlier_score_to),
            rpm_estimation: range(self.rpm_from, self.rpm_to),
            revenue_estimation: range(self.revenue_from, self.revenue_to),
            duration_minutes: range(self.duration_from, self.duration_to),
            reference_id: self.reference_id,
        }
    }
}

fn range(from: Option<f64>, to: Option<f64>) -> Range {
    Range { from, to }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tubelab_cli=info,tubelab_client=info,tubelab_shared=info",
        1 => "tubelab_cli=debug,tubelab_client=debug,tubelab_shared=debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Channels {
            query,
            related,
            limit,
            filters,
        } => cmd_channels(&query, related, limit, filters).await,
        Command::Outliers {
            query,
            sort,
            limit,
            filters,
        } => cmd_outliers(&query, sort, limit, filters).await,
        Command::SimilarOutliers {
            video_ids,
            thumbnail_video_id,
            channel_ids,
            limit,
            filters,
        } => cmd_similar_outliers(video_ids, thumbnail_video_id, channel_ids, limit, filters).await,
        Command::Scan { action } => match action {
            ScanAction::Start {
                queries,
                channel_ids,
                mode,
            } => cmd_scan_start(queries, channel_ids, mode).await,
            ScanAction::Get { id } => cmd_scan_get(&id).await,
        },
        Command::Video { video_id } => cmd_video(&video_id).await,
        Command::Verify => cmd_verify().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn build_client(config: &AppConfig) -> Result<TubeLabClient> {
    let api_key = resolve_api_key(config)?;
    let options = ClientOptions {
        base_url: config.api.base_url.clone(),
        timeout_secs: config.api.timeout_secs,
    };
    Ok(TubeLabClient::with_options(api_key, &options)?)
}

/// Split a comma-separated query into trimmed, non-empty terms.
fn split_query(query: &str) -> Vec<String> {
    query
        .split(',')
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .collect()
}

fn search_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message("searching TubeLab…");
    spinner
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_channels(
    query: &str,
    related: bool,
    limit: Option<usize>,
    filters: ChannelFilterArgs,
) -> Result<()> {
    let config = load_config()?;
    let client = build_client(&config)?;
    let terms = split_query(query);
    if terms.is_empty() {
        return Err(eyre!("no search terms given"));
    }
    let limit = limit.unwrap_or(config.defaults.limit);
    let filters = filters.into_filters(&config.defaults.language);

    info!(terms = terms.len(), related, limit, "searching channels");
    let spinner = search_spinner();
    let hits = if related {
        client.search_related_channels(&terms, &filters, limit).await
    } else {
        client.search_channels(&terms, &filters, limit).await
    };
    spinner.finish_and_clear();

    print_json(&hits?)
}

async fn cmd_outliers(
    query: &str,
    sort: SortBy,
    limit: Option<usize>,
    filters: OutlierFilterArgs,
) -> Result<()> {
    let config = load_config()?;
    let client = build_client(&config)?;
    let terms = split_query(query);
    if terms.is_empty() {
        return Err(eyre!("no search terms given"));
    }
    let limit = limit.unwrap_or(config.defaults.limit);
    let filters = filters.into_filters(&config.defaults.language);

    info!(terms = terms.len(), ?sort, limit, "searching outliers");
    let spinner = search_spinner();
    let hits = client.search_outliers(&terms, &filters, sort, limit).await;
    spinner.finish_and_clear();

    print_json(&hits?)
}

async fn cmd_similar_outliers(
    video_ids: Vec<VideoId>,
    thumbnail_video_id: Option<VideoId>,
    channel_ids: Vec<ChannelId>,
    limit: Option<usize>,
    filters: OutlierFilterArgs,
) -> Result<()> {
    let seed = match (video_ids.is_empty(), thumbnail_video_id, channel_ids.is_empty()) {
        (false, None, true) => RelatedSearch::Videos(video_ids),
        (true, Some(id), true) => RelatedSearch::Thumbnail(id),
        (true, None, false) => RelatedSearch::Channels(channel_ids),
        (true, None, true) => {
            return Err(eyre!(
                "give one of --video-id, --thumbnail-video-id, or --channel-id"
            ));
        }
        _ => {
            return Err(eyre!(
                "exactly one of --video-id, --thumbnail-video-id, or --channel-id is allowed"
            ));
        }
    };

    let config = load_config()?;
    let client = build_client(&config)?;
    let limit = limit.unwrap_or(config.defaults.limit);
    let filters = filters.into_filters(&config.defaults.language);

    info!(limit, "searching similar outliers");
    let spinner = search_spinner();
    let hits = client.search_related_outliers(&seed, &filters, limit).await;
    spinner.finish_and_clear();

    print_json(&hits?)
}

async fn cmd_scan_start(
    queries: Vec<String>,
    channel_ids: Vec<ChannelId>,
    mode: ScanMode,
) -> Result<()> {
    let request = match (queries.is_empty(), channel_ids.is_empty()) {
        (false, true) => ScanRequest::from_queries(queries, mode)?,
        (true, false) => ScanRequest::from_channels(channel_ids, mode)?,
        (true, true) => return Err(eyre!("give --query terms or --channel-id seeds")),
        (false, false) => {
            return Err(eyre!("--query and --channel-id are mutually exclusive"));
        }
    };

    let config = load_config()?;
    let client = build_client(&config)?;

    info!(?mode, "starting scan");
    let scan = client.start_scan(&request).await?;
    print_json(&scan)
}

async fn cmd_scan_get(id: &str) -> Result<()> {
    let config = load_config()?;
    let client = build_client(&config)?;

    let scan = client.get_scan(id).await?;
    print_json(&scan)
}

async fn cmd_video(video_id: &VideoId) -> Result<()> {
    let config = load_config()?;
    let client = build_client(&config)?;

    let details = client.get_video_details(video_id).await?;
    print_json(&details)
}

async fn cmd_verify() -> Result<()> {
    let config = load_config()?;
    let client = build_client(&config)?;

    client.verify_credentials().await?;
    println!("API key accepted.");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    println!("# {}", config_file_path()?.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
