/// Column holding the article's source URL in the input dataset
pub const SOURCE_LINKOUT_COLUMN: &str = "Source linkout";

/// Hostname label identifying a Figshare-hosted portal
pub const FIGSHARE_MARKER: &str = "figshare";

/// Metric column names, in the order they are appended to the dataset
pub const METRIC_COLUMNS: [&str; 4] = ["views", "downloads", "shares", "citations"];

/// Reference to an article on a Figshare portal, derived from a source
/// linkout URL. The host site is the portal name used as a path segment in
/// the statistics API (e.g. "tandf", "plos").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigshareRef {
    pub host_site: String,
    pub article_id: String,
}

/// Usage metrics from one successful statistics response. A failed fetch
/// yields no ArticleMetrics at all, so a row's metric cells are either all
/// populated or all null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleMetrics {
    pub views: u64,
    pub downloads: u64,
    pub shares: u64,
    pub citations: u64,
}

/// Flattened row for the per-article metrics CSV, appended in processing
/// order and never mutated afterwards
#[derive(Debug, Clone)]
pub struct MetricsRecord {
    pub host_site: String,
    pub article_id: String,
    pub source_linkout: String,
    pub views: Option<u64>,
    pub downloads: Option<u64>,
    pub shares: Option<u64>,
    pub citations: Option<u64>,
}

impl MetricsRecord {
    pub fn new(article: &FigshareRef, source_linkout: &str, metrics: Option<ArticleMetrics>) -> Self {
        Self {
            host_site: article.host_site.clone(),
            article_id: article.article_id.clone(),
            source_linkout: source_linkout.to_string(),
            views: metrics.map(|m| m.views),
            downloads: metrics.map(|m| m.downloads),
            shares: metrics.map(|m| m.shares),
            citations: metrics.map(|m| m.citations),
        }
    }
}

/// Statistics from an enrichment run
#[derive(Debug, Clone, Default)]
pub struct EnrichStats {
    pub total_rows: usize,
    pub figshare_rows: usize,
    pub skipped_rows: usize,
    pub articles_fetched: usize,
    pub articles_failed: usize,
}
