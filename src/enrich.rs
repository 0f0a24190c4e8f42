use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::info;
use polars::prelude::*;

use crate::common::{
    EnrichStats, MetricsRecord, FIGSHARE_MARKER, METRIC_COLUMNS, SOURCE_LINKOUT_COLUMN,
};
use crate::extract::extract_figshare_ref;
use crate::fetch::StatsClient;

/// Pause between processed rows, applied whether or not the fetch succeeded
pub const ROW_PACING: Duration = Duration::from_secs(2);

/// Result of enriching a dataset: the table with metric columns written
/// back, plus one record per article actually looked up
#[derive(Debug)]
pub struct EnrichOutcome {
    pub table: DataFrame,
    pub records: Vec<MetricsRecord>,
    pub stats: EnrichStats,
}

/// Seed a metric column from the table when present (prior runs left values
/// behind), otherwise all null. The cast covers columns read back as strings
/// or floats.
fn seed_metric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    match df.column(name) {
        Ok(col) => {
            let cast = col
                .cast(&DataType::Int64)
                .with_context(|| format!("Existing '{}' column is not numeric", name))?;
            Ok(cast.i64()?.to_vec())
        }
        Err(_) => Ok(vec![None; df.height()]),
    }
}

/// Enrich every Figshare row of the dataset with usage metrics.
///
/// Consumes the input table and returns the updated table together with the
/// per-article records; nothing is persisted here. Rows whose linkout is
/// null or lacks the figshare marker are left untouched; rows with a marker
/// but no extractable article id are skipped. Processed rows have all four
/// metric cells overwritten, to null when the fetch failed.
pub async fn enrich_table(
    df: DataFrame,
    client: &StatsClient,
    pacing: Duration,
    progress: &ProgressBar,
) -> Result<EnrichOutcome> {
    let linkouts: Vec<Option<String>> = df
        .column(SOURCE_LINKOUT_COLUMN)
        .with_context(|| format!("Input dataset has no '{}' column", SOURCE_LINKOUT_COLUMN))?
        .str()
        .with_context(|| format!("'{}' column is not a string column", SOURCE_LINKOUT_COLUMN))?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();

    let mut views = seed_metric_column(&df, "views")?;
    let mut downloads = seed_metric_column(&df, "downloads")?;
    let mut shares = seed_metric_column(&df, "shares")?;
    let mut citations = seed_metric_column(&df, "citations")?;

    let mut records = Vec::new();
    let mut stats = EnrichStats {
        total_rows: df.height(),
        ..Default::default()
    };

    for (row, linkout) in linkouts.iter().enumerate() {
        let Some(linkout) = linkout.as_deref() else {
            continue;
        };
        if !linkout.contains(FIGSHARE_MARKER) {
            continue;
        }
        stats.figshare_rows += 1;

        let Some(article) = extract_figshare_ref(linkout) else {
            info!("Skipping linkout without a Figshare article id: {}", linkout);
            stats.skipped_rows += 1;
            progress.inc(1);
            continue;
        };

        let metrics = client.fetch_metrics(&article).await;
        match metrics {
            Some(m) => {
                views[row] = Some(m.views as i64);
                downloads[row] = Some(m.downloads as i64);
                shares[row] = Some(m.shares as i64);
                citations[row] = Some(m.citations as i64);
                stats.articles_fetched += 1;
            }
            None => {
                views[row] = None;
                downloads[row] = None;
                shares[row] = None;
                citations[row] = None;
                stats.articles_failed += 1;
            }
        }

        records.push(MetricsRecord::new(&article, linkout, metrics));
        progress.inc(1);

        // Pace outbound requests regardless of the fetch outcome
        if !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    let mut table = df;
    for (name, values) in METRIC_COLUMNS
        .iter()
        .zip([views, downloads, shares, citations])
    {
        table.with_column(Series::new((*name).into(), values))?;
    }

    Ok(EnrichOutcome {
        table,
        records,
        stats,
    })
}
