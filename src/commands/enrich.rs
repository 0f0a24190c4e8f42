use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;
use polars::prelude::*;

use crate::cli::Cli;
use crate::common::{
    create_count_progress_bar, format_elapsed, setup_logging, MetricsRecord, FIGSHARE_MARKER,
    SOURCE_LINKOUT_COLUMN,
};
use crate::enrich::{enrich_table, ROW_PACING};
use crate::fetch::{RetryPolicy, StatsClient, STATS_BASE_URL};

pub fn run_enrich(args: Cli) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_enrich_async(args))
}

pub async fn run_enrich_async(args: Cli) -> Result<()> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting Figshare Metrics Enrichment");
    info!("Dataset: {}", args.input);
    info!("Metrics output: {}", args.metrics_output);
    info!("Max retries: {}", args.max_retries);
    info!("Timeout: {}s", args.timeout);

    if !Path::new(&args.input).exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", args.input));
    }

    let df = read_dataset(&args.input)?;
    info!("Loaded {} rows from {}", df.height(), args.input);

    let candidate_rows = count_figshare_rows(&df)?;
    info!("Rows with Figshare linkouts: {}", candidate_rows);

    let client = StatsClient::new(
        STATS_BASE_URL,
        Duration::from_secs(args.timeout),
        RetryPolicy::new(args.max_retries),
    )?;

    let progress = create_count_progress_bar(candidate_rows as u64);
    let mut outcome = enrich_table(df, &client, ROW_PACING, &progress).await?;
    progress.finish_with_message("Enrichment complete");

    write_dataset(&mut outcome.table, &args.input)?;

    let mut metrics_df = metrics_frame(&outcome.records)?;
    write_dataset(&mut metrics_df, &args.metrics_output)?;

    let stats = &outcome.stats;
    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Rows in dataset: {}", stats.total_rows);
    info!("Rows with Figshare linkouts: {}", stats.figshare_rows);
    info!("Rows skipped (no article id): {}", stats.skipped_rows);
    info!("Articles fetched: {}", stats.articles_fetched);
    info!("Articles failed: {}", stats.articles_failed);
    info!("Updated dataset: {}", args.input);
    info!("Metrics output: {}", args.metrics_output);
    info!("========================================================");

    Ok(())
}

fn read_dataset(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to open input file: {}", path))?
        .finish()
        .with_context(|| format!("Failed to parse CSV: {}", path))
}

fn write_dataset(df: &mut DataFrame, path: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create output file: {}", path))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV: {}", path))?;
    Ok(())
}

fn count_figshare_rows(df: &DataFrame) -> Result<usize> {
    let linkouts = df
        .column(SOURCE_LINKOUT_COLUMN)
        .with_context(|| format!("Input dataset has no '{}' column", SOURCE_LINKOUT_COLUMN))?
        .str()
        .with_context(|| format!("'{}' column is not a string column", SOURCE_LINKOUT_COLUMN))?;
    Ok(linkouts
        .into_iter()
        .filter(|value| value.is_some_and(|v| v.contains(FIGSHARE_MARKER)))
        .count())
}

fn metrics_frame(records: &[MetricsRecord]) -> Result<DataFrame> {
    let df = df!(
        "host_site" => records.iter().map(|r| r.host_site.as_str()).collect::<Vec<_>>(),
        "article_id" => records.iter().map(|r| r.article_id.as_str()).collect::<Vec<_>>(),
        "source_linkout" => records.iter().map(|r| r.source_linkout.as_str()).collect::<Vec<_>>(),
        "views" => records.iter().map(|r| r.views.map(|v| v as i64)).collect::<Vec<_>>(),
        "downloads" => records.iter().map(|r| r.downloads.map(|v| v as i64)).collect::<Vec<_>>(),
        "shares" => records.iter().map(|r| r.shares.map(|v| v as i64)).collect::<Vec<_>>(),
        "citations" => records.iter().map(|r| r.citations.map(|v| v as i64)).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ArticleMetrics, FigshareRef};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_records() -> Vec<MetricsRecord> {
        let tandf = FigshareRef {
            host_site: "tandf".to_string(),
            article_id: "9999".to_string(),
        };
        let plos = FigshareRef {
            host_site: "plos".to_string(),
            article_id: "8888".to_string(),
        };
        vec![
            MetricsRecord::new(
                &tandf,
                "https://tandf.figshare.com/articles/9999",
                Some(ArticleMetrics {
                    views: 10,
                    downloads: 5,
                    shares: 0,
                    citations: 0,
                }),
            ),
            MetricsRecord::new(&plos, "https://plos.figshare.com/articles/8888", None),
        ]
    }

    #[test]
    fn test_metrics_frame_shape_and_values() {
        let df = metrics_frame(&sample_records()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names_str(),
            vec![
                "host_site",
                "article_id",
                "source_linkout",
                "views",
                "downloads",
                "shares",
                "citations"
            ]
        );
        assert_eq!(
            df.column("views").unwrap().i64().unwrap().to_vec(),
            vec![Some(10), None]
        );
        assert_eq!(
            df.column("host_site").unwrap().str().unwrap().get(1),
            Some("plos")
        );
    }

    #[test]
    fn test_metrics_frame_without_records_keeps_the_header() {
        let df = metrics_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 7);
    }

    #[test]
    fn test_read_and_write_dataset_round_trip() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "Title,Source linkout").unwrap();
        writeln!(input, "Paper A,https://tandf.figshare.com/articles/1").unwrap();
        writeln!(input, "Paper B,").unwrap();
        input.flush().unwrap();

        let mut df = read_dataset(input.path().to_str().unwrap()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(count_figshare_rows(&df).unwrap(), 1);

        let output = NamedTempFile::new().unwrap();
        write_dataset(&mut df, output.path().to_str().unwrap()).unwrap();

        let written = std::fs::read_to_string(output.path()).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("Title,Source linkout"));
        assert_eq!(
            lines.next(),
            Some("Paper A,https://tandf.figshare.com/articles/1")
        );
        assert_eq!(lines.next(), Some("Paper B,"));
    }

    #[test]
    fn test_count_figshare_rows_requires_the_linkout_column() {
        let df = df!("Title" => ["x"]).unwrap();
        let err = count_figshare_rows(&df).unwrap_err();
        assert!(err.to_string().contains(SOURCE_LINKOUT_COLUMN));
    }
}
