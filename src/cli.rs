use clap::Parser;

#[derive(Parser)]
#[command(name = "figshare-metrics-enrichment")]
#[command(about = "Enrich Dimensions article exports with Figshare usage statistics")]
#[command(version = "1.0.0")]
pub struct Cli {
    /// Dataset CSV with a 'Source linkout' column; metric columns are written back in place
    #[arg(short, long, default_value = "Updated_Dimensions_Dataset.csv")]
    pub input: String,

    /// Output CSV with one row per looked-up article
    #[arg(short, long, default_value = "Figshare_Metrics.csv")]
    pub metrics_output: String,

    /// Attempts per article before recording null metrics
    #[arg(long, default_value = "3")]
    pub max_retries: usize,

    /// Timeout in seconds per stats request
    #[arg(short, long, default_value = "15")]
    pub timeout: u64,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}
