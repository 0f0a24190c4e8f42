use std::time::Duration;

/// Human-readable elapsed time for the final summary
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    if total_secs >= 3600 {
        format!(
            "{}h {:02}m {:02}s",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        )
    } else if total_secs >= 60 {
        format!("{}m {:02}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
