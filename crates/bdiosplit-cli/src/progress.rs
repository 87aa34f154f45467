//! Progress feedback for split, inspect, check and scan-json
//!
//! Every helper takes `quiet` or an `Option<ProgressBar>` so that `--quiet`
//! (and `inspect --json`) silence all of it.

use bdiosplit_core::PartitionSummary;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// `1 partition`, `3 partitions`
pub fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Status line shown while partitions are being written
pub fn partition_message(summary: &PartitionSummary) -> String {
    format!(
        "Wrote {} ({}, {} backfilled, {})",
        summary.label,
        counted(summary.records, "record"),
        summary.backfilled,
        counted(summary.pages, "page")
    )
}

/// Create a spinner with a message
pub fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Bar over the partitions of a plan
pub fn partition_bar(partitions: usize, message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new(partitions as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} partitions")
            .expect("Invalid progress bar template")
            .progress_chars("█▓░"),
    );
    pb.set_message(message.to_string());
    Some(pb)
}

/// Show a written partition on the spinner
pub fn report_partition(pb: &Option<ProgressBar>, summary: &PartitionSummary) {
    if let Some(pb) = pb {
        pb.set_message(partition_message(summary));
    }
}

fn finish_with(pb: Option<ProgressBar>, template: &str, prefix: &'static str, message: &str) {
    if let Some(pb) = pb {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(template)
                .expect("Invalid finish template"),
        );
        pb.set_prefix(prefix);
        pb.finish_with_message(message.to_string());
    }
}

/// Finish a spinner or bar with a success message
pub fn finish_spinner(pb: Option<ProgressBar>, message: &str) {
    finish_with(pb, "{prefix:.green} {msg}", "✓", message);
}

/// Finish a spinner or bar with an error message
pub fn finish_spinner_error(pb: Option<ProgressBar>, message: &str) {
    finish_with(pb, "{prefix:.red} {msg}", "✗", message);
}
