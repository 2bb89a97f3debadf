//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, ProcessingStats};

/// Logs the final counters of a run followed by the per-category skip counts.
pub fn print_final_statistics(stats: &ProcessingStats, elapsed_seconds: f64) {
    let received = stats.received();
    info!(
        "✅ Received {} message{} ({} stored, {} skipped) in {:.1}s",
        received,
        if received == 1 { "" } else { "s" },
        stats.stored(),
        stats.total_skipped(),
        elapsed_seconds
    );
    print_error_statistics(stats);
}

/// Prints skipped-message counts by category.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total = stats.total_skipped();
    if total == 0 {
        return;
    }

    info!("Skipped Messages ({} total):", total);
    for error_type in ErrorType::iter() {
        let count = stats.get_error_count(error_type);
        if count > 0 {
            info!("   {}: {}", error_type.as_str(), count);
        }
    }
}
