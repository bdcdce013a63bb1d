//! Formatting utilities for sizes, durations and the build listing.

use distpack_pipeline::ListingEntry;
use std::time::Duration;

/// Format a byte count the way npm tooling prints bundle sizes.
///
/// Binary units, at most two decimals, trailing zeros dropped, no space.
///
/// # Examples
///
/// ```
/// use distpack_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0B");
/// assert_eq!(format_size(500), "500B");
/// assert_eq!(format_size(1024), "1KB");
/// assert_eq!(format_size(1536), "1.5KB");
/// assert_eq!(format_size(1_048_576), "1MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    let mut number = format!("{:.2}", size);
    while number.ends_with('0') {
        number.pop();
    }
    if number.ends_with('.') {
        number.pop();
    }

    format!("{}{}", number, UNITS[unit_idx])
}

/// Format a duration as `ms`, seconds, or `m s`.
///
/// ```
/// use std::time::Duration;
/// use distpack_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One listing line: `✓ dist/ncc/cli.js (12.3KB)`.
pub fn listing_line(entry: &ListingEntry) -> String {
    format!("✓ {} ({})", entry.path.display(), format_size(entry.size))
}

/// Print the written JavaScript files to stdout.
pub fn print_listing(entries: &[ListingEntry]) {
    for entry in entries {
        println!("{}", listing_line(entry));
    }
}
