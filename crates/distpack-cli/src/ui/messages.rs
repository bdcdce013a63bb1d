//! Status lines on stderr.

use owo_colors::OwoColorize;

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning in yellow.
///
/// ```no_run
/// use distpack_cli::ui::warning;
///
/// warning("No package.json found. Using current directory: /tmp/app");
/// ```
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        success("Build completed in 1.20s");
        info("Building 7 targets");
        warning("No package.json found");
    }
}
