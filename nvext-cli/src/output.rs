//! Cargo-style output formatting

/// ANSI color codes
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD_GREEN: &str = "\x1b[1;32m";
    pub const BOLD_CYAN: &str = "\x1b[1;36m";
    pub const BOLD_YELLOW: &str = "\x1b[1;33m";
    pub const BOLD_RED: &str = "\x1b[1;31m";
}

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err() && std::env::var("TERM").map(|t| t != "dumb").unwrap_or(true)
}

/// Print a status message in cargo style
/// Format: "   {status} {message}"
fn print_status(status: &str, color: &str, message: &str) {
    if supports_color() {
        eprintln!("{}{:>12}{} {}", color, status, colors::RESET, message);
    } else {
        eprintln!("{:>12} {}", status, message);
    }
}

pub fn compiling(message: &str) {
    print_status("Compiling", colors::BOLD_GREEN, message);
}

pub fn linked(message: &str) {
    print_status("Linked", colors::BOLD_GREEN, message);
}

pub fn finished(message: &str) {
    print_status("Finished", colors::BOLD_GREEN, message);
}

pub fn loading(message: &str) {
    print_status("Loading", colors::BOLD_CYAN, message);
}

pub fn skipping(message: &str) {
    print_status("Skipping", colors::BOLD_YELLOW, message);
}

pub fn error(message: &str) {
    print_status("Error", colors::BOLD_RED, message);
}

/// Format duration in human readable form
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let secs = secs % 60.0;
        format!("{:.0}m {:.2}s", mins, secs)
    }
}
