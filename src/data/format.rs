/// Magnitude labels applied after each division by 1000. Anything past the
/// last step is labelled " milhões" without further scaling.
const UNITS: [&str; 2] = ["", "mil"];
const MILLIONS: &str = " milhões";

/// Format a value for display, scaled into thousands or millions.
///
/// Output is `"{prefix} {value:.2}{unit}"`. The scaling only triggers for
/// values >= 1000, so negative values are always printed unscaled.
pub fn format_number(value: f64, prefix: &str) -> String {
    let mut value = value;
    for unit in UNITS {
        if value < 1000.0 {
            return format!("{prefix} {value:.2}{unit}");
        }
        value /= 1000.0;
    }
    format!("{prefix} {value:.2}{}", MILLIONS)
}

/// Format a count (no currency prefix)
pub fn format_count(count: usize) -> String {
    format_number(count as f64, "")
}
