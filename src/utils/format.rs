//! Human-readable number formatting for the dashboard page

/// Format an amount as dollars with a B/M/K suffix
pub fn format_currency(amount: f64, precision: usize) -> String {
    if amount >= 1_000_000_000.0 {
        format!("${:.*}B", precision, amount / 1_000_000_000.0)
    } else if amount >= 1_000_000.0 {
        format!("${:.*}M", precision, amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.*}K", precision, amount / 1_000.0)
    } else {
        format!("${:.*}", precision, amount)
    }
}

/// Format a share count with one decimal and a B/M/K suffix
pub fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if volume >= 1_000_000_000 {
        format!("{:.1}B", v / 1_000_000_000.0)
    } else if volume >= 1_000_000 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if volume >= 1_000 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        volume.to_string()
    }
}
