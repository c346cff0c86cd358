const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Base-1024 size formatting, two decimals above the byte tier.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let tier = (((bytes as f64).ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(tier as i32);
    if tier == 0 {
        format!("{value:.0} {}", UNITS[tier])
    } else {
        format!("{value:.2} {}", UNITS[tier])
    }
}
