//! Human-readable file sizes using binary (1024-based) units.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with two decimals in the smallest unit whose scaled
/// value is below 1024. TB takes any remaining magnitude unscaled.
///
/// # Examples
/// ```
/// use filedrop::files::format_size;
/// assert_eq!(format_size(500), "500.00 B");
/// assert_eq!(format_size(2048), "2.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;

    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }

    format!("{value:.2} {}", UNITS[UNITS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    #[test]
    fn test_bytes() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(500), "500.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_size(KB), "1.00 KB");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(MB + MB / 2), "1.50 MB");
        assert_eq!(format_size(GB), "1.00 GB");
        assert_eq!(format_size(3 * TB), "3.00 TB");
    }

    #[test]
    fn test_terabytes_absorb_large_values() {
        assert_eq!(format_size(2048 * TB), "2048.00 TB");
        assert!(format_size(u64::MAX).ends_with(" TB"));
    }
}
