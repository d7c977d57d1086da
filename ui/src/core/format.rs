//! Formatting helpers for the results grid.

/// Scalar result fields show six decimal places.
pub fn format_value(value: f64) -> String {
    format!("{value:.6}")
}

/// Array elements are shorter: three decimal places, comma-joined.
pub fn format_array(values: &[f64]) -> String {
    let joined = values
        .iter()
        .map(|v| format!("{v:.3}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

pub fn format_mapping_entry(label: &str, value: f64) -> String {
    format!("{label}: {value:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_precision() {
        assert_eq!(format_value(1.5), "1.500000");
        assert_eq!(format_value(0.123456789), "0.123457");
    }

    #[test]
    fn array_precision_and_brackets() {
        assert_eq!(format_array(&[1.0, 2.3456]), "[1.000, 2.346]");
        assert_eq!(format_array(&[]), "[]");
    }

    #[test]
    fn mapping_entry_layout() {
        assert_eq!(format_mapping_entry("sensor_a", 2.0), "sensor_a: 2.000");
    }
}
