//! Compute quantity normalization
//!
//! Kubernetes quantities (`500m`, `512Mi`, `3Gi`) converted to the units
//! container apps expect: fractional cores and `Gi` with one decimal.

/// CPU cores used when a container declares none
pub const DEFAULT_CPU: f64 = 2.0;

/// Memory in Gi used when a container declares none
pub const DEFAULT_MEMORY_GI: f64 = 8.0;

/// Memory above which the consumption profile is not enough
pub const DEDICATED_MEMORY_THRESHOLD_GI: f64 = 8.0;

/// GPUs a single container may request
pub const MAX_GPUS_PER_CONTAINER: u32 = 4;

/// Why a memory quantity could not be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryIssue {
    /// Suffix other than `Mi`/`Gi`
    UnknownUnit,
    /// Right suffix, bad number
    Unparseable,
}

/// Parse a CPU quantity into cores
///
/// `m` means millicores; anything else is whole cores.
pub fn parse_cpu(quantity: &str) -> Option<f64> {
    let quantity = quantity.trim();
    let cores = match quantity.strip_suffix('m') {
        Some(millis) => millis.parse::<f64>().ok()? / 1000.0,
        None => quantity.parse::<f64>().ok()?,
    };
    (cores.is_finite() && cores >= 0.0).then_some(cores)
}

/// Parse a memory quantity into Gi, rounded to one decimal
pub fn parse_memory_gi(quantity: &str) -> Result<f64, MemoryIssue> {
    let quantity = quantity.trim();
    let (number, divisor) = if let Some(mi) = quantity.strip_suffix("Mi") {
        (mi, 1024.0)
    } else if let Some(gi) = quantity.strip_suffix("Gi") {
        (gi, 1.0)
    } else {
        return Err(MemoryIssue::UnknownUnit);
    };

    let value = number
        .trim()
        .parse::<f64>()
        .map_err(|_| MemoryIssue::Unparseable)?;
    if !value.is_finite() || value < 0.0 {
        return Err(MemoryIssue::Unparseable);
    }
    Ok(round_tenths(value / divisor))
}

/// Format Gi as `<N>.<D>Gi`
pub fn format_memory_gi(gi: f64) -> String {
    format!("{:.1}Gi", gi)
}

/// Ties go to the even tenth: `0.25` becomes `0.2`
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu() {
        assert_eq!(parse_cpu("500m"), Some(0.5));
        assert_eq!(parse_cpu("250m"), Some(0.25));
        assert_eq!(parse_cpu("2"), Some(2.0));
        assert_eq!(parse_cpu("0.75"), Some(0.75));
        assert_eq!(parse_cpu("abc"), None);
        assert_eq!(parse_cpu("m"), None);
        assert_eq!(parse_cpu("-1"), None);
        assert_eq!(parse_cpu("inf"), None);
    }

    #[test]
    fn test_memory_normalization() {
        assert_eq!(format_memory_gi(parse_memory_gi("512Mi").unwrap()), "0.5Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("2048Mi").unwrap()), "2.0Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("3Gi").unwrap()), "3.0Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("1.25Gi").unwrap()), "1.2Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("1.35Gi").unwrap()), "1.4Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("16384Mi").unwrap()), "16.0Gi");
    }

    #[test]
    fn test_memory_ties_round_to_even() {
        assert_eq!(format_memory_gi(parse_memory_gi("256Mi").unwrap()), "0.2Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("1280Mi").unwrap()), "1.2Gi");
        assert_eq!(format_memory_gi(parse_memory_gi("768Mi").unwrap()), "0.8Gi");
    }

    #[test]
    fn test_memory_issues() {
        assert_eq!(parse_memory_gi("1Ti"), Err(MemoryIssue::UnknownUnit));
        assert_eq!(parse_memory_gi("1073741824"), Err(MemoryIssue::UnknownUnit));
        assert_eq!(parse_memory_gi("lotsMi"), Err(MemoryIssue::Unparseable));
        assert_eq!(parse_memory_gi("-2Gi"), Err(MemoryIssue::Unparseable));
    }
}
