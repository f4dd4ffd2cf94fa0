//! Deterministic threshold classifications.
//!
//! The metrics producer labels figures with these rules; the consistency
//! check recomputes them to catch labels that drifted from their raw values.

use std::collections::BTreeMap;

/// Window preference when judging overall performance, longest first
pub const RETURN_WINDOW_ORDER: [&str; 6] = ["1Y", "6M", "3M", "1M", "1W", "1D"];

/// Annualized volatility: low < 20% <= moderate <= 35% < high
pub fn classify_vol_level(ann_vol: f64) -> &'static str {
    if ann_vol < 0.20 {
        "low"
    } else if ann_vol <= 0.35 {
        "moderate"
    } else {
        "high"
    }
}

/// Top-5 holder concentration: low < 25% <= moderate <= 40% < high
pub fn classify_cr5(cr5: f64) -> &'static str {
    if cr5 < 0.25 {
        "low"
    } else if cr5 <= 0.40 {
        "moderate"
    } else {
        "high"
    }
}

/// Herfindahl index: low < 0.10 <= moderate <= 0.18 < high
pub fn classify_hhi(hhi: f64) -> &'static str {
    if hhi < 0.10 {
        "low"
    } else if hhi <= 0.18 {
        "moderate"
    } else {
        "high"
    }
}

/// Overall performance of a single return
pub fn classify_return(value: f64) -> &'static str {
    if value > 0.20 {
        "strong"
    } else if value > 0.05 {
        "positive"
    } else if value > -0.05 {
        "flat"
    } else if value > -0.20 {
        "negative"
    } else {
        "poor"
    }
}

/// Overall label judged on the longest available window
///
/// Returns `(window, return, label)`, or `None` when no preferred window has
/// a value.
pub fn classify_return_overall(
    raw: &BTreeMap<String, Option<f64>>,
) -> Option<(&'static str, f64, &'static str)> {
    RETURN_WINDOW_ORDER.iter().find_map(|window| {
        raw.get(*window)
            .copied()
            .flatten()
            .map(|value| (*window, value, classify_return(value)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vol_thresholds() {
        assert_eq!(classify_vol_level(0.1999), "low");
        assert_eq!(classify_vol_level(0.20), "moderate");
        assert_eq!(classify_vol_level(0.35), "moderate");
        assert_eq!(classify_vol_level(0.3501), "high");
    }

    #[test]
    fn test_concentration_thresholds() {
        assert_eq!(classify_cr5(0.24), "low");
        assert_eq!(classify_cr5(0.40), "moderate");
        assert_eq!(classify_cr5(0.41), "high");
        assert_eq!(classify_hhi(0.05), "low");
        assert_eq!(classify_hhi(0.18), "moderate");
        assert_eq!(classify_hhi(0.25), "high");
    }

    #[test]
    fn test_return_overall_prefers_longest_window() {
        let raw: BTreeMap<String, Option<f64>> = [
            ("1M".to_string(), Some(0.02)),
            ("1Y".to_string(), Some(0.285)),
            ("6M".to_string(), None),
        ]
        .into_iter()
        .collect();

        assert_eq!(classify_return_overall(&raw), Some(("1Y", 0.285, "strong")));
    }

    #[test]
    fn test_return_overall_skips_missing() {
        let raw: BTreeMap<String, Option<f64>> =
            [("1Y".to_string(), None), ("1W".to_string(), Some(-0.07))]
                .into_iter()
                .collect();
        assert_eq!(classify_return_overall(&raw), Some(("1W", -0.07, "negative")));
        assert_eq!(classify_return_overall(&BTreeMap::new()), None);
    }
}
