// ── Reading classification ──
//
// Two-stage lookup: a per-metric threshold table turns a raw reading into
// a label plus severity, then a shared severity table turns severity into
// a display tier. Tables are ordered by descending `min`; the first row
// whose `min` the value meets wins, and every table ends in a `-inf`
// catch-all so lookup is total over all finite inputs (NaN included is
// not a concern; readings are finite by construction).

use serde::Serialize;

/// One row of a classification table.
#[derive(Debug, Clone, Copy)]
pub struct Threshold {
    /// Inclusive lower bound for this band.
    pub min: f64,
    pub label: &'static str,
    pub severity: i8,
}

/// How prominently a classified reading should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTier {
    Normal,
    Notice,
    Warning,
    Critical,
}

/// A classified reading: band label, raw severity, and display tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub label: &'static str,
    pub severity: i8,
    pub tier: DisplayTier,
}

// ── Per-metric tables ────────────────────────────────────────────────

pub const SOIL_THRESHOLDS: &[Threshold] = &[
    Threshold { min: 81.0, label: "Flooded", severity: 3 },
    Threshold { min: 71.0, label: "Very Humid", severity: 2 },
    Threshold { min: 51.0, label: "Humid", severity: 1 },
    Threshold { min: 31.0, label: "Comfortable", severity: 0 },
    Threshold { min: 11.0, label: "Very Dry", severity: 2 },
    Threshold { min: 0.0, label: "Extremely Arid", severity: 3 },
    Threshold { min: f64::NEG_INFINITY, label: "Extremely Arid", severity: 3 },
];

pub const TEMPERATURE_THRESHOLDS: &[Threshold] = &[
    Threshold { min: 41.0, label: "Dangerously Hot", severity: 3 },
    Threshold { min: 31.0, label: "Very Hot", severity: 2 },
    Threshold { min: 25.0, label: "Warm", severity: 1 },
    Threshold { min: 18.0, label: "Cool / Mild", severity: 0 },
    Threshold { min: 10.0, label: "Cold", severity: 1 },
    Threshold { min: 0.0, label: "Very Cold", severity: 2 },
    Threshold { min: -10.0, label: "Severe Cold", severity: 3 },
    Threshold { min: f64::NEG_INFINITY, label: "Extreme Cold", severity: 3 },
];

pub const HUMIDITY_THRESHOLDS: &[Threshold] = &[
    Threshold { min: 71.0, label: "Very Humid", severity: 2 },
    Threshold { min: 61.0, label: "Humid", severity: 1 },
    Threshold { min: 31.0, label: "Comfortable", severity: 0 },
    Threshold { min: 11.0, label: "Very Dry", severity: 2 },
    Threshold { min: 0.0, label: "Extremely Arid", severity: 3 },
    Threshold { min: f64::NEG_INFINITY, label: "Extremely Arid", severity: 3 },
];

pub const LIGHT_THRESHOLDS: &[Threshold] = &[
    Threshold { min: 10_001.0, label: "Full Sun", severity: 2 },
    Threshold { min: 5001.0, label: "High Light", severity: 1 },
    Threshold { min: 2001.0, label: "Medium Light", severity: 0 },
    Threshold { min: 501.0, label: "Low Light", severity: 1 },
    Threshold { min: f64::NEG_INFINITY, label: "Very Low", severity: 3 },
];

// Severity -> display tier, same shape as the metric tables.
const TIER_THRESHOLDS: &[(i8, DisplayTier)] = &[
    (3, DisplayTier::Critical),
    (2, DisplayTier::Warning),
    (1, DisplayTier::Notice),
    (0, DisplayTier::Normal),
    (i8::MIN, DisplayTier::Normal),
];

/// Classify a reading against a threshold table.
///
/// The table must end in a `-inf` row; all the built-in tables do, so
/// lookup always succeeds.
pub fn classify(table: &[Threshold], value: f64) -> Classification {
    let row = table
        .iter()
        .find(|t| value >= t.min)
        .unwrap_or(&table[table.len() - 1]);

    let tier = TIER_THRESHOLDS
        .iter()
        .find(|(min, _)| row.severity >= *min)
        .map_or(DisplayTier::Normal, |(_, tier)| *tier);

    Classification {
        label: row.label,
        severity: row.severity,
        tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_band_wins() {
        let c = classify(SOIL_THRESHOLDS, 85.0);
        assert_eq!(c.label, "Flooded");
        assert_eq!(c.severity, 3);
        assert_eq!(c.tier, DisplayTier::Critical);
    }

    #[test]
    fn band_minimum_is_inclusive() {
        assert_eq!(classify(TEMPERATURE_THRESHOLDS, 31.0).label, "Very Hot");
        assert_eq!(classify(SOIL_THRESHOLDS, 31.0).label, "Comfortable");
    }

    #[test]
    fn negative_values_fall_through_to_catch_all() {
        let c = classify(SOIL_THRESHOLDS, -5.0);
        assert_eq!(c.label, "Extremely Arid");
        assert_eq!(c.severity, 3);
    }

    #[test]
    fn temperature_has_cold_gradations() {
        assert_eq!(classify(TEMPERATURE_THRESHOLDS, -3.0).label, "Severe Cold");
        assert_eq!(classify(TEMPERATURE_THRESHOLDS, -40.0).label, "Extreme Cold");
        assert_eq!(classify(TEMPERATURE_THRESHOLDS, 5.0).label, "Very Cold");
    }

    #[test]
    fn comfortable_greenhouse_reads_all_normal() {
        let checks = [
            (SOIL_THRESHOLDS, 45.0),
            (TEMPERATURE_THRESHOLDS, 22.0),
            (HUMIDITY_THRESHOLDS, 55.0),
            (LIGHT_THRESHOLDS, 2500.0),
        ];
        for (table, value) in checks {
            let c = classify(table, value);
            assert_eq!(c.severity, 0, "value {value} should be comfortable");
            assert_eq!(c.tier, DisplayTier::Normal);
        }
    }

    #[test]
    fn light_has_no_zero_floor() {
        // Darkness is a critical condition, not a clamp.
        let c = classify(LIGHT_THRESHOLDS, 0.0);
        assert_eq!(c.label, "Very Low");
        assert_eq!(c.tier, DisplayTier::Critical);
    }

    #[test]
    fn every_table_ends_in_catch_all() {
        for table in [
            SOIL_THRESHOLDS,
            TEMPERATURE_THRESHOLDS,
            HUMIDITY_THRESHOLDS,
            LIGHT_THRESHOLDS,
        ] {
            assert_eq!(table[table.len() - 1].min, f64::NEG_INFINITY);
            let mut prev = f64::INFINITY;
            for row in table {
                assert!(row.min < prev, "table must be strictly descending");
                prev = row.min;
            }
        }
    }
}
