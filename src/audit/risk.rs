//! Deterministic risk index.
//!
//! `severity * 10` plus fixed bonuses per hazard flag, capped at 100.
//! Out-of-range severities are not rejected; negatives count as zero.

use crate::models::{HazardFlags, RiskData, Urgency};

const NEAR_SCHOOL: i64 = 20;
const HEAVY_TRAFFIC: i64 = 15;
const WATER_LEAK: i64 = 10;
const MONSOON_CRITICAL: i64 = 25;

pub fn score(severity: i64, flags: &HazardFlags) -> RiskData {
    let mut total = severity.max(0).saturating_mul(10);
    if flags.near_school {
        total = total.saturating_add(NEAR_SCHOOL);
    }
    if flags.heavy_traffic {
        total = total.saturating_add(HEAVY_TRAFFIC);
    }
    if flags.water_leak {
        total = total.saturating_add(WATER_LEAK);
    }
    if flags.monsoon_critical {
        total = total.saturating_add(MONSOON_CRITICAL);
    }
    let risk_index = total.min(100) as u8;
    RiskData { risk_index, urgency: urgency_for(risk_index) }
}

pub fn urgency_for(risk_index: u8) -> Urgency {
    match risk_index {
        80..=u8::MAX => Urgency::Critical,
        50..=79 => Urgency::High,
        _ => Urgency::Moderate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(school: bool, traffic: bool, leak: bool, monsoon: bool) -> HazardFlags {
        HazardFlags {
            near_school: school,
            heavy_traffic: traffic,
            water_leak: leak,
            monsoon_critical: monsoon,
        }
    }

    #[test]
    fn school_and_monsoon_saturate_to_critical() {
        let r = score(7, &flags(true, false, false, true));
        assert_eq!(r.risk_index, 100);
        assert_eq!(r.urgency, Urgency::Critical);
    }

    #[test]
    fn low_severity_without_flags_is_moderate() {
        let r = score(3, &HazardFlags::default());
        assert_eq!(r, RiskData { risk_index: 30, urgency: Urgency::Moderate });
    }

    #[test]
    fn heavy_traffic_adds_fifteen() {
        let r = score(6, &flags(false, true, false, false));
        assert_eq!(r, RiskData { risk_index: 75, urgency: Urgency::High });
    }

    #[test]
    fn water_leak_adds_ten() {
        assert_eq!(score(4, &flags(false, false, true, false)).risk_index, 50);
    }

    #[test]
    fn urgency_boundaries() {
        assert_eq!(urgency_for(80), Urgency::Critical);
        assert_eq!(urgency_for(79), Urgency::High);
        assert_eq!(urgency_for(50), Urgency::High);
        assert_eq!(urgency_for(49), Urgency::Moderate);
        assert_eq!(urgency_for(0), Urgency::Moderate);
    }

    #[test]
    fn same_input_same_output_over_whole_domain() {
        for severity in 1..=10 {
            for bits in 0u8..16 {
                let f = flags(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
                let a = score(severity, &f);
                assert_eq!(a, score(severity, &f));
                assert!(a.risk_index <= 100);
            }
        }
    }

    // Permissive inputs: nothing is rejected, out-of-range values are absorbed.
    #[test]
    fn negative_severity_counts_as_zero() {
        assert_eq!(score(-4, &HazardFlags::default()).risk_index, 0);
        assert_eq!(score(-4, &flags(false, true, false, false)).risk_index, 15);
    }

    #[test]
    fn oversized_severity_is_capped() {
        let r = score(i64::MAX, &HazardFlags::default());
        assert_eq!(r, RiskData { risk_index: 100, urgency: Urgency::Critical });
    }

    #[test]
    fn missing_metadata_keys_are_false() {
        let partial = HazardFlags::from_value(&serde_json::json!({"near_school": true}));
        assert_eq!(score(5, &partial).risk_index, 70);
        let empty = HazardFlags::from_value(&serde_json::json!(null));
        assert_eq!(score(5, &empty).risk_index, 50);
    }
}
