//! Hard slowdown rules: the deterministic half of the slowdown decision.
//!
//! Three quantitative criteria vote on whether a post-earnings surge is
//! exhausting. A majority (2 of 3) passes; unanimity is not required, so a
//! single noisy signal cannot block or force the verdict. The AI opinion is
//! fused with this verdict by the pipeline, never inside it.

use serde::Serialize;

/// Thresholds for the three hard rules. Defaults mirror the shipped
/// configuration; tune after back-testing.
#[derive(Debug, Clone)]
pub struct SlowdownThresholds {
    /// Rule 1: max absolute 5-min price move (%) that still counts as "slowing".
    pub momentum_max_move_pct: f64,
    /// Rule 2: newest volume must be down at least this fraction vs the
    /// prior six-bar average (0.4 = 40% drop).
    pub volume_drop_fraction: f64,
    /// Rule 3: minimum pullback (%) from the surge peak.
    pub pullback_min_pct: f64,
}

impl Default for SlowdownThresholds {
    fn default() -> Self {
        Self {
            momentum_max_move_pct: 0.3,
            volume_drop_fraction: 0.4,
            pullback_min_pct: 1.5,
        }
    }
}

/// Deterministic verdict over one intraday price/volume window.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct HardRuleVerdict {
    pub rule1_momentum_slow: bool,
    pub rule2_volume_drop: bool,
    pub rule3_pullback: bool,
    /// Reference peak the pullback rule measured against.
    pub surge_peak_used: f64,
    pub rules_met: u8,
    /// Majority vote: at least 2 of 3 rules fired.
    pub passed: bool,
}

/// Identify the intraday surge high: the maximum of the most recent six
/// bars (all bars if fewer), 0.0 for an empty window.
///
/// This is the single most strategy-sensitive function in the system: the
/// peak it picks is the reference point for every pullback measurement. The
/// lookback and aggregation are intentionally simple; a momentum-reversal or
/// volume-weighted variant can replace it without changing the contract
/// (price sequence in, one reference price out).
pub fn find_surge_peak(prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    let start = prices.len().saturating_sub(6);
    prices[start..]
        .iter()
        .copied()
        .fold(f64::MIN, f64::max)
        .max(0.0)
}

/// Evaluate the three hard rules over a 5-minute bar window.
///
/// Rule 1, momentum slow: |last bar-over-bar change| below the momentum
/// threshold. Needs at least 2 prices with a non-zero prior bar.
/// Rule 2, volume drop: newest volume down at least `volume_drop_fraction`
/// vs the mean of the prior six bars. Needs at least 7 volume samples.
/// Rule 3, pullback: current price at least `pullback_min_pct` below the
/// surge peak. Needs a positive peak and a positive current price.
///
/// Total function: short or malformed windows simply leave rules unmet.
pub fn evaluate_hard_rules(
    prices: &[f64],
    volumes: &[f64],
    current_price: f64,
    thresholds: &SlowdownThresholds,
) -> HardRuleVerdict {
    let surge_peak = find_surge_peak(prices);

    let mut rule1 = false;
    if prices.len() >= 2 {
        let prior = prices[prices.len() - 2];
        if prior != 0.0 {
            let last_move = ((prices[prices.len() - 1] - prior) / prior * 100.0).abs();
            rule1 = last_move < thresholds.momentum_max_move_pct;
        }
    }

    let mut rule2 = false;
    if volumes.len() >= 7 {
        let prior = &volumes[volumes.len() - 7..volumes.len() - 1];
        let prior_avg = prior.iter().sum::<f64>() / prior.len() as f64;
        if prior_avg > 0.0 {
            let drop = (prior_avg - volumes[volumes.len() - 1]) / prior_avg;
            rule2 = drop >= thresholds.volume_drop_fraction;
        }
    }

    let mut rule3 = false;
    if surge_peak > 0.0 && current_price > 0.0 {
        let pullback = (surge_peak - current_price) / surge_peak * 100.0;
        rule3 = pullback >= thresholds.pullback_min_pct;
    }

    let rules_met = rule1 as u8 + rule2 as u8 + rule3 as u8;
    HardRuleVerdict {
        rule1_momentum_slow: rule1,
        rule2_volume_drop: rule2,
        rule3_pullback: rule3,
        surge_peak_used: surge_peak,
        rules_met,
        passed: rules_met >= 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> SlowdownThresholds {
        SlowdownThresholds::default()
    }

    #[test]
    fn test_peak_empty_window() {
        assert_eq!(find_surge_peak(&[]), 0.0);
    }

    #[test]
    fn test_peak_single_sample() {
        assert_eq!(find_surge_peak(&[215.5]), 215.5);
    }

    #[test]
    fn test_peak_uses_last_six_not_global_max() {
        // Global max 230.0 sits outside the 6-bar lookback.
        let prices = [230.0, 210.0, 211.0, 212.0, 213.0, 214.0, 215.0, 216.0];
        assert_eq!(find_surge_peak(&prices), 216.0);
    }

    #[test]
    fn test_peak_short_window_uses_all() {
        let prices = [220.0, 210.0, 205.0];
        assert_eq!(find_surge_peak(&prices), 220.0);
    }

    #[test]
    fn test_flat_series_fires_rule1_only() {
        // Strictly flat 12-bar series: momentum is zero (rule 1), there is no
        // pullback from the peak (rule 3 false). One low-volume tail bar vs a
        // flat prior average is a 50% drop, above the default 40% fraction.
        let prices = [210.0; 12];
        let volumes = [
            1_000_000.0, 1_000_000.0, 1_000_000.0, 1_000_000.0, 1_000_000.0, 1_000_000.0,
            1_000_000.0, 1_000_000.0, 1_000_000.0, 1_000_000.0, 1_000_000.0, 500_000.0,
        ];
        let verdict = evaluate_hard_rules(&prices, &volumes, 210.0, &thresholds());
        assert!(verdict.rule1_momentum_slow);
        assert!(verdict.rule2_volume_drop);
        assert!(!verdict.rule3_pullback);
        assert_eq!(verdict.rules_met, 2);
        assert!(verdict.passed);
    }

    #[test]
    fn test_volume_rule_needs_seven_samples() {
        let prices = [210.0; 6];
        let volumes = [1_000_000.0, 1_000_000.0, 1_000_000.0, 400_000.0];
        let verdict = evaluate_hard_rules(&prices, &volumes, 210.0, &thresholds());
        assert!(!verdict.rule2_volume_drop);
    }

    #[test]
    fn test_pullback_rule() {
        // Peak 216, current 212 -> 1.85% pullback, above the 1.5% minimum.
        let prices = [208.0, 210.0, 213.0, 216.0, 214.0, 212.0];
        let verdict = evaluate_hard_rules(&prices, &[], 212.0, &thresholds());
        assert!(verdict.rule3_pullback);
        assert_eq!(verdict.surge_peak_used, 216.0);
    }

    #[test]
    fn test_fast_move_fails_rule1() {
        // 1% bar-over-bar move is well above the 0.3% momentum ceiling.
        let prices = [210.0, 212.1];
        let verdict = evaluate_hard_rules(&prices, &[], 212.1, &thresholds());
        assert!(!verdict.rule1_momentum_slow);
    }

    #[test]
    fn test_empty_input_meets_nothing() {
        let verdict = evaluate_hard_rules(&[], &[], 0.0, &thresholds());
        assert_eq!(verdict.rules_met, 0);
        assert!(!verdict.passed);
        assert_eq!(verdict.surge_peak_used, 0.0);
    }

    #[test]
    fn test_idempotent_on_same_input() {
        let prices = [208.0, 210.0, 213.0, 216.0, 214.0, 212.0];
        let volumes = [9e5, 9e5, 9e5, 9e5, 9e5, 9e5, 4e5];
        let a = evaluate_hard_rules(&prices, &volumes, 212.0, &thresholds());
        let b = evaluate_hard_rules(&prices, &volumes, 212.0, &thresholds());
        assert_eq!(a.rules_met, b.rules_met);
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.surge_peak_used, b.surge_peak_used);
    }
}
