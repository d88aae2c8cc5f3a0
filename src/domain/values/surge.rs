//! Surge detection and broad-market health checks.
//!
//! Both functions are total and fail closed: malformed or missing input
//! always produces the "no trade" verdict rather than an error.

use serde::Serialize;

/// Result of comparing the current price against the pre-earnings baseline.
#[derive(Debug, Clone, Serialize)]
pub struct SurgeCheck {
    pub surging: bool,
    /// Percent rise above the baseline, e.g. 8.0 = +8%.
    pub surge_pct: f64,
    pub current_price: f64,
    pub baseline_price: f64,
}

/// Check whether the stock has surged at least `threshold_pct` above the
/// pre-earnings baseline close. Non-positive prices on either side fail
/// closed (`surging = false`, `surge_pct = 0.0`).
pub fn evaluate_surge(current_price: f64, baseline_price: f64, threshold_pct: f64) -> SurgeCheck {
    if baseline_price <= 0.0 || current_price <= 0.0 {
        return SurgeCheck {
            surging: false,
            surge_pct: 0.0,
            current_price: current_price.max(0.0),
            baseline_price,
        };
    }

    let surge_pct = (current_price - baseline_price) / baseline_price * 100.0;
    SurgeCheck {
        surging: surge_pct >= threshold_pct,
        surge_pct,
        current_price,
        baseline_price,
    }
}

/// Day-over-day change of one tracked index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexChange {
    pub symbol: String,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketHealth {
    pub healthy: bool,
    pub changes: Vec<IndexChange>,
}

/// Healthy iff every tracked index is down less than 2% on the day.
/// The boundary is exclusive: a change of exactly -2.0% counts as unhealthy.
/// A weak broad market raises short-squeeze risk, so the gate is strict.
pub fn evaluate_market_health(changes: Vec<IndexChange>) -> MarketHealth {
    let healthy = !changes.is_empty() && changes.iter().all(|c| c.change_pct > -2.0);
    MarketHealth { healthy, changes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(pairs: &[(&str, f64)]) -> Vec<IndexChange> {
        pairs
            .iter()
            .map(|(s, c)| IndexChange {
                symbol: s.to_string(),
                change_pct: *c,
            })
            .collect()
    }

    #[test]
    fn test_surge_at_threshold() {
        // $200 -> $216 is exactly 8%
        let check = evaluate_surge(216.0, 200.0, 8.0);
        assert!(check.surging);
        assert!((check.surge_pct - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_surge_below_threshold() {
        let check = evaluate_surge(210.0, 200.0, 8.0);
        assert!(!check.surging);
        assert!((check.surge_pct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_surge_zero_baseline_fails_closed() {
        let check = evaluate_surge(216.0, 0.0, 8.0);
        assert!(!check.surging);
        assert_eq!(check.surge_pct, 0.0);
    }

    #[test]
    fn test_surge_zero_current_fails_closed() {
        let check = evaluate_surge(0.0, 200.0, 8.0);
        assert!(!check.surging);
        assert_eq!(check.surge_pct, 0.0);
    }

    #[test]
    fn test_surge_negative_move() {
        let check = evaluate_surge(190.0, 200.0, 8.0);
        assert!(!check.surging);
        assert!(check.surge_pct < 0.0);
    }

    #[test]
    fn test_surge_is_deterministic() {
        let a = evaluate_surge(216.0, 200.0, 8.0);
        let b = evaluate_surge(216.0, 200.0, 8.0);
        assert_eq!(a.surging, b.surging);
        assert_eq!(a.surge_pct, b.surge_pct);
    }

    #[test]
    fn test_market_healthy() {
        let health = evaluate_market_health(changes(&[("SPY", 0.5), ("QQQ", -1.2)]));
        assert!(health.healthy);
    }

    #[test]
    fn test_market_one_index_down_3pct() {
        let health = evaluate_market_health(changes(&[("SPY", -3.0), ("QQQ", 0.1)]));
        assert!(!health.healthy);
    }

    #[test]
    fn test_market_boundary_minus_2_is_unhealthy() {
        let health = evaluate_market_health(changes(&[("SPY", -2.0), ("QQQ", 1.0)]));
        assert!(!health.healthy);
    }

    #[test]
    fn test_market_no_data_is_unhealthy() {
        let health = evaluate_market_health(vec![]);
        assert!(!health.healthy);
    }
}
