//! Volatility-tiered stop loss and the take-profit target.
//!
//! The stop percentage is a three-tier lookup on 30-day historical daily
//! volatility. On a short, the stop sits *above* entry and the profit target
//! *below* it; both invariants are enforced by construction (positive
//! percentages applied in opposite directions).

/// Stop-loss percentages per volatility band, highest band first.
#[derive(Debug, Clone)]
pub struct StopLossTiers {
    /// Daily vol > 3% → widest stop (default 8%).
    pub high_vol_pct: f64,
    /// Daily vol 2–3% → middle stop (default 6%). Also the fallback when
    /// volatility is unknown.
    pub medium_vol_pct: f64,
    /// Daily vol < 2% → tightest stop (default 5%).
    pub low_vol_pct: f64,
}

impl Default for StopLossTiers {
    fn default() -> Self {
        Self {
            high_vol_pct: 0.08,
            medium_vol_pct: 0.06,
            low_vol_pct: 0.05,
        }
    }
}

/// Standard deviation of day-over-day percent changes across a daily close
/// series. Returns `None` below 5 closes; callers fall back to the middle
/// stop tier rather than trusting a noisy estimate.
pub fn historical_volatility(daily_closes: &[f64]) -> Option<f64> {
    if daily_closes.len() < 5 {
        return None;
    }
    let mut changes = Vec::with_capacity(daily_closes.len() - 1);
    for pair in daily_closes.windows(2) {
        if pair[0] <= 0.0 {
            return None;
        }
        changes.push((pair[1] - pair[0]) / pair[0] * 100.0);
    }
    let mean = changes.iter().sum::<f64>() / changes.len() as f64;
    let variance = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / changes.len() as f64;
    Some(variance.sqrt())
}

/// Tier lookup: volatility in daily percent terms → stop fraction.
pub fn stop_loss_pct(daily_volatility: Option<f64>, tiers: &StopLossTiers) -> f64 {
    match daily_volatility {
        Some(vol) if vol > 3.0 => tiers.high_vol_pct,
        Some(vol) if vol > 2.0 => tiers.medium_vol_pct,
        Some(_) => tiers.low_vol_pct,
        None => tiers.medium_vol_pct,
    }
}

/// Stop-loss price for a short entered at `entry_price`: always strictly
/// above entry for any positive stop fraction.
pub fn stop_loss_price(entry_price: f64, stop_pct: f64) -> f64 {
    entry_price * (1.0 + stop_pct)
}

/// Take-profit cover price: fixed percentage below entry.
///
/// Placeholder target, intended to become a trailing or
/// volatility-scaled (ATR-based) target.
pub fn take_profit_target(entry_price: f64, take_profit_pct: f64) -> f64 {
    entry_price * (1.0 - take_profit_pct)
}
