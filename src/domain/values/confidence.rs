use serde::{Deserialize, Serialize};
use std::fmt;

/// AI confidence score on the 0–100 scale used by the judgment service.
/// Advisory only: callers always compare it against a configured threshold,
/// never act on it alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    pub fn new(value: u8) -> Result<Self, String> {
        if value > 100 {
            return Err(format!("Confidence must be between 0 and 100, got {value}"));
        }
        Ok(Confidence(value))
    }

    /// Clamp an untrusted score (e.g. parsed from an LLM response) into range.
    pub fn clamped(value: i64) -> Self {
        Confidence(value.clamp(0, 100) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn meets(&self, threshold: u8) -> bool {
        self.0 >= threshold
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Confidence::new(101).is_err());
        assert!(Confidence::new(100).is_ok());
        assert!(Confidence::new(0).is_ok());
    }

    #[test]
    fn test_clamped_from_llm_output() {
        assert_eq!(Confidence::clamped(-5).value(), 0);
        assert_eq!(Confidence::clamped(250).value(), 100);
        assert_eq!(Confidence::clamped(75).value(), 75);
    }

    #[test]
    fn test_meets_threshold_inclusive() {
        assert!(Confidence::clamped(70).meets(70));
        assert!(!Confidence::clamped(69).meets(70));
    }

    #[test]
    fn test_default_is_zero() {
        // Conservative default: a missing/unparseable score never passes a gate.
        assert!(!Confidence::default().meets(1));
    }
}
