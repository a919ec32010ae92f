use serde::{Deserialize, Serialize};

use crate::config::{defaults, MonitoringConfig};

/// Tiered memory pressure, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PressureLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl PressureLevel {
    /// Classify a usage ratio against the default 0.70 / 0.85 / 0.95 thresholds.
    pub fn from_ratio(ratio: f64) -> Self {
        Self::classify(
            ratio,
            defaults::DEFAULT_MEDIUM_THRESHOLD,
            defaults::DEFAULT_HIGH_THRESHOLD,
            defaults::DEFAULT_CRITICAL_THRESHOLD,
        )
    }

    /// Classify a usage ratio against configured thresholds.
    pub fn from_config(ratio: f64, config: &MonitoringConfig) -> Self {
        Self::classify(
            ratio,
            config.medium_threshold,
            config.high_threshold,
            config.critical_threshold,
        )
    }

    fn classify(ratio: f64, medium: f64, high: f64, critical: f64) -> Self {
        if ratio >= critical {
            Self::Critical
        } else if ratio >= high {
            Self::High
        } else if ratio >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// HIGH or CRITICAL.
    pub fn is_elevated(self) -> bool {
        self >= Self::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        assert_eq!(PressureLevel::from_ratio(0.0), PressureLevel::Low);
        assert_eq!(PressureLevel::from_ratio(0.6999), PressureLevel::Low);
        assert_eq!(PressureLevel::from_ratio(0.70), PressureLevel::Medium);
        assert_eq!(PressureLevel::from_ratio(0.84), PressureLevel::Medium);
        assert_eq!(PressureLevel::from_ratio(0.85), PressureLevel::High);
        assert_eq!(PressureLevel::from_ratio(0.95), PressureLevel::Critical);
        assert_eq!(PressureLevel::from_ratio(1.2), PressureLevel::Critical);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(PressureLevel::Low < PressureLevel::Medium);
        assert!(PressureLevel::High < PressureLevel::Critical);
        assert!(PressureLevel::High.is_elevated());
        assert!(!PressureLevel::Medium.is_elevated());
    }
}
