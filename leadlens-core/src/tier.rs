//! Rate-limit tier presets.
//!
//! The upstream RapidAPI plans map to fixed per-second rate limits. The
//! presets are a closed set: unknown tier names are rejected at the
//! boundary with a configuration error rather than falling back silently.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Pricing tiers offered by the upstream APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateTier {
    /// Free/basic plan.
    Basic,
    /// Pro plan.
    Pro,
    /// Ultra plan.
    Ultra,
    /// Mega plan.
    Mega,
}

impl RateTier {
    /// Maximum requests per second allowed on this tier.
    pub fn requests_per_second(&self) -> u32 {
        match self {
            Self::Basic => 1,
            Self::Pro => 5,
            Self::Ultra => 10,
            Self::Mega => 20,
        }
    }

    /// Monthly request quota for this tier.
    pub fn monthly_quota(&self) -> u64 {
        match self {
            Self::Basic => 50,
            Self::Pro => 10_000,
            Self::Ultra => 50_000,
            Self::Mega => 200_000,
        }
    }

    /// Returns all tiers, cheapest first.
    pub fn all() -> &'static [RateTier] {
        &[Self::Basic, Self::Pro, Self::Ultra, Self::Mega]
    }

    /// Lowercase name as used on the command line and in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Ultra => "ultra",
            Self::Mega => "mega",
        }
    }
}

impl fmt::Display for RateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RateTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            "ultra" => Ok(Self::Ultra),
            "mega" => Ok(Self::Mega),
            other => Err(CoreError::Configuration(format!(
                "Invalid tier: {other}. Valid tiers: basic, pro, ultra, mega"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_rate_limits() {
        assert_eq!(RateTier::Basic.requests_per_second(), 1);
        assert_eq!(RateTier::Pro.requests_per_second(), 5);
        assert_eq!(RateTier::Ultra.requests_per_second(), 10);
        assert_eq!(RateTier::Mega.requests_per_second(), 20);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("PRO".parse::<RateTier>().unwrap(), RateTier::Pro);
        assert_eq!("ultra".parse::<RateTier>().unwrap(), RateTier::Ultra);
        assert_eq!("Mega".parse::<RateTier>().unwrap(), RateTier::Mega);
    }

    #[test]
    fn test_parse_unknown_tier() {
        let err = "platinum".parse::<RateTier>().unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
        assert!(err.to_string().contains("platinum"));
    }

    #[test]
    fn test_all_tiers_ordered() {
        let tiers = RateTier::all();
        assert_eq!(tiers.len(), 4);
        for pair in tiers.windows(2) {
            assert!(pair[0].requests_per_second() < pair[1].requests_per_second());
        }
    }
}
