use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Urgency tier derived from a lead's age. Never persisted; recomputed on
/// every read, so the same lead can change tier between two reads without
/// any write happening.
///
/// `Sold` is a first-class tier rather than a display-time override, so the
/// list endpoint and anything else that classifies agree on what a sold
/// lead looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
    Sold,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "Hot",
            Temperature::Warm => "Warm",
            Temperature::Cold => "Cold",
            Temperature::Sold => "Sold",
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age-based classification. Age is measured in fractional days, never
/// truncated; the tier comparisons are strict, so an age of exactly 2.0
/// days is still Hot and exactly 7.0 days is still Warm.
pub fn classify(created_at: OffsetDateTime, now: OffsetDateTime) -> Temperature {
    let age_days = (now - created_at).as_seconds_f64() / SECONDS_PER_DAY;
    if age_days > 7.0 {
        Temperature::Cold
    } else if age_days > 2.0 {
        Temperature::Warm
    } else {
        Temperature::Hot
    }
}

/// Full derivation for a lead: a stored sold marker wins over the age tiers,
/// everything else falls through to [`classify`]. Status strings are matched
/// case-insensitively so `"sold"` and `"Sold"` behave the same.
pub fn temperature_for(
    status: Option<&str>,
    created_at: OffsetDateTime,
    now: OffsetDateTime,
) -> Temperature {
    if status.map_or(false, |s| s.eq_ignore_ascii_case("sold")) {
        return Temperature::Sold;
    }
    classify(created_at, now)
}
