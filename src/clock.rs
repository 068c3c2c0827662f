//! Organization time. Every timestamp the workflow records comes from a
//! [`Clock`], normalized to the organization's UTC offset so auditors read
//! local wall-clock times.

use chrono::{FixedOffset, Offset, Utc};

use crate::error::{Error, Result};
use crate::types::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy)]
pub struct OrgClock {
    offset: FixedOffset,
}

impl OrgClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a clock from an offset in minutes east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| Error::Config(format!("utc offset out of range: {minutes} minutes")))
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for OrgClock {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl Clock for OrgClock {
    fn now(&self) -> Timestamp {
        Utc::now().with_timezone(&self.offset)
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_clock_uses_configured_offset() {
        let clock = OrgClock::from_offset_minutes(-300).unwrap();
        let now = clock.now();
        assert_eq!(now.offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(matches!(
            OrgClock::from_offset_minutes(24 * 60),
            Err(Error::Config(_))
        ));
    }
}
