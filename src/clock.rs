//! Time source for circulation arithmetic
//!
//! All stored instants are UTC. The library wall clock lives in a single
//! fixed-offset timezone configured once at startup (the reference
//! deployment runs at UTC+8, Asia/Manila); every local-time conversion
//! goes through this module so no other code carries timezone literals.

use chrono::{DateTime, FixedOffset, Utc};

#[cfg(test)]
use mockall::automock;

/// Source of "now" and of the library's display timezone
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
    /// Offset of the library wall clock east of UTC
    fn local_offset(&self) -> FixedOffset;
}

/// System clock pinned to the configured library timezone
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Offsets outside the valid UTC range fall back to UTC+8.
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(8 * 3600).expect("static offset"));
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        self.offset
    }
}
