use std::fmt;
use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A duration wrapper providing convenient conversions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration {
    millis: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration { millis: 0 };

    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs * 1_000,
        }
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    pub fn as_secs(&self) -> u64 {
        self.millis / 1_000
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.millis as f64 / 1_000.0
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}ms)", self.millis)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis >= 1_000 {
            write!(f, "{:.3}s", self.as_secs_f64())
        } else {
            write!(f, "{}ms", self.millis)
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<time::Duration> for Duration {
    fn from(d: time::Duration) -> Self {
        Self {
            millis: d.as_millis() as u64,
        }
    }
}

impl From<Duration> for time::Duration {
    fn from(d: Duration) -> Self {
        time::Duration::from_millis(d.millis)
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration {
            millis: self.millis + rhs.millis,
        }
    }
}

impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        Duration {
            millis: self.millis.saturating_sub(rhs.millis),
        }
    }
}

/// Source of the globally synchronized time that every timestamp in the
/// metadata and lease layers derives from.
///
/// File timestamps are expressed in whole seconds, lease expiry in
/// milliseconds; both must come from the same clock so that expiry
/// comparisons stay consistent across operations.
pub trait GlobalClock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Seconds since the Unix epoch, truncated from [`now_millis`](Self::now_millis).
    fn now_secs(&self) -> i64 {
        self.now_millis() / 1_000
    }
}

/// The production clock backed by the system's UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GlobalClock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A manually advanced clock for deterministic tests.
#[derive(Debug, Default)]
pub struct MockClock {
    millis: AtomicI64,
}

impl MockClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Duration) {
        self.millis
            .fetch_add(delta.as_millis() as i64, Ordering::SeqCst);
    }
}

impl GlobalClock for MockClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_conversions() {
        let d = Duration::from_secs(2);
        assert_eq!(d.as_secs(), 2);
        assert_eq!(d.as_millis(), 2000);
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(format!("{}", Duration::from_secs(1)), "1.000s");
        assert_eq!(format!("{}", Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_duration_add_sub() {
        let a = Duration::from_millis(100);
        let b = Duration::from_millis(50);
        assert_eq!((a + b).as_millis(), 150);
        assert_eq!((a - b).as_millis(), 50);
        // Saturating subtraction
        assert_eq!((b - a).as_millis(), 0);
    }

    #[test]
    fn test_duration_std_roundtrip() {
        let d = Duration::from_millis(1234);
        let std_d: std::time::Duration = d.into();
        let back: Duration = std_d.into();
        assert_eq!(d, back);
    }

    #[test]
    fn test_duration_serde() {
        let d = Duration::from_millis(42);
        let json = serde_json::to_string(&d).unwrap();
        let parsed: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn test_system_clock() {
        let clock = SystemClock;
        assert!(clock.now_millis() > 0);
        assert_eq!(clock.now_secs(), clock.now_millis() / 1_000);
    }

    #[test]
    fn test_mock_clock() {
        let clock = MockClock::new(10_000);
        assert_eq!(clock.now_millis(), 10_000);
        assert_eq!(clock.now_secs(), 10);
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now_secs(), 15);
        clock.set_millis(1_000);
        assert_eq!(clock.now_millis(), 1_000);
    }
}
