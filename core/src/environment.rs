//! Dependency-injection traits.
//!
//! Every external dependency an engine needs is abstracted behind a trait so
//! it can be swapped for a deterministic test double without touching the
//! engine itself.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Abstracts time so engines are deterministic under test.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;

    /// The current time as epoch milliseconds, the representation used
    /// internally by every engine.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// The system clock, used everywhere outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Abstracts id generation so tests can assert on deterministic ids.
pub trait IdGenerator: Send + Sync {
    /// Generate a new unique id.
    fn next_id(&self) -> String;
}

/// Generates random UUIDv4 ids, used everywhere outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_now_millis_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn uuid_generator_produces_distinct_ids() {
        let gen = UuidGenerator;
        assert_ne!(gen.next_id(), gen.next_id());
    }
}
