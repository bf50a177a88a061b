//! Sequence-number and request-id counters for a secure channel.
//!
//! Both counters are owned by the channel's encoder and never shared;
//! per-channel serialization of encode calls is the concurrency contract.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{SEQUENCE_NUMBER_MAX, SEQUENCE_NUMBER_START};
use crate::error::EncodeError;

/// Monotonic chunk sequence number with defined wrap-around.
///
/// Values run over `[1, 4294966271]`; after issuing the maximum the counter
/// returns to 1, leaving the last 1024 values of the u32 space unused.
#[derive(Debug, Clone)]
pub struct SequenceNumber {
    next: u32,
}

impl SequenceNumber {
    pub const START: u32 = SEQUENCE_NUMBER_START;
    pub const MAX: u32 = SEQUENCE_NUMBER_MAX;

    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Self::START)
    }

    /// Resume counting at `value`. Out-of-range values fall back to the
    /// start of the sequence.
    #[must_use]
    pub fn starting_at(value: u32) -> Self {
        let next = if value < Self::START || value > Self::MAX {
            Self::START
        } else {
            value
        };
        Self { next }
    }

    /// Return the current value and advance.
    pub fn next(&mut self) -> u32 {
        let value = self.next;
        self.next = if value >= Self::MAX {
            Self::START
        } else {
            value + 1
        };
        value
    }

    /// The value the next call to [`next`](Self::next) will return.
    #[must_use]
    pub fn peek(&self) -> u32 {
        self.next
    }
}

impl Default for SequenceNumber {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic request-id counter, starting at 1.
///
/// Backed by a 64-bit counter so exhaustion of the 32-bit wire space is
/// detected instead of wrapping.
#[derive(Debug)]
pub struct RequestId {
    next: AtomicU64,
}

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Return the current id and advance.
    pub fn next(&self) -> Result<u32, EncodeError> {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        u32::try_from(value).map_err(|_| EncodeError::RequestIdExhausted)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one() {
        let mut seq = SequenceNumber::new();
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        assert_eq!(seq.peek(), 3);
    }

    #[test]
    fn test_wraps_to_one_after_max() {
        let mut seq = SequenceNumber::starting_at(SequenceNumber::MAX - 1);
        assert_eq!(seq.next(), SequenceNumber::MAX - 1);
        assert_eq!(seq.next(), SequenceNumber::MAX);
        assert_eq!(seq.next(), 1);
    }

    #[test]
    fn test_starting_at_out_of_range_falls_back() {
        assert_eq!(SequenceNumber::starting_at(0).peek(), 1);
        assert_eq!(SequenceNumber::starting_at(u32::MAX).peek(), 1);
        assert_eq!(
            SequenceNumber::starting_at(SequenceNumber::MAX).peek(),
            SequenceNumber::MAX
        );
    }

    #[test]
    fn test_request_id_monotonic() {
        let ids = RequestId::new();
        assert_eq!(ids.next().unwrap(), 1);
        assert_eq!(ids.next().unwrap(), 2);
        assert_eq!(ids.next().unwrap(), 3);
    }

    #[test]
    fn test_request_id_exhaustion() {
        let ids = RequestId::new();
        ids.next.store(u64::from(u32::MAX) + 1, Ordering::Relaxed);
        assert_eq!(ids.next(), Err(EncodeError::RequestIdExhausted));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn sequence_values_stay_in_range(start in 1u32..=SequenceNumber::MAX, steps in 0usize..512) {
            let mut seq = SequenceNumber::starting_at(start);
            for _ in 0..steps {
                let value = seq.next();
                prop_assert!(value >= SequenceNumber::START);
                prop_assert!(value <= SequenceNumber::MAX);
            }
        }

        #[test]
        fn sequence_strictly_increases_between_wraps(start in 1u32..=SequenceNumber::MAX, steps in 1usize..512) {
            let mut seq = SequenceNumber::starting_at(start);
            let mut previous = seq.next();
            for _ in 1..steps {
                let value = seq.next();
                if previous == SequenceNumber::MAX {
                    prop_assert_eq!(value, SequenceNumber::START);
                } else {
                    prop_assert_eq!(value, previous + 1);
                }
                previous = value;
            }
        }
    }
}
