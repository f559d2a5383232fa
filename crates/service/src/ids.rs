//! Id generation for new records.
//!
//! A deployment picks exactly one policy; both produce `u64` ids that are
//! unique and strictly greater than every id already in the collection.

use chrono::Utc;
use configs::IdPolicyKind;
use models::record::{max_id, Record, RecordId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// Max existing id + 1, starting at 1.
    #[default]
    Sequential,
    /// Unix time in milliseconds, bumped past the max existing id when the
    /// clock has not moved.
    Timestamp,
}

impl IdPolicy {
    pub fn next_id<T: Record>(&self, records: &[T]) -> RecordId {
        let next = max_id(records).map_or(1, |m| m.saturating_add(1));
        match self {
            IdPolicy::Sequential => next,
            IdPolicy::Timestamp => {
                let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
                now.max(next)
            }
        }
    }
}

impl From<IdPolicyKind> for IdPolicy {
    fn from(kind: IdPolicyKind) -> Self {
        match kind {
            IdPolicyKind::Sequential => IdPolicy::Sequential,
            IdPolicyKind::Timestamp => IdPolicy::Timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::cart::Cart;

    #[test]
    fn sequential_starts_at_one_and_follows_max() {
        let empty: Vec<Cart> = Vec::new();
        assert_eq!(IdPolicy::Sequential.next_id(&empty), 1);
        let carts = vec![Cart::new(4), Cart::new(2)];
        assert_eq!(IdPolicy::Sequential.next_id(&carts), 5);
    }

    #[test]
    fn timestamp_is_monotonic_past_existing_ids() {
        let before = u64::try_from(Utc::now().timestamp_millis()).unwrap();
        let empty: Vec<Cart> = Vec::new();
        assert!(IdPolicy::Timestamp.next_id(&empty) >= before);

        // an id from the future still gets a larger successor
        let ahead = vec![Cart::new(before + 60_000)];
        assert_eq!(IdPolicy::Timestamp.next_id(&ahead), before + 60_001);
    }

    #[test]
    fn converts_from_config() {
        assert_eq!(IdPolicy::from(IdPolicyKind::Timestamp), IdPolicy::Timestamp);
        assert_eq!(IdPolicy::from(IdPolicyKind::default()), IdPolicy::Sequential);
    }
}
