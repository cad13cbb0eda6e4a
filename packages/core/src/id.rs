// ABOUTME: Unique identifier generation for users and tasks
// ABOUTME: Snowflake-style 64-bit ids built from timestamp, node and sequence bits

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::utils::now_millis;

/// 2024-01-01T00:00:00Z, the zero point of generated timestamps
pub const CUSTOM_EPOCH_MS: i64 = 1_704_067_200_000;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;

pub const MAX_NODE_ID: i64 = (1 << NODE_BITS) - 1;
const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;

/// Waits for the clock to leave a millisecond whose sequence is used up
const EXHAUSTED_RETRIES: u32 = 5;
const EXHAUSTED_BACKOFF: Duration = Duration::from_millis(1);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdGenError {
    #[error("Node id {0} is out of range (0-{max})", max = MAX_NODE_ID)]
    InvalidNode(i64),
    #[error("Clock moved backwards: last={last} now={now}")]
    ClockMovedBackwards { last: i64, now: i64 },
    #[error("Clock is before the generator epoch")]
    ClockBeforeEpoch,
    #[error("Generator state poisoned")]
    Poisoned,
    #[error("Generate id error: {0}")]
    Unavailable(String),
}

/// Source of unique 64-bit identifiers
#[async_trait]
pub trait IdGenerator: Send + Sync {
    async fn generate_id(&self) -> Result<i64, IdGenError>;
}

/// Millisecond clock used by the generator
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Debug, Default)]
struct GeneratorState {
    last_ms: i64,
    sequence: i64,
}

/// Time-ordered id generator.
///
/// Layout (most to least significant): 41 bits of milliseconds since
/// [`CUSTOM_EPOCH_MS`], 10 bits of node id, 12 bits of per-millisecond sequence.
/// Ids from one generator are strictly increasing.
pub struct SnowflakeGenerator {
    node_id: i64,
    clock: Clock,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    pub fn new(node_id: i64) -> Result<Self, IdGenError> {
        Self::with_clock(node_id, Arc::new(now_millis))
    }

    pub fn with_clock(node_id: i64, clock: Clock) -> Result<Self, IdGenError> {
        if !(0..=MAX_NODE_ID).contains(&node_id) {
            return Err(IdGenError::InvalidNode(node_id));
        }

        Ok(Self {
            node_id,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Next id for the current millisecond, or `None` when its sequence is used up.
    /// State is left untouched in the `None` case.
    fn next_id(&self) -> Result<Option<i64>, IdGenError> {
        let mut state = self.state.lock().map_err(|_| IdGenError::Poisoned)?;

        let now = (self.clock)();
        if now < CUSTOM_EPOCH_MS {
            return Err(IdGenError::ClockBeforeEpoch);
        }
        if now < state.last_ms {
            return Err(IdGenError::ClockMovedBackwards {
                last: state.last_ms,
                now,
            });
        }

        if now == state.last_ms {
            if state.sequence == MAX_SEQUENCE {
                return Ok(None);
            }
            state.sequence += 1;
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        Ok(Some(
            ((now - CUSTOM_EPOCH_MS) << (NODE_BITS + SEQUENCE_BITS))
                | (self.node_id << SEQUENCE_BITS)
                | state.sequence,
        ))
    }
}

#[async_trait]
impl IdGenerator for SnowflakeGenerator {
    async fn generate_id(&self) -> Result<i64, IdGenError> {
        for _ in 0..=EXHAUSTED_RETRIES {
            if let Some(id) = self.next_id()? {
                return Ok(id);
            }
            tokio::time::sleep(EXHAUSTED_BACKOFF).await;
        }
        Err(IdGenError::Unavailable(
            "sequence exhausted and clock did not advance".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn fixed_clock(value: Arc<AtomicI64>) -> Clock {
        Arc::new(move || value.load(Ordering::SeqCst))
    }

    #[test]
    fn test_rejects_out_of_range_node() {
        assert_eq!(
            SnowflakeGenerator::new(MAX_NODE_ID + 1).err(),
            Some(IdGenError::InvalidNode(MAX_NODE_ID + 1))
        );
        assert!(SnowflakeGenerator::new(-1).is_err());
        assert!(SnowflakeGenerator::new(MAX_NODE_ID).is_ok());
    }

    #[tokio::test]
    async fn test_ids_are_positive_and_increasing() {
        let generator = SnowflakeGenerator::new(1).unwrap();
        let mut previous = 0;
        for _ in 0..10_000 {
            let id = generator.generate_id().await.unwrap();
            assert!(id > previous);
            previous = id;
        }
    }

    #[tokio::test]
    async fn test_same_millisecond_uses_sequence() {
        let now = Arc::new(AtomicI64::new(CUSTOM_EPOCH_MS + 1_000));
        let generator = SnowflakeGenerator::with_clock(3, fixed_clock(now.clone())).unwrap();

        let first = generator.generate_id().await.unwrap();
        let second = generator.generate_id().await.unwrap();

        assert_eq!(second - first, 1);
        assert_eq!((first >> SEQUENCE_BITS) & MAX_NODE_ID, 3);
        assert_eq!(first >> (NODE_BITS + SEQUENCE_BITS), 1_000);
    }

    #[tokio::test]
    async fn test_clock_moving_backwards_fails() {
        let now = Arc::new(AtomicI64::new(CUSTOM_EPOCH_MS + 5_000));
        let generator = SnowflakeGenerator::with_clock(1, fixed_clock(now.clone())).unwrap();
        generator.generate_id().await.unwrap();

        now.store(CUSTOM_EPOCH_MS + 4_000, Ordering::SeqCst);
        let err = generator.generate_id().await.unwrap_err();
        assert_eq!(
            err,
            IdGenError::ClockMovedBackwards {
                last: CUSTOM_EPOCH_MS + 5_000,
                now: CUSTOM_EPOCH_MS + 4_000,
            }
        );
    }

    #[tokio::test]
    async fn test_clock_before_epoch_fails() {
        let now = Arc::new(AtomicI64::new(CUSTOM_EPOCH_MS - 1));
        let generator = SnowflakeGenerator::with_clock(1, fixed_clock(now)).unwrap();
        assert_eq!(
            generator.generate_id().await.unwrap_err(),
            IdGenError::ClockBeforeEpoch
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_sequence_with_frozen_clock_is_unavailable() {
        let now = Arc::new(AtomicI64::new(CUSTOM_EPOCH_MS + 7_000));
        let generator = SnowflakeGenerator::with_clock(2, fixed_clock(now.clone())).unwrap();

        let mut last = 0;
        for _ in 0..=MAX_SEQUENCE {
            last = generator.generate_id().await.unwrap();
        }
        assert_eq!(last & MAX_SEQUENCE, MAX_SEQUENCE);

        assert!(matches!(
            generator.generate_id().await,
            Err(IdGenError::Unavailable(_))
        ));

        // A failed attempt must not recycle sequence numbers
        now.store(CUSTOM_EPOCH_MS + 7_001, Ordering::SeqCst);
        let next = generator.generate_id().await.unwrap();
        assert!(next > last);
        assert_eq!(next & MAX_SEQUENCE, 0);
    }
}
