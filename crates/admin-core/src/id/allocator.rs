//! Thread-safe snowflake allocator.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};

use super::clock::{Clock, SystemClock};
use super::{DistributedId, IdParts, MAX_SEQUENCE, TIMESTAMP_BITS, compose, decompose};
use crate::config::IdConfig;
use crate::config::id::MAX_MACHINE_ID;
use crate::error::AppError;
use crate::result::AppResult;

const MAX_TIMESTAMP_OFFSET: i64 = (1 << TIMESTAMP_BITS) - 1;

#[derive(Debug)]
struct AllocatorState {
    last_timestamp_ms: i64,
    sequence: i64,
}

/// Generates unique, strictly increasing 64-bit ids for one machine id.
///
/// The `{last_timestamp_ms, sequence}` pair is guarded by a single mutex
/// held across the whole read-modify-write, so concurrent callers never
/// observe the same pair.
#[derive(Debug)]
pub struct IdAllocator {
    machine_id: u16,
    epoch_ms: i64,
    max_regression_ms: i64,
    avoid_round_ids: bool,
    clock: Arc<dyn Clock>,
    state: Mutex<AllocatorState>,
}

impl IdAllocator {
    /// Create an allocator on the system clock.
    pub fn new(config: &IdConfig) -> AppResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an allocator reading time from `clock`.
    pub fn with_clock(config: &IdConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        if config.machine_id > MAX_MACHINE_ID {
            return Err(AppError::configuration(format!(
                "Machine id {} exceeds {MAX_MACHINE_ID}",
                config.machine_id
            )));
        }
        let now = clock.now_ms();
        if config.epoch_ms > now {
            return Err(AppError::configuration(format!(
                "Id epoch {} is in the future (now {now})",
                config.epoch_ms
            )));
        }

        info!(
            machine_id = config.machine_id,
            epoch_ms = config.epoch_ms,
            avoid_round_ids = config.avoid_round_ids,
            "Id allocator initialized"
        );

        Ok(Self {
            machine_id: config.machine_id,
            epoch_ms: config.epoch_ms,
            max_regression_ms: i64::try_from(config.max_clock_regression_ms).unwrap_or(i64::MAX),
            avoid_round_ids: config.avoid_round_ids,
            clock,
            state: Mutex::new(AllocatorState {
                last_timestamp_ms: -1,
                sequence: 0,
            }),
        })
    }

    /// Machine id stamped into every id.
    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    /// Split an id produced by this allocator into its fields.
    pub fn decompose(&self, id: DistributedId) -> IdParts {
        decompose(id.0, self.epoch_ms)
    }

    /// Allocate the next id.
    ///
    /// Blocks through backward clock jumps no larger than the configured
    /// tolerance and through sequence exhaustion within one millisecond.
    /// The wait holds the state lock and sleeps the calling thread, so on a
    /// tokio worker it stalls every task scheduled there. Keep
    /// `max_clock_regression_ms` small and run hosts with a slewing NTP
    /// client rather than one that steps the clock.
    pub fn next_id(&self) -> AppResult<DistributedId> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AppError::internal("Id allocator state lock poisoned"))?;

        loop {
            let mut now = self.clock.now_ms();

            if now < state.last_timestamp_ms {
                let drift = state.last_timestamp_ms - now;
                if drift > self.max_regression_ms {
                    error!(
                        drift_ms = drift,
                        tolerance_ms = self.max_regression_ms,
                        machine_id = self.machine_id,
                        "Clock moved backward beyond tolerance, refusing to allocate ids"
                    );
                    return Err(AppError::clock_regression(format!(
                        "Clock moved backward by {drift} ms"
                    )));
                }
                warn!(drift_ms = drift, "Clock moved backward, waiting for it to catch up");
                now = self.wait_until(state.last_timestamp_ms);
            }

            if now == state.last_timestamp_ms {
                state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
                if state.sequence == 0 {
                    now = self.wait_until(state.last_timestamp_ms + 1);
                }
            } else {
                state.sequence = 0;
            }
            state.last_timestamp_ms = now;

            let offset = now - self.epoch_ms;
            if !(0..=MAX_TIMESTAMP_OFFSET).contains(&offset) {
                return Err(AppError::internal(format!(
                    "Timestamp offset {offset} ms does not fit in {TIMESTAMP_BITS} bits"
                )));
            }

            let id = compose(offset, self.machine_id, state.sequence);
            if self.avoid_round_ids && is_round(id) {
                continue;
            }
            return Ok(DistributedId(id));
        }
    }

    fn wait_until(&self, target_ms: i64) -> i64 {
        loop {
            let now = self.clock.now_ms();
            if now >= target_ms {
                return now;
            }
            if target_ms - now > 1 {
                std::thread::sleep(Duration::from_millis(1));
            } else {
                std::thread::yield_now();
            }
        }
    }
}

/// Zero and multiples of 1000 are skipped when `avoid_round_ids` is set.
fn is_round(id: i64) -> bool {
    id % 1000 == 0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::error::ErrorKind;
    use crate::id::ManualClock;

    const EPOCH: i64 = 1_577_836_800_000;

    fn config() -> IdConfig {
        IdConfig {
            machine_id: 1,
            epoch_ms: EPOCH,
            max_clock_regression_ms: 50,
            avoid_round_ids: false,
        }
    }

    #[test]
    fn test_concurrent_ids_are_unique_and_increasing_per_thread() {
        let allocator = Arc::new(IdAllocator::new(&config()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                thread::spawn(move || {
                    (0..1250)
                        .map(|_| allocator.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let ids = handle.join().unwrap();
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            for id in ids {
                assert_eq!(allocator.decompose(id).machine_id, 1);
                all.insert(id);
            }
        }
        assert_eq!(all.len(), 10_000);
    }

    #[test]
    fn test_same_millisecond_increments_sequence() {
        let clock = Arc::new(ManualClock::new(EPOCH + 10_000));
        let allocator = IdAllocator::with_clock(&config(), clock.clone()).unwrap();

        let a = allocator.decompose(allocator.next_id().unwrap());
        let b = allocator.decompose(allocator.next_id().unwrap());
        assert_eq!(a.timestamp_ms, b.timestamp_ms);
        assert_eq!(a.sequence, 0);
        assert_eq!(b.sequence, 1);

        clock.advance(1);
        let c = allocator.decompose(allocator.next_id().unwrap());
        assert_eq!(c.timestamp_ms, EPOCH + 10_001);
        assert_eq!(c.sequence, 0);
    }

    #[test]
    fn test_sequence_exhaustion_waits_for_next_millisecond() {
        let start = EPOCH + 20_000;
        let clock = Arc::new(ManualClock::new(start));
        let allocator = IdAllocator::with_clock(&config(), clock.clone()).unwrap();

        let mut last = None;
        for _ in 0..=MAX_SEQUENCE {
            last = Some(allocator.next_id().unwrap());
        }
        let last = allocator.decompose(last.unwrap());
        assert_eq!(last.timestamp_ms, start);
        assert_eq!(i64::from(last.sequence), MAX_SEQUENCE);

        clock.set_auto_advance(1);
        let rolled = allocator.decompose(allocator.next_id().unwrap());
        assert_eq!(rolled.timestamp_ms, start + 1);
        assert_eq!(rolled.sequence, 0);
    }

    #[test]
    fn test_small_regression_is_waited_out() {
        let clock = Arc::new(ManualClock::new(EPOCH + 30_000));
        let allocator = IdAllocator::with_clock(&config(), clock.clone()).unwrap();
        let before = allocator.next_id().unwrap();

        clock.set(EPOCH + 29_990);
        clock.set_auto_advance(1);
        let after = allocator.next_id().unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_large_regression_fails() {
        let clock = Arc::new(ManualClock::new(EPOCH + 40_000));
        let allocator = IdAllocator::with_clock(&config(), clock.clone()).unwrap();
        allocator.next_id().unwrap();

        clock.set(EPOCH + 39_000);
        let err = allocator.next_id().unwrap_err();
        assert_eq!(err.kind, ErrorKind::ClockRegression);

        clock.set(EPOCH + 40_001);
        assert!(allocator.next_id().is_ok());
    }

    #[test]
    fn test_default_tolerance_fails_fast() {
        let clock = Arc::new(ManualClock::new(EPOCH + 50_000));
        let allocator = IdAllocator::with_clock(&IdConfig::default(), clock.clone()).unwrap();
        allocator.next_id().unwrap();

        clock.set(EPOCH + 49_900);
        let started = std::time::Instant::now();
        let err = allocator.next_id().unwrap_err();
        assert_eq!(err.kind, ErrorKind::ClockRegression);
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_avoid_round_ids_skips_multiples_of_thousand() {
        let clock = Arc::new(ManualClock::new(EPOCH));
        let cfg = IdConfig {
            machine_id: 0,
            avoid_round_ids: true,
            ..config()
        };
        let allocator = IdAllocator::with_clock(&cfg, clock).unwrap();

        let ids: Vec<_> = (0..2000).map(|_| allocator.next_id().unwrap()).collect();
        assert!(ids.iter().all(|id| id.0 % 1000 != 0));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rejects_out_of_range_machine_id() {
        let cfg = IdConfig {
            machine_id: 1024,
            ..config()
        };
        let err = IdAllocator::new(&cfg).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_future_epoch() {
        let clock = Arc::new(ManualClock::new(EPOCH));
        let cfg = IdConfig {
            epoch_ms: EPOCH + 1,
            ..config()
        };
        let err = IdAllocator::with_clock(&cfg, clock).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
