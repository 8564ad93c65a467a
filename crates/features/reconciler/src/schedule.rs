use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use zb_domain::config::ScheduleConfig;

/// Uniform random pause between cycles, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    min: Duration,
    max: Duration,
}

impl Jitter {
    /// Bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max { Self { min, max } } else { Self { min: max, max: min } }
    }

    #[must_use]
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            Duration::from_secs(config.min_interval_secs),
            Duration::from_secs(config.max_interval_secs),
        )
    }

    #[must_use]
    pub const fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    pub fn next_delay(&self, rng: &mut impl Rng) -> Duration {
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rng.random_range(min..=max))
    }
}

/// A seeded generator when `seed` is set, OS entropy otherwise.
#[must_use]
pub fn rng_for(config: &ScheduleConfig) -> StdRng {
    config.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_bounds_are_exact() {
        let jitter = Jitter::new(Duration::from_secs(5), Duration::from_secs(5));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(jitter.next_delay(&mut rng), Duration::from_secs(5));
    }

    #[test]
    fn reversed_bounds_are_normalized() {
        let jitter = Jitter::new(Duration::from_secs(9), Duration::from_secs(3));
        assert_eq!(jitter.bounds(), (Duration::from_secs(3), Duration::from_secs(9)));
    }

    #[test]
    fn seeded_sequences_repeat() {
        let config = ScheduleConfig { min_interval_secs: 600, max_interval_secs: 2400, seed: Some(42) };
        let jitter = Jitter::from_config(&config);
        let (mut a, mut b) = (rng_for(&config), rng_for(&config));
        for _ in 0..8 {
            assert_eq!(jitter.next_delay(&mut a), jitter.next_delay(&mut b));
        }
    }

    proptest! {
        #[test]
        fn delay_stays_within_bounds(min in 0u64..10_000, span in 0u64..10_000, seed: u64) {
            let jitter = Jitter::new(Duration::from_secs(min), Duration::from_secs(min + span));
            let mut rng = StdRng::seed_from_u64(seed);
            let delay = jitter.next_delay(&mut rng);
            prop_assert!(delay >= Duration::from_secs(min));
            prop_assert!(delay <= Duration::from_secs(min + span));
        }
    }
}
