//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for a [`Dispatcher`](crate::Dispatcher).
//!
//! Config is used in two ways:
//! 1. **Direct construction**: `Dispatcher::with_config(config)`
//! 2. **Builder**: `Dispatcher::builder().flush_interval(..).build()`
//!
//! ## Environment
//! [`Config::from_env`] reads:
//! - `EVBUS_FLUSH_INTERVAL_US` flush interval in microseconds
//! - `EVBUS_QUEUE_CAPACITY` initial per-consumer queue capacity
//!
//! Missing variables keep their defaults; unparsable values are an error.
//!
//! ## Sentinel values
//! - `flush_interval = 0` → clamped to [`MIN_FLUSH_INTERVAL`]
//! - `queue_capacity = 0` → clamped to 1
//! - `queue_capacity > MAX_QUEUE_CAPACITY` → clamped to [`MAX_QUEUE_CAPACITY`]
//!   (rejected by [`Config::from_lookup`])

use std::time::Duration;

use crate::error::ConfigError;

/// Smallest flush interval a dispatcher will run with.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_micros(1);

/// Largest initial queue capacity reserved per consumer.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 16;

const ENV_FLUSH_INTERVAL_US: &str = "EVBUS_FLUSH_INTERVAL_US";
const ENV_QUEUE_CAPACITY: &str = "EVBUS_QUEUE_CAPACITY";

/// Configuration for a dispatcher.
///
/// ## Field semantics
/// - `flush_interval`: period on which every group wakes its consumers.
///   Upper bound on delivery latency; lower values trade CPU wakeups for latency.
/// - `queue_capacity`: initial capacity of each consumer queue and its scratch buffer.
///   Queues are unbounded and grow past this value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Period of the per-group wake ticker.
    pub flush_interval: Duration,

    /// Initial capacity of consumer queues (not a limit).
    pub queue_capacity: usize,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Missing keys keep the [`Default`] values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_FLUSH_INTERVAL_US) {
            let micros = parse::<u64>(ENV_FLUSH_INTERVAL_US, &raw)?;
            cfg.flush_interval = Duration::from_micros(micros);
        }
        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            let capacity = parse::<usize>(ENV_QUEUE_CAPACITY, &raw)?;
            if capacity > MAX_QUEUE_CAPACITY {
                return Err(ConfigError::Invalid {
                    key: ENV_QUEUE_CAPACITY,
                    value: raw,
                });
            }
            cfg.queue_capacity = capacity;
        }
        Ok(cfg)
    }

    /// Returns the flush interval clamped to [`MIN_FLUSH_INTERVAL`].
    ///
    /// Tokio intervals cannot tick with a zero period.
    #[inline]
    pub fn flush_interval_clamped(&self) -> Duration {
        self.flush_interval.max(MIN_FLUSH_INTERVAL)
    }

    /// Returns the queue capacity clamped to `1..=MAX_QUEUE_CAPACITY`.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.clamp(1, MAX_QUEUE_CAPACITY)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `flush_interval = 500µs` (favors latency over wakeup count)
    /// - `queue_capacity = 128`
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_micros(500),
            queue_capacity: 128,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.flush_interval, Duration::from_micros(500));
        assert_eq!(cfg.queue_capacity, 128);
    }

    #[test]
    fn test_reads_both_keys() {
        let cfg = Config::from_lookup(lookup(&[
            ("EVBUS_FLUSH_INTERVAL_US", "2000"),
            ("EVBUS_QUEUE_CAPACITY", " 16 "),
        ]))
        .unwrap();
        assert_eq!(cfg.flush_interval, Duration::from_millis(2));
        assert_eq!(cfg.queue_capacity, 16);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = Config::from_lookup(lookup(&[("EVBUS_FLUSH_INTERVAL_US", "fast")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "EVBUS_FLUSH_INTERVAL_US",
                value: "fast".into()
            }
        );
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let cfg = Config {
            flush_interval: Duration::ZERO,
            queue_capacity: 0,
        };
        assert_eq!(cfg.flush_interval_clamped(), MIN_FLUSH_INTERVAL);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
    }

    #[test]
    fn test_oversized_capacity_is_rejected_and_clamped() {
        let raw = usize::MAX.to_string();
        let err = Config::from_lookup(lookup(&[("EVBUS_QUEUE_CAPACITY", raw.as_str())])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "EVBUS_QUEUE_CAPACITY",
                value: raw
            }
        );

        let at_bound = MAX_QUEUE_CAPACITY.to_string();
        let cfg = Config::from_lookup(lookup(&[("EVBUS_QUEUE_CAPACITY", at_bound.as_str())])).unwrap();
        assert_eq!(cfg.queue_capacity, MAX_QUEUE_CAPACITY);

        let cfg = Config {
            queue_capacity: usize::MAX / 2,
            ..Config::default()
        };
        assert_eq!(cfg.queue_capacity_clamped(), MAX_QUEUE_CAPACITY);
    }
}
