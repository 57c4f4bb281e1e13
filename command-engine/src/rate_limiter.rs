//! Per (channel, command) cooldown gate.
//!
//! One [`RateLimiter`] is created per process and shared by handle. Each channel owns a bucket
//! mapping command keys to the time of the last accepted invocation. The check and the timestamp
//! update happen under the bucket entry's lock, so two callers racing on the same key can never
//! both pass, while callers on different keys do not wait on each other.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

/// Cooldowns are clamped to one year.
const MAX_COOLDOWN_SECS: i64 = 365 * 24 * 60 * 60;

/// Result of [`RateLimiter::check_and_reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The invocation may proceed; `at` is now stored as the key's last invocation.
    Reserved { at: DateTime<Utc> },
    /// Cooldown has not elapsed yet.
    RateLimited { retry_after_secs: u64 },
}

impl Reservation {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Reservation::Reserved { .. })
    }
}

#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: DashMap<String, DashMap<String, DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the channel's bucket if absent. Idempotent.
    pub fn ensure_bucket(&self, channel: &str) {
        if !self.buckets.contains_key(channel) {
            self.buckets.entry(channel.to_string()).or_default();
        }
    }

    /// Checks the cooldown for `(channel, command_key)` against the current time and, when it has
    /// elapsed, records the invocation in the same step.
    pub fn check_and_reserve(
        &self,
        channel: &str,
        command_key: &str,
        cooldown_secs: u64,
    ) -> Reservation {
        self.check_and_reserve_at(channel, command_key, cooldown_secs, Utc::now())
    }

    /// Same as [`check_and_reserve`](Self::check_and_reserve) with an explicit clock.
    pub fn check_and_reserve_at(
        &self,
        channel: &str,
        command_key: &str,
        cooldown_secs: u64,
        now: DateTime<Utc>,
    ) -> Reservation {
        // The read guard on the channel keeps eviction from dropping the bucket mid-reservation.
        let bucket = loop {
            if let Some(bucket) = self.buckets.get(channel) {
                break bucket;
            }
            self.ensure_bucket(channel);
        };

        let cooldown_secs = i64::try_from(cooldown_secs)
            .unwrap_or(MAX_COOLDOWN_SECS)
            .min(MAX_COOLDOWN_SECS);
        let cooldown = Duration::seconds(cooldown_secs);

        // bound before returning: the entry borrows the bucket guard
        let reservation = match bucket.entry(command_key.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(now);
                Reservation::Reserved { at: now }
            }
            Entry::Occupied(mut entry) => {
                let elapsed = now - *entry.get();
                if elapsed >= cooldown {
                    entry.insert(now);
                    Reservation::Reserved { at: now }
                } else {
                    let remaining_ms = (cooldown - elapsed).num_milliseconds().max(0) as u64;
                    let retry_after_secs = remaining_ms.div_ceil(1000).max(1);
                    debug!(
                        channel = %channel,
                        command = %command_key,
                        retry_after_secs,
                        "Command still cooling down"
                    );
                    Reservation::RateLimited { retry_after_secs }
                }
            }
        };
        reservation
    }

    /// Drops entries whose last invocation is at least `max_idle` old, then empty buckets.
    /// Returns the number of entries removed.
    pub fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let mut evicted = 0;
        for bucket in self.buckets.iter() {
            let before = bucket.len();
            bucket.retain(|_, last| now - *last < max_idle);
            evicted += before - bucket.len();
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        evicted
    }

    /// Number of tracked (channel, command) entries.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_count(&self) -> usize {
        self.buckets.len()
    }
}
