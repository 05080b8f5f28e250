use chrono::{DateTime, Duration, Utc};
use log::debug;

pub const DEFAULT_CACHE_TTL_HOURS: i64 = 3;

/// A single cached value with the time it was stored.
///
/// The clock is passed in by the caller so expiry can be tested without waiting.
#[derive(Debug, Clone)]
pub struct TimedCache<T> {
    entry: Option<(T, DateTime<Utc>)>,
    ttl: Duration,
}

impl<T> Default for TimedCache<T> {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_CACHE_TTL_HOURS))
    }
}

impl<T> TimedCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value if it was stored less than `ttl` before `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        match &self.entry {
            Some((value, fetched_at)) if now - *fetched_at < self.ttl => Some(value),
            Some((_, fetched_at)) => {
                debug!("Cache entry from {} has expired", fetched_at);
                None
            }
            None => None,
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|(_, fetched_at)| *fetched_at)
    }

    pub fn store(&mut self, value: T, now: DateTime<Utc>) {
        self.entry = Some((value, now));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache: TimedCache<Vec<u32>> = TimedCache::default();
        assert!(cache.get(at(9, 0)).is_none());
        assert_eq!(cache.ttl(), Duration::hours(3));
    }

    #[test]
    fn test_value_served_until_expiry() {
        let mut cache = TimedCache::default();
        cache.store(vec![1, 2, 3], at(9, 0));

        assert_eq!(cache.get(at(9, 0)), Some(&vec![1, 2, 3]));
        assert_eq!(cache.get(at(11, 59)), Some(&vec![1, 2, 3]));
        assert!(cache.get(at(12, 0)).is_none());
        assert_eq!(cache.fetched_at(), Some(at(9, 0)));
    }

    #[test]
    fn test_store_refreshes_timestamp() {
        let mut cache = TimedCache::new(Duration::minutes(30));
        cache.store("old", at(9, 0));
        cache.store("new", at(9, 20));

        assert_eq!(cache.get(at(9, 45)), Some(&"new"));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = TimedCache::default();
        cache.store(1, at(9, 0));
        cache.invalidate();
        assert!(cache.get(at(9, 1)).is_none());
        assert!(cache.fetched_at().is_none());
    }
}
