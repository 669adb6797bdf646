//! Anonymous usage counters

use std::{
    collections::BTreeMap,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AnalyticsError;
use crate::{
    storage::{read_json_value, write_json, StoragePort, ANALYTICS_KEY},
    timer::Clock,
};

/// Countable event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterEvent {
    Visits,
    Shares,
    Pomodoros,
}

impl CounterEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterEvent::Visits => "visits",
            CounterEvent::Shares => "shares",
            CounterEvent::Pomodoros => "pomodoros",
        }
    }
}

impl fmt::Display for CounterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CounterEvent {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visits" => Ok(CounterEvent::Visits),
            "shares" => Ok(CounterEvent::Shares),
            "pomodoros" => Ok(CounterEvent::Pomodoros),
            other => Err(AnalyticsError::InvalidEvent(other.to_string())),
        }
    }
}

/// Running totals for every event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsTotals {
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub pomodoros: u64,
}

impl AnalyticsTotals {
    fn slot(&mut self, event: CounterEvent) -> &mut u64 {
        match event {
            CounterEvent::Visits => &mut self.visits,
            CounterEvent::Shares => &mut self.shares,
            CounterEvent::Pomodoros => &mut self.pomodoros,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CounterDocument {
    #[serde(default)]
    totals: AnalyticsTotals,
    /// `<event>:<YYYY-MM>` -> count
    #[serde(default)]
    monthly: BTreeMap<String, u64>,
}

/// Total and per-calendar-month counters, persisted as one document
pub struct AnalyticsCounters {
    storage: Arc<dyn StoragePort>,
    clock: Arc<dyn Clock>,
    doc: Mutex<CounterDocument>,
}

impl AnalyticsCounters {
    /// Load the counters; an unreadable document starts from zero
    pub fn open(storage: Arc<dyn StoragePort>, clock: Arc<dyn Clock>) -> Self {
        let doc = read_json_value(storage.as_ref(), ANALYTICS_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        Self {
            storage,
            clock,
            doc: Mutex::new(doc),
        }
    }

    /// Increment the total and the current month's bucket; returns the new total
    pub fn increment(&self, event: CounterEvent) -> Result<u64, AnalyticsError> {
        let month = month_bucket(self.clock.now_ms());
        let mut doc = self.doc.lock().map_err(|_| AnalyticsError::LockPoisoned)?;

        // Both counters move together or not at all
        let mut next = doc.clone();
        let slot = next.totals.slot(event);
        *slot += 1;
        let total = *slot;
        *next
            .monthly
            .entry(format!("{}:{}", event, month))
            .or_insert(0) += 1;

        write_json(self.storage.as_ref(), ANALYTICS_KEY, &next)?;
        *doc = next;

        debug!("Incremented {} to {}", event, total);
        Ok(total)
    }

    pub fn totals(&self) -> Result<AnalyticsTotals, AnalyticsError> {
        self.doc
            .lock()
            .map(|doc| doc.totals)
            .map_err(|_| AnalyticsError::LockPoisoned)
    }

    /// Count for `event` in `month` (`YYYY-MM`)
    pub fn monthly(&self, event: CounterEvent, month: &str) -> Result<u64, AnalyticsError> {
        let doc = self.doc.lock().map_err(|_| AnalyticsError::LockPoisoned)?;
        Ok(doc
            .monthly
            .get(&format!("{}:{}", event, month))
            .copied()
            .unwrap_or(0))
    }

    /// Zero the three totals; monthly buckets are history and stay
    pub fn reset(&self) -> Result<AnalyticsTotals, AnalyticsError> {
        let mut doc = self.doc.lock().map_err(|_| AnalyticsError::LockPoisoned)?;
        let mut next = doc.clone();
        next.totals = AnalyticsTotals::default();

        write_json(self.storage.as_ref(), ANALYTICS_KEY, &next)?;
        *doc = next;

        info!("Analytics totals reset");
        Ok(doc.totals)
    }
}

/// `YYYY-MM` (UTC) for an epoch-millisecond instant
pub fn month_bucket(now_ms: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(now_ms)
        .map(|t| t.format("%Y-%m").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemoryStore, timer::FakeClock};

    fn counters(storage: Arc<MemoryStore>) -> AnalyticsCounters {
        // 2026-02-10T00:00:00Z
        AnalyticsCounters::open(storage, Arc::new(FakeClock::at(1_770_681_600_000)))
    }

    #[test]
    fn increments_total_and_month() {
        let storage = Arc::new(MemoryStore::new());
        let counters = counters(storage.clone());

        assert_eq!(counters.increment(CounterEvent::Visits).unwrap(), 1);
        assert_eq!(counters.increment(CounterEvent::Visits).unwrap(), 2);
        assert_eq!(counters.increment(CounterEvent::Pomodoros).unwrap(), 1);

        assert_eq!(
            counters.totals().unwrap(),
            AnalyticsTotals { visits: 2, shares: 0, pomodoros: 1 }
        );
        assert_eq!(counters.monthly(CounterEvent::Visits, "2026-02").unwrap(), 2);

        // Persisted across reopen
        let reopened = AnalyticsCounters::open(storage, Arc::new(FakeClock::new()));
        assert_eq!(reopened.totals().unwrap().visits, 2);
    }

    #[test]
    fn rejects_unknown_events() {
        assert!(matches!(
            "likes".parse::<CounterEvent>(),
            Err(AnalyticsError::InvalidEvent(ref e)) if e == "likes"
        ));
        assert_eq!("shares".parse::<CounterEvent>().unwrap(), CounterEvent::Shares);
    }

    #[test]
    fn reset_zeroes_totals_only() {
        let counters = counters(Arc::new(MemoryStore::new()));
        counters.increment(CounterEvent::Shares).unwrap();

        assert_eq!(counters.reset().unwrap(), AnalyticsTotals::default());
        assert_eq!(counters.monthly(CounterEvent::Shares, "2026-02").unwrap(), 1);
    }

    #[test]
    fn failed_write_leaves_counters_untouched() {
        let counters = counters(Arc::new(MemoryStore::with_quota(0)));

        assert!(counters.increment(CounterEvent::Visits).is_err());
        assert_eq!(counters.totals().unwrap(), AnalyticsTotals::default());
    }

    #[test]
    fn month_bucket_format() {
        assert_eq!(month_bucket(1_770_681_600_000), "2026-02");
    }
}
