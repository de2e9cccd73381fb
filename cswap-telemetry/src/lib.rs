//! Counter and latency facade for the cswap runtime. Nothing is exported to a
//! collector; snapshots are flushed in-process so tests can assert which pool
//! calls committed and which aborted.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
    time::SystemTime,
};
use thiserror::Error;

#[cfg(any(
    all(feature = "dev", feature = "test"),
    all(feature = "dev", feature = "prod"),
    all(feature = "test", feature = "prod")
))]
compile_error!(
    "Only one of the `dev`, `test`, or `prod` features may be enabled for cswap-telemetry."
);

#[cfg(feature = "dev")]
const DEFAULT_FLUSH_MS: u64 = 1_000;
#[cfg(feature = "test")]
const DEFAULT_FLUSH_MS: u64 = 500;
#[cfg(any(feature = "prod", not(any(feature = "dev", feature = "test"))))]
const DEFAULT_FLUSH_MS: u64 = 5_000;

const DEFAULT_MAX_LATENCY_SAMPLES: usize = 1_024;

fn default_flush_interval_ms() -> u64 {
    DEFAULT_FLUSH_MS
}

fn default_max_latency_samples() -> usize {
    DEFAULT_MAX_LATENCY_SAMPLES
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TelemetryConfig {
    /// Collector endpoint. Recorded in snapshots only.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Flush cadence in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Latency samples kept per series between flushes; the oldest are dropped.
    #[serde(default = "default_max_latency_samples")]
    pub max_latency_samples: usize,
    /// Global labels appended to every snapshot.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            flush_interval_ms: default_flush_interval_ms(),
            max_latency_samples: default_max_latency_samples(),
            labels: BTreeMap::new(),
        }
    }
}

impl TelemetryConfig {
    pub fn sample(component: &str) -> Self {
        Self {
            endpoint: None,
            flush_interval_ms: default_flush_interval_ms(),
            max_latency_samples: default_max_latency_samples(),
            labels: BTreeMap::from([("component".into(), component.into())]),
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("counter overflow for metric {0}")]
    CounterOverflow(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub timestamp: SystemTime,
    pub labels: BTreeMap<String, String>,
    pub counters: BTreeMap<String, u64>,
    pub latencies_ms: BTreeMap<String, Vec<u64>>,
}

impl TelemetrySnapshot {
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "labels": self.labels,
            "counters": self.counters,
            "latencies_ms": self.latencies_ms,
        })
    }
}

#[derive(Default)]
struct TelemetryState {
    counters: BTreeMap<String, u64>,
    latencies_ms: BTreeMap<String, VecDeque<u64>>,
}

impl TelemetryState {
    fn latency_snapshot(&self) -> BTreeMap<String, Vec<u64>> {
        self.latencies_ms
            .iter()
            .map(|(name, samples)| (name.clone(), samples.iter().copied().collect()))
            .collect()
    }
}

#[derive(Clone)]
pub struct TelemetryHandle {
    config: TelemetryConfig,
    state: Arc<Mutex<TelemetryState>>,
}

impl TelemetryHandle {
    pub fn from_config(config: TelemetryConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(TelemetryState::default())),
        }
    }

    pub fn record_counter(&self, name: &str, delta: u64) -> Result<(), TelemetryError> {
        let mut guard = self.state.lock();
        let entry = guard.counters.entry(name.to_owned()).or_default();
        *entry = entry
            .checked_add(delta)
            .ok_or_else(|| TelemetryError::CounterOverflow(name.to_owned()))?;
        Ok(())
    }

    pub fn record_latency_ms(&self, name: &str, value: u64) {
        let cap = self.config.max_latency_samples;
        if cap == 0 {
            return;
        }
        let mut guard = self.state.lock();
        let series = guard.latencies_ms.entry(name.to_owned()).or_default();
        while series.len() >= cap {
            series.pop_front();
        }
        series.push_back(value);
    }

    /// Reads the current counters without clearing them.
    pub fn peek(&self) -> TelemetrySnapshot {
        let guard = self.state.lock();
        TelemetrySnapshot {
            timestamp: SystemTime::now(),
            labels: self.config.labels.clone(),
            counters: guard.counters.clone(),
            latencies_ms: guard.latency_snapshot(),
        }
    }

    pub fn flush(&self) -> TelemetrySnapshot {
        let mut guard = self.state.lock();
        let latencies_ms = guard.latency_snapshot();
        guard.latencies_ms.clear();
        TelemetrySnapshot {
            timestamp: SystemTime::now(),
            labels: self.config.labels.clone(),
            counters: std::mem::take(&mut guard.counters),
            latencies_ms,
        }
    }

    pub fn flush_interval(&self) -> u64 {
        self.config.flush_interval_ms
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.config.endpoint.as_deref()
    }
}
