//! Refresh scheduling
//!
//! A passive timer queue: the host polls it once per frame with the current
//! time and gets back the sweeps that are due. It owns no thread and never
//! blocks.

use crate::config::PropagationConfig;
use crate::constants::timing::MIN_REFRESH_INTERVAL_MS;
use crate::nodes::NodeId;
use std::time::{Duration, Instant};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Why a recomputation pass is run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// First sweep after the session started
    Startup,
    /// A node finished initializing after being created or loaded
    NodeInitialized(NodeId),
    /// Periodic consistency sweep
    PeriodicSweep,
    /// The backend finished executing the graph
    ExecutionCompleted,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    due: Instant,
    reason: RefreshReason,
}

#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
    startup_delay: Duration,
    node_init_delay: Duration,
    next_sweep: Option<Instant>,
    deferred: Vec<Deferred>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration, startup_delay: Duration, node_init_delay: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(MIN_REFRESH_INTERVAL_MS)),
            startup_delay,
            node_init_delay,
            next_sweep: None,
            deferred: Vec::new(),
        }
    }

    pub fn from_config(config: &PropagationConfig) -> Self {
        Self::new(
            config.refresh_interval(),
            config.startup_delay(),
            config.node_init_delay(),
        )
    }

    /// Arm the start-up sweep and the periodic timer
    ///
    /// Calling it again on a running scheduler does nothing.
    pub fn start(&mut self, now: Instant) {
        if self.is_started() {
            return;
        }
        self.defer(now + self.startup_delay, RefreshReason::Startup);
        self.next_sweep = Some(now + self.interval);
    }

    /// Disarm everything
    pub fn stop(&mut self) {
        self.next_sweep = None;
        self.deferred.clear();
    }

    pub fn is_started(&self) -> bool {
        self.next_sweep.is_some()
    }

    /// Schedule a one-shot sweep for a freshly created or loaded node
    pub fn schedule_node_init(&mut self, now: Instant, node_id: NodeId) {
        self.defer(now + self.node_init_delay, RefreshReason::NodeInitialized(node_id));
    }

    /// Number of one-shot sweeps waiting
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    /// Earliest time anything is due; hosts can sleep or repaint until then
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred
            .iter()
            .map(|d| d.due)
            .chain(self.next_sweep)
            .min()
    }

    /// Take every sweep due at `now`
    ///
    /// One-shot sweeps come first in deadline order, then at most one periodic
    /// sweep. Periodic ticks missed while the host was not polling are
    /// coalesced into that one.
    pub fn due(&mut self, now: Instant) -> Vec<RefreshReason> {
        self.deferred.sort_by_key(|d| d.due);
        let ready = self.deferred.partition_point(|d| d.due <= now);
        let mut reasons: Vec<RefreshReason> = self.deferred.drain(..ready).map(|d| d.reason).collect();

        if let Some(next) = self.next_sweep {
            if next <= now {
                reasons.push(RefreshReason::PeriodicSweep);
                self.next_sweep = self.tick_after(next, now);
            }
        }
        reasons
    }

    /// First tick of the `next + k * interval` series strictly after `now`
    fn tick_after(&self, next: Instant, now: Instant) -> Option<Instant> {
        let into_period = (now - next).as_nanos() % self.interval.as_nanos();
        let into_period = Duration::new(
            (into_period / NANOS_PER_SEC) as u64,
            (into_period % NANOS_PER_SEC) as u32,
        );
        (now - into_period).checked_add(self.interval)
    }

    fn defer(&mut self, due: Instant, reason: RefreshReason) {
        self.deferred.push(Deferred { due, reason });
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::from_config(&PropagationConfig::default())
    }
}
