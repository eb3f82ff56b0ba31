//! Test and helper sinks for robo_core

use std::sync::{Arc, Mutex};

use crate::publish::{PublishCycle, StateSink};

/// A sink that discards every cycle; useful when only the bus side matters.
pub struct NullSink;

impl StateSink for NullSink {
    fn publish(&mut self, _cycle: &PublishCycle) {}
}

/// A sink that keeps every cycle; clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingSink {
    cycles: Arc<Mutex<Vec<PublishCycle>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles(&self) -> Vec<PublishCycle> {
        self.cycles.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<PublishCycle> {
        self.cycles.lock().ok().and_then(|c| c.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.cycles.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateSink for RecordingSink {
    fn publish(&mut self, cycle: &PublishCycle) {
        if let Ok(mut c) = self.cycles.lock() {
            c.push(cycle.clone());
        }
    }
}
