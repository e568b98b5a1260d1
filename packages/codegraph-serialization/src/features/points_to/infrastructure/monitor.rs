//! Progress monitors

use crate::features::points_to::ports::ProgressMonitor;
use std::cell::Cell;
use tracing::{debug, info};

/// Silent monitor; still honours `cancel`
#[derive(Debug, Default)]
pub struct NullMonitor {
    canceled: bool,
}

impl NullMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressMonitor for NullMonitor {
    fn begin_task(&mut self, _name: &str, _total_units: usize) {}

    fn sub_task(&mut self, _name: &str) {}

    fn worked(&mut self, _units: usize) {}

    fn done(&mut self) {}

    fn cancel(&mut self) {
        self.canceled = true;
    }

    fn is_canceled(&self) -> bool {
        self.canceled
    }
}

/// Reports progress through `tracing`
#[derive(Debug, Default)]
pub struct TracingMonitor {
    task: String,
    total_units: usize,
    worked: usize,
    canceled: bool,
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn worked_units(&self) -> usize {
        self.worked
    }
}

impl ProgressMonitor for TracingMonitor {
    fn begin_task(&mut self, name: &str, total_units: usize) {
        self.task = name.to_string();
        self.total_units = total_units;
        self.worked = 0;
        info!("{}: started", name);
    }

    fn sub_task(&mut self, name: &str) {
        debug!("{}: {}", self.task, name);
    }

    fn worked(&mut self, units: usize) {
        self.worked += units;
        if self.total_units > 0 {
            debug!("{}: {}/{} units", self.task, self.worked, self.total_units);
        }
    }

    fn done(&mut self) {
        info!("{}: done after {} units", self.task, self.worked);
    }

    fn cancel(&mut self) {
        info!("{}: cancellation requested", self.task);
        self.canceled = true;
    }

    fn is_canceled(&self) -> bool {
        self.canceled
    }
}

/// Reports cancellation from the `n + 1`-th poll on
#[derive(Debug)]
pub struct CancelAfter {
    remaining: Cell<usize>,
    canceled: Cell<bool>,
}

impl CancelAfter {
    pub fn new(polls: usize) -> Self {
        Self {
            remaining: Cell::new(polls),
            canceled: Cell::new(false),
        }
    }
}

impl ProgressMonitor for CancelAfter {
    fn begin_task(&mut self, _name: &str, _total_units: usize) {}

    fn sub_task(&mut self, _name: &str) {}

    fn worked(&mut self, _units: usize) {}

    fn done(&mut self) {}

    fn cancel(&mut self) {
        self.canceled.set(true);
    }

    fn is_canceled(&self) -> bool {
        if self.canceled.get() {
            return true;
        }
        match self.remaining.get() {
            0 => {
                self.canceled.set(true);
                true
            }
            n => {
                self.remaining.set(n - 1);
                false
            }
        }
    }
}
