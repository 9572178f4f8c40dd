//! Request scheduler: FIFO backlog plus a single-flight gate.
//!
//! # State diagram
//!
//! ```text
//!            try_claim_next (backlog non-empty)
//!    Idle ─────────────────────────────────────► Busy
//!     ▲      claim_immediately                    │
//!     │                                           │ release
//!     └───────────────────────────────────────────┘
//!                 (release re-runs try_claim_next;
//!                  a queued request goes straight
//!                  back to Busy)
//! ```
//!
//! There is no error state: fetch failures travel on the loader's error
//! channel and the scheduler is released either way.

use std::collections::VecDeque;

use fsk_schemas::FeedLoadRequest;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Busy,
}

/// Pure, synchronous scheduling state. The loader owns one behind its lock.
#[derive(Debug)]
pub struct RequestScheduler {
    backlog: VecDeque<FeedLoadRequest>,
    state: SchedulerState,
}

impl Default for RequestScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScheduler {
    pub fn new() -> Self {
        Self {
            backlog: VecDeque::new(),
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SchedulerState::Busy
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Queued requests in service order.
    pub fn pending(&self) -> Vec<FeedLoadRequest> {
        self.backlog.iter().cloned().collect()
    }

    /// Append `request` unless an equal request is already queued.
    ///
    /// Returns `false` when the request was dropped as a duplicate. Never
    /// starts execution.
    pub fn enqueue(&mut self, request: FeedLoadRequest) -> bool {
        if self.backlog.contains(&request) {
            debug!(request = %request, "duplicate load request dropped");
            return false;
        }
        debug!(request = %request, backlog = self.backlog.len() + 1, "load request queued");
        self.backlog.push_back(request);
        true
    }

    /// Pop the head of the backlog and go Busy, unless already Busy or the
    /// backlog is empty.
    pub fn try_claim_next(&mut self) -> Option<FeedLoadRequest> {
        if self.is_busy() {
            return None;
        }
        let next = self.backlog.pop_front()?;
        self.state = SchedulerState::Busy;
        debug!(request = %next, remaining = self.backlog.len(), "load request claimed");
        Some(next)
    }

    /// Go Idle, then immediately try to claim the next queued request.
    ///
    /// The returned request (if any) must be executed by the caller; the
    /// scheduler is Busy again in that case.
    pub fn release(&mut self) -> Option<FeedLoadRequest> {
        self.state = SchedulerState::Idle;
        self.try_claim_next()
    }

    /// Claim the gate without touching the backlog (interactive refresh).
    ///
    /// Single check-and-set: returns `false` when already Busy.
    pub fn claim_immediately(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.state = SchedulerState::Busy;
        debug!("gate claimed for immediate load");
        true
    }
}
