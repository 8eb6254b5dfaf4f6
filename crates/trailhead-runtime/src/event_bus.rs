//! Per-frame queue of simulation events

use crate::event::SimEvent;

/// Systems push while a frame runs; the session drains once at the end
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<SimEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.pending.push(event);
    }

    /// Take everything queued this frame, in push order
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
