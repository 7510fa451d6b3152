/// One-shot scheduled level transitions.
///
/// The controller owns at most one `PendingReset`. Time only moves when
/// the caller advances it, so the whole schedule is deterministic.
/// Unlike a fire-and-forget timeout, a pending reset can be dropped
/// (`cancel`) when a level load is forced from outside.

use std::time::Duration;

/// What happens when the timer fires.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResetKind {
    /// Reload the level at this index (after an explosion).
    Retry { index: usize },
    /// Load the level at this index (after a win).
    Advance { index: usize },
}

impl ResetKind {
    pub fn index(self) -> usize {
        match self {
            ResetKind::Retry { index } | ResetKind::Advance { index } => index,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingReset {
    pub kind: ResetKind,
    remaining: Duration,
}

impl PendingReset {
    pub fn new(kind: ResetKind, delay: Duration) -> Self {
        PendingReset { kind, remaining: delay }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Burn `elapsed`; true once the delay has fully run out.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.remaining.is_zero()
    }
}

/// Holder with at-most-one semantics.
#[derive(Clone, Debug, Default)]
pub struct ResetTimer {
    pending: Option<PendingReset>,
}

impl ResetTimer {
    /// Arm the timer. An already-armed timer is left untouched and
    /// `false` is returned.
    pub fn schedule(&mut self, kind: ResetKind, delay: Duration) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(PendingReset::new(kind, delay));
        true
    }

    pub fn cancel(&mut self) -> Option<PendingReset> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingReset> {
        self.pending.as_ref()
    }

    /// Advance time. Returns the reset to perform if it fired; the
    /// timer is disarmed in that case.
    pub fn advance(&mut self, elapsed: Duration) -> Option<ResetKind> {
        let fired = self.pending.as_mut()?.tick(elapsed);
        if fired {
            self.pending.take().map(|p| p.kind)
        } else {
            None
        }
    }
}
