/// Trigger latches and gated-tile passability.
///
/// Two latches, A and B, start `false` on every level load. Covering a
/// `TriggerA`/`TriggerB` tile with any footprint cell flips the latch.
/// It is a flip, not a set: visiting the same trigger twice restores
/// the previous state. Both latches may flip on one move.
///
/// ## Passability
/// ┌──────────────────┬───────────┐
/// │ Tile              │ Passable? │
/// ├──────────────────┼───────────┤
/// │ Empty             │ never     │
/// │ VisibleWhenA      │ a         │
/// │ VisibleWhenNotA   │ !a        │
/// │ VisibleWhenB      │ b         │
/// │ VisibleWhenNotB   │ !b        │
/// │ anything else     │ always    │
/// └──────────────────┴───────────┘

use super::block::Footprint;
use super::grid::{Cell, Grid};
use super::tile::{TileKind, TriggerId};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TriggerState {
    pub a: bool,
    pub b: bool,
}

impl TriggerState {
    pub fn get(&self, id: TriggerId) -> bool {
        match id {
            TriggerId::A => self.a,
            TriggerId::B => self.b,
        }
    }

    /// Apply a set of flips.
    pub fn apply(self, delta: TriggerDelta) -> TriggerState {
        TriggerState { a: self.a ^ delta.a, b: self.b ^ delta.b }
    }
}

/// Which latches flipped on a move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TriggerDelta {
    pub a: bool,
    pub b: bool,
}

impl TriggerDelta {
    pub fn is_empty(&self) -> bool {
        !self.a && !self.b
    }

    /// Latches that flipped, A before B.
    pub fn flipped(&self) -> impl Iterator<Item = TriggerId> {
        let a = self.a.then_some(TriggerId::A);
        let b = self.b.then_some(TriggerId::B);
        a.into_iter().chain(b)
    }
}

pub fn is_passable(tile: TileKind, triggers: TriggerState) -> bool {
    if tile.is_empty() {
        return false;
    }
    match tile.gate() {
        Some((id, wanted)) => triggers.get(id) == wanted,
        None => true,
    }
}

/// Off the grid, `Empty`, or a gate that is currently closed.
pub fn is_lethal_cell(grid: &Grid, cell: Cell, triggers: TriggerState) -> bool {
    if !grid.in_bounds(cell) {
        return true;
    }
    !is_passable(grid.tile(cell), triggers)
}

/// Which latches the footprint flips. Every cell is inspected.
pub fn toggles_for(grid: &Grid, footprint: &Footprint) -> TriggerDelta {
    let mut delta = TriggerDelta::default();
    for cell in footprint.iter() {
        match grid.tile(cell).trigger_source() {
            Some(TriggerId::A) => delta.a = true,
            Some(TriggerId::B) => delta.b = true,
            None => {}
        }
    }
    delta
}

pub fn resolve_toggles(grid: &Grid, footprint: &Footprint, triggers: TriggerState) -> TriggerState {
    triggers.apply(toggles_for(grid, footprint))
}
