/// LevelController: the puzzle state machine for one play session.
///
/// ## Modes
///
///   Loading  ──(initial evaluation)──▶ Playing | Exploded | Finished
///   Playing  ──(Continue)──▶ Playing
///   Playing  ──(Lose)──▶ Exploded ──(explode delay)──▶ Loading (same level)
///   Playing  ──(Win)───▶ Finished ──(finish delay)───▶ Loading (next level)
///
/// ## Move lifecycle
///
///   1. `submit_move(dir)`: accepted only when idle and `Playing`.
///      Computes where the block will land and what that will mean,
///      commits nothing, and marks the controller busy.
///   2. The presentation layer animates the roll however it likes.
///   3. `on_move_animation_complete()` is the single commit point.
///      Block, triggers and mode change here and nowhere else.
///
/// Requests that arrive while busy, or outside `Playing`, are dropped
/// (`MoveResult::Rejected`). They are never queued.
///
/// ## Ownership
///
/// Block and trigger state live only here. Collaborators read them
/// through accessors and never write them.

use std::time::Duration;

use log::{debug, info, warn};

use crate::domain::block::{BlockState, Direction, Footprint, Orientation};
use crate::domain::grid::{Cell, Extents, Grid};
use crate::domain::rules::{self, Outcome, Verdict};
use crate::domain::tile::TileKind;
use crate::domain::trigger::{self, TriggerDelta, TriggerState};
use super::event::GameEvent;
use super::level::{LevelError, LevelSequence};
use super::timer::{PendingReset, ResetKind, ResetTimer};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Loading,
    Playing,
    Exploded,
    Finished,
}

/// Fixed delays before a finished attempt is replaced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Delays {
    pub explode: Duration,
    pub finish: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Delays {
            explode: Duration::from_millis(1200),
            finish: Duration::from_millis(700),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rejection {
    Busy,
    NotPlaying(Mode),
}

/// What an accepted move will do once it completes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AcceptedMove {
    pub direction: Direction,
    pub orientation: Orientation,
    pub anchor: Cell,
    pub outcome: Outcome,
    pub trigger_delta: TriggerDelta,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveResult {
    Rejected(Rejection),
    Accepted(AcceptedMove),
}

impl MoveResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveResult::Accepted(_))
    }
}

/// A roll between acceptance and commit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InFlight {
    pub from: BlockState,
    pub to: BlockState,
    pub verdict: Verdict,
}

/// State handed out on every (re)load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub index: usize,
    pub name: String,
    pub grid: Grid,
    pub extents: Extents,
    pub block: BlockState,
    pub triggers: TriggerState,
    pub mode: Mode,
}

/// A gated cell and whether it should currently be drawn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GatedTile {
    pub cell: Cell,
    pub kind: TileKind,
    pub visible: bool,
}

pub struct LevelController {
    levels: LevelSequence,
    delays: Delays,

    // ── Current level ──
    index: usize,
    grid: Grid,
    extents: Extents,

    // ── Attempt state ──
    block: BlockState,
    triggers: TriggerState,
    mode: Mode,
    in_flight: Option<InFlight>,
    moves: u32,

    // ── Sequencing ──
    reset: ResetTimer,
    attempts: Vec<u32>,

    events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Construction / loading
// ══════════════════════════════════════════════════════════════

impl LevelController {
    /// Create a controller and load `start` (or level 0 if `start` is
    /// out of range).
    pub fn new(levels: LevelSequence, delays: Delays, start: usize) -> Self {
        let len = levels.len();
        let mut ctl = LevelController {
            levels,
            delays,
            index: 0,
            grid: Grid::default(),
            extents: Extents::default(),
            block: BlockState::new(Orientation::Y, Cell::default()),
            triggers: TriggerState::default(),
            mode: Mode::Loading,
            in_flight: None,
            moves: 0,
            reset: ResetTimer::default(),
            attempts: vec![0; len],
            events: vec![],
        };
        let start = if start < len {
            start
        } else {
            warn!("start level {start} out of range ({len} levels), starting at 0");
            0
        };
        ctl.enter(start);
        ctl
    }

    /// Load level `index` of the sequence, replacing the current attempt.
    /// Cancels any pending reset and drops any in-flight move.
    pub fn load_level(&mut self, index: usize) -> Result<LevelSnapshot, LevelError> {
        self.levels.get(index)?;
        Ok(self.enter(index))
    }

    /// Reload the current level.
    pub fn restart_level(&mut self) -> LevelSnapshot {
        self.enter(self.index)
    }

    /// Jump to the next level in sequence.
    pub fn skip_level(&mut self) -> LevelSnapshot {
        self.enter(self.levels.next_index(self.index))
    }

    fn enter(&mut self, index: usize) -> LevelSnapshot {
        if let Some(p) = self.reset.cancel() {
            debug!("cancelled pending {:?}", p.kind);
        }
        self.in_flight = None;
        self.mode = Mode::Loading;

        let level = self.levels.level(index);
        self.index = index;
        self.grid = level.grid.clone();
        self.extents = self.grid.extents();
        self.block = BlockState::new(level.initial_orientation, level.initial_tile);
        self.triggers = TriggerState::default();
        self.moves = 0;
        self.attempts[index] += 1;

        info!(
            "loaded level {} '{}' (attempt {})",
            index + 1, level.name, self.attempts[index]
        );
        self.events.push(GameEvent::LevelLoaded { index });

        // The start position is judged like any other landing.
        let verdict = rules::judge(self.block, &self.grid, self.triggers);
        if verdict.outcome == Outcome::Lose {
            warn!("level {} starts on a lethal cell", index + 1);
        }
        self.settle(verdict);

        self.snapshot()
    }

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            index: self.index,
            name: self.level_name().to_string(),
            grid: self.grid.clone(),
            extents: self.extents,
            block: self.block,
            triggers: self.triggers,
            mode: self.mode,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Moves
// ══════════════════════════════════════════════════════════════

impl LevelController {
    pub fn submit_move(&mut self, direction: Direction) -> MoveResult {
        if self.in_flight.is_some() {
            debug!("{direction:?} dropped: move in flight");
            return MoveResult::Rejected(Rejection::Busy);
        }
        if self.mode != Mode::Playing {
            debug!("{direction:?} dropped: mode {:?}", self.mode);
            return MoveResult::Rejected(Rejection::NotPlaying(self.mode));
        }

        let to = rules::roll(self.block, direction);
        let verdict = rules::judge(to, &self.grid, self.triggers);
        self.in_flight = Some(InFlight { from: self.block, to, verdict });
        debug!("{direction:?}: {:?} → {:?} ({:?})", self.block, to, verdict.outcome);

        MoveResult::Accepted(AcceptedMove {
            direction,
            orientation: to.orientation,
            anchor: to.anchor,
            outcome: verdict.outcome,
            trigger_delta: verdict.delta,
        })
    }

    /// Commit the in-flight move. Returns `false` if nothing was in flight.
    pub fn on_move_animation_complete(&mut self) -> bool {
        let Some(flight) = self.in_flight.take() else {
            return false;
        };

        self.block = flight.to;
        self.moves += 1;
        self.events.push(GameEvent::Rolled { from: flight.from, to: flight.to });

        let verdict = rules::judge(self.block, &self.grid, self.triggers);
        debug_assert_eq!(verdict, flight.verdict, "state changed while a move was in flight");
        self.settle(verdict);
        true
    }

    /// Apply a verdict to the current attempt.
    fn settle(&mut self, verdict: Verdict) {
        match verdict.outcome {
            Outcome::Continue => {
                self.triggers = self.triggers.apply(verdict.delta);
                for id in verdict.delta.flipped() {
                    let now = self.triggers.get(id);
                    debug!("trigger {id:?} → {now}");
                    self.events.push(GameEvent::TriggerToggled { trigger: id, now });
                }
                self.mode = Mode::Playing;
            }
            Outcome::Lose => {
                self.mode = Mode::Exploded;
                info!("level {} exploded after {} moves", self.index + 1, self.moves);
                self.events.push(GameEvent::Exploded { index: self.index });
                self.schedule(ResetKind::Retry { index: self.index }, self.delays.explode);
            }
            Outcome::Win => {
                self.mode = Mode::Finished;
                info!("level {} cleared in {} moves", self.index + 1, self.moves);
                self.events.push(GameEvent::LevelCleared { index: self.index, moves: self.moves });
                let next = self.levels.next_index(self.index);
                self.schedule(ResetKind::Advance { index: next }, self.delays.finish);
            }
        }
    }

    fn schedule(&mut self, kind: ResetKind, delay: Duration) {
        let armed = self.reset.schedule(kind, delay);
        debug_assert!(armed, "a reset was already pending");
    }
}

// ══════════════════════════════════════════════════════════════
// Time
// ══════════════════════════════════════════════════════════════

impl LevelController {
    /// Advance the reset clock. Returns the new level state if a
    /// scheduled reset fired.
    pub fn advance(&mut self, elapsed: Duration) -> Option<LevelSnapshot> {
        let kind = self.reset.advance(elapsed)?;
        Some(self.enter(kind.index()))
    }

    pub fn pending_reset(&self) -> Option<&PendingReset> {
        self.reset.pending()
    }
}

// ══════════════════════════════════════════════════════════════
// Read-only views
// ══════════════════════════════════════════════════════════════

impl LevelController {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn block(&self) -> BlockState {
        self.block
    }

    pub fn footprint(&self) -> Footprint {
        self.block.footprint()
    }

    pub fn triggers(&self) -> TriggerState {
        self.triggers
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level_name(&self) -> &str {
        &self.levels.level(self.index).name
    }

    /// Moves committed in the current attempt.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// How many times level `index` has been loaded this session.
    pub fn attempts(&self, index: usize) -> u32 {
        self.attempts.get(index).copied().unwrap_or(0)
    }

    /// Every gated cell and whether it is currently open.
    pub fn gated_tiles(&self) -> Vec<GatedTile> {
        self.grid
            .cells()
            .filter(|(_, kind)| kind.is_gated())
            .map(|(cell, kind)| GatedTile {
                cell,
                kind,
                visible: trigger::is_passable(kind, self.triggers),
            })
            .collect()
    }

    /// Take the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
