/// Block Roll: a rolling-block puzzle.
///
/// `domain` holds the pure rules (grid, block, rolls, triggers, outcomes).
/// `sim` sequences them into levels and attempts. `config` reads
/// `config.toml`. The terminal front end lives in the binary.

pub mod config;
pub mod domain;
pub mod sim;

pub use domain::block::{BlockState, Direction, Orientation};
pub use domain::grid::{Cell, Extents, Grid};
pub use domain::rules::Outcome;
pub use domain::tile::{TileKind, TriggerId};
pub use domain::trigger::{TriggerDelta, TriggerState};
pub use sim::controller::{LevelController, Mode, MoveResult};
pub use sim::level::{Level, LevelError, LevelSequence};
