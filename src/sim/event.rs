/// Events emitted by controller transitions.
/// The presentation layer consumes these for sound and messages.

use crate::domain::block::BlockState;
use crate::domain::tile::TriggerId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelLoaded { index: usize },
    Rolled { from: BlockState, to: BlockState },
    TriggerToggled { trigger: TriggerId, now: bool },
    Exploded { index: usize },
    LevelCleared { index: usize, moves: u32 },
}
