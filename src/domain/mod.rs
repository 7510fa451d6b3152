/// Pure puzzle data and rules. Nothing here knows about time,
/// input devices, or the terminal.

pub mod block;
pub mod grid;
pub mod rules;
pub mod tile;
pub mod trigger;
