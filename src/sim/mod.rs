/// Session-level state: levels, the controller state machine,
/// the reset clock, and the events they emit.

pub mod controller;
pub mod event;
pub mod level;
pub mod timer;
