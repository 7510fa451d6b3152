/// Terminal front end: input, rendering and sound.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
