/// Gamepad input using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Roll
///   Start                 →  Restart level
///   R1                    →  Skip level
///   Select                →  Quit
///
/// Rolls are edge-triggered: a held stick produces one roll, and must
/// return through the deadzone before it can produce another.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use blockroll::config::GamepadConfig;
use blockroll::domain::block::Direction;

use super::input::Action;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug)]
struct ActionMap {
    restart: Vec<Btn>,
    skip: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            restart: vec![Btn::Start],
            skip:    vec![Btn::R1],
            cancel:  vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an entry that resolves to nothing
    /// keeps its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let mut map = ActionMap::default();
        let rs = parse_list(&cfg.restart);
        if !rs.is_empty() { map.restart = rs; }
        let sk = parse_list(&cfg.skip);
        if !sk.is_empty() { map.skip = sk; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
        map
    }

    fn action_for(&self, btn: Btn) -> Option<Action> {
        if self.cancel.contains(&btn) {
            Some(Action::Quit)
        } else if self.restart.contains(&btn) {
            Some(Action::Restart)
        } else if self.skip.contains(&btn) {
            Some(Action::Skip)
        } else {
            None
        }
    }
}

/// Digital view of the left stick, one axis at a time.
#[derive(Clone, Copy, Debug, Default)]
struct Stick {
    x: f32,
    y: f32,
    engaged: Option<Direction>,
}

impl Stick {
    /// The direction the stick points past the deadzone, if any.
    /// The dominant axis wins; stick Y is positive upward.
    fn direction(&self) -> Option<Direction> {
        let (ax, ay) = (self.x.abs(), self.y.abs());
        if ax.max(ay) <= STICK_DEADZONE {
            None
        } else if ax >= ay {
            Some(if self.x < 0.0 { Direction::Left } else { Direction::Right })
        } else {
            Some(if self.y > 0.0 { Direction::Up } else { Direction::Down })
        }
    }

    /// Returns a direction only on the frame the stick first crosses
    /// out of the deadzone (or swings to a new direction).
    fn edge(&mut self) -> Option<Direction> {
        let now = self.direction();
        let fresh = match now {
            Some(d) if self.engaged != Some(d) => Some(d),
            _ => None,
        };
        self.engaged = now;
        fresh
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    stick: Stick,
    action_map: ActionMap,
    actions: Vec<Action>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick: Stick::default(),
            action_map: ActionMap::default(),
            actions: Vec::with_capacity(4),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Poll the pad and return the actions pressed since the last call.
    pub fn update(&mut self) -> &[Action] {
        self.actions.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        &self.actions
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick.x = value,
                        Axis::LeftStickY => self.stick.y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick = Stick::default();
                }
                _ => {}
            }
        }

        if let Some(dir) = self.stick.edge() {
            self.actions.push(Action::Roll(dir));
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        // D-pad is not part of the Btn map
        let dpad = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dpad {
            self.actions.push(Action::Roll(dir));
            return;
        }

        if let Some(action) = Btn::from_gilrs(gilrs_btn).and_then(|b| self.action_map.action_for(b)) {
            self.actions.push(action);
        }
    }
}
