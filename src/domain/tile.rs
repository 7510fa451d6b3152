/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// Level data encodes each kind as a single digit:
///
///   0 = Empty            1 = Regular          2 = Exit
///   3 = Trigger A        4 = Visible when A   5 = Visible when not A
///   6 = Trigger B        7 = Visible when B   8 = Visible when not B

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TileKind {
    #[default]
    Empty,
    Regular,
    Exit,
    TriggerA,
    VisibleWhenA,
    VisibleWhenNotA,
    TriggerB,
    VisibleWhenB,
    VisibleWhenNotB,
}

/// Which of the two latches a trigger or gate belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TriggerId {
    A,
    B,
}

impl TileKind {
    /// Decode a level-data digit. Unknown codes yield `None`.
    pub fn from_code(code: u8) -> Option<TileKind> {
        let kind = match code {
            0 => TileKind::Empty,
            1 => TileKind::Regular,
            2 => TileKind::Exit,
            3 => TileKind::TriggerA,
            4 => TileKind::VisibleWhenA,
            5 => TileKind::VisibleWhenNotA,
            6 => TileKind::TriggerB,
            7 => TileKind::VisibleWhenB,
            8 => TileKind::VisibleWhenNotB,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// The latch this tile flips when covered, if it is a trigger source.
    pub fn trigger_source(self) -> Option<TriggerId> {
        match self {
            TileKind::TriggerA => Some(TriggerId::A),
            TileKind::TriggerB => Some(TriggerId::B),
            _ => None,
        }
    }

    /// Gate condition: `(latch, required value)` for the four gated kinds.
    pub fn gate(self) -> Option<(TriggerId, bool)> {
        match self {
            TileKind::VisibleWhenA => Some((TriggerId::A, true)),
            TileKind::VisibleWhenNotA => Some((TriggerId::A, false)),
            TileKind::VisibleWhenB => Some((TriggerId::B, true)),
            TileKind::VisibleWhenNotB => Some((TriggerId::B, false)),
            _ => None,
        }
    }

    pub fn is_gated(self) -> bool {
        self.gate().is_some()
    }

    pub fn is_exit(self) -> bool {
        matches!(self, TileKind::Exit)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, TileKind::Empty)
    }
}
