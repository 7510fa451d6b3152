/// The block: orientation + anchor cell, and the cells it covers.
///
/// The block is 1×1×2. Standing (`Y`) it covers one cell; lying it covers
/// two adjacent cells along the first axis (`X`) or second axis (`Z`).
/// The anchor is always the smaller covered cell: leftmost for `X`,
/// topmost for `Z`, the only cell for `Y`.

use super::grid::Cell;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    /// Lying along the first axis (columns).
    X,
    /// Standing upright.
    Y,
    /// Lying along the second axis (rows).
    Z,
}

impl Orientation {
    pub fn is_standing(self) -> bool {
        self == Orientation::Y
    }

    pub fn from_name(s: &str) -> Option<Orientation> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Some(Orientation::X),
            "Y" => Some(Orientation::Y),
            "Z" => Some(Orientation::Z),
            _ => None,
        }
    }
}

/// Directional command. Left/Right move along columns,
/// Up/Down along rows (Up = towards row 0).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    pub fn inverse(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockState {
    pub orientation: Orientation,
    pub anchor: Cell,
}

impl BlockState {
    pub fn new(orientation: Orientation, anchor: Cell) -> Self {
        BlockState { orientation, anchor }
    }

    pub fn footprint(&self) -> Footprint {
        footprint(self.orientation, self.anchor)
    }
}

/// Cells covered by the block, anchor first. One or two cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Footprint {
    cells: [Cell; 2],
    len: usize,
}

impl Footprint {
    fn single(cell: Cell) -> Self {
        Footprint { cells: [cell, cell], len: 1 }
    }

    fn pair(first: Cell, second: Cell) -> Self {
        Footprint { cells: [first, second], len: 2 }
    }

    pub fn as_slice(&self) -> &[Cell] {
        &self.cells[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn anchor(&self) -> Cell {
        self.cells[0]
    }
}

/// Cells occupied by a block with `orientation` anchored at `anchor`.
pub fn footprint(orientation: Orientation, anchor: Cell) -> Footprint {
    match orientation {
        Orientation::Y => Footprint::single(anchor),
        Orientation::X => Footprint::pair(anchor, anchor.offset(1, 0)),
        Orientation::Z => Footprint::pair(anchor, anchor.offset(0, 1)),
    }
}
