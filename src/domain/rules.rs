/// Roll rules and win/lose rules, truth-table driven.
///
/// Pure functions, no side effects. These encode what a move does and
/// what it means, without committing anything.
///
/// ## Roll Truth Table
///
/// A roll tips the block over one of its bottom edges. Rolling along the
/// block's long axis stands it up (or lays it down); rolling across the
/// long axis just shifts it by one cell.
///
/// ### Left / Right (first axis)
/// ┌─────────────┬─────────────┬──────────┬──────────┐
/// │ Orientation  │ Becomes     │ Left     │ Right    │
/// ├─────────────┼─────────────┼──────────┼──────────┤
/// │ X (lying)    │ Y           │ col −1   │ col +2   │
/// │ Y (standing) │ X           │ col −2   │ col +1   │
/// │ Z (across)   │ Z           │ col −1   │ col +1   │
/// └─────────────┴─────────────┴──────────┴──────────┘
///
/// ### Up / Down (second axis)
/// ┌─────────────┬─────────────┬──────────┬──────────┐
/// │ Orientation  │ Becomes     │ Up       │ Down     │
/// ├─────────────┼─────────────┼──────────┼──────────┤
/// │ Z (lying)    │ Y           │ row −2   │ row +1   │
/// │ Y (standing) │ Z           │ row −1   │ row +2   │
/// │ X (across)   │ X           │ row −1   │ row +1   │
/// └─────────────┴─────────────┴──────────┴──────────┘
///
/// ## Outcome Truth Table (priority order)
/// ┌──────────────────────────────────────┬──────────┐
/// │ Condition                             │ Outcome  │
/// ├──────────────────────────────────────┼──────────┤
/// │ any footprint cell is lethal          │ Lose     │
/// │ standing (Y) and the cell is Exit     │ Win      │
/// │ otherwise                             │ Continue │
/// └──────────────────────────────────────┴──────────┘
///
/// Trigger latches are only resolved on `Continue`.
///
/// `exit_reachable` searches the whole move graph breadth-first, so level
/// loading can refuse a board that can never be won.

use std::collections::{HashSet, VecDeque};

use super::block::{footprint, BlockState, Direction, Footprint, Orientation};
use super::grid::{Cell, Grid};
use super::trigger::{self, TriggerDelta, TriggerState};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
    Continue,
    Win,
    Lose,
}

/// Roll the block one step. Total: defined for every input.
pub fn transition(orientation: Orientation, anchor: Cell, direction: Direction) -> (Orientation, Cell) {
    use Direction::*;
    use Orientation::*;

    let (next, dcol, drow) = match (direction, orientation) {
        (Left, X) => (Y, -1, 0),
        (Right, X) => (Y, 2, 0),
        (Left, Y) => (X, -2, 0),
        (Right, Y) => (X, 1, 0),
        (Left, Z) => (Z, -1, 0),
        (Right, Z) => (Z, 1, 0),

        (Up, Z) => (Y, 0, -2),
        (Down, Z) => (Y, 0, 1),
        (Up, Y) => (Z, 0, -1),
        (Down, Y) => (Z, 0, 2),
        (Up, X) => (X, 0, -1),
        (Down, X) => (X, 0, 1),
    };
    (next, anchor.offset(dcol, drow))
}

/// `transition` over a whole `BlockState`.
pub fn roll(block: BlockState, direction: Direction) -> BlockState {
    let (orientation, anchor) = transition(block.orientation, block.anchor, direction);
    BlockState { orientation, anchor }
}

/// Judge a footprint. Lethality is checked over every covered cell
/// before the exit, so a losing footprint never wins.
pub fn evaluate(
    orientation: Orientation,
    footprint: &Footprint,
    grid: &Grid,
    triggers: TriggerState,
) -> Outcome {
    if footprint.iter().any(|c| trigger::is_lethal_cell(grid, c, triggers)) {
        return Outcome::Lose;
    }
    if orientation.is_standing() && grid.tile(footprint.anchor()).is_exit() {
        return Outcome::Win;
    }
    Outcome::Continue
}

/// Full judgement of a block position: outcome plus the latches it flips.
/// The delta is empty unless the outcome is `Continue`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Verdict {
    pub outcome: Outcome,
    pub delta: TriggerDelta,
}

pub fn judge(block: BlockState, grid: &Grid, triggers: TriggerState) -> Verdict {
    let fp = footprint(block.orientation, block.anchor);
    let outcome = evaluate(block.orientation, &fp, grid, triggers);
    let delta = match outcome {
        Outcome::Continue => trigger::toggles_for(grid, &fp),
        Outcome::Win | Outcome::Lose => TriggerDelta::default(),
    };
    Verdict { outcome, delta }
}

/// Whether any sequence of rolls from `start` ends standing on an Exit.
///
/// The start is judged first, exactly as a level load judges it: a
/// losing start is unwinnable and a Continue start carries its toggles.
/// Search states are (block, latches); the board is finite because every
/// surviving block lies on the grid.
pub fn exit_reachable(start: BlockState, grid: &Grid) -> bool {
    let first = judge(start, grid, TriggerState::default());
    match first.outcome {
        Outcome::Win => return true,
        Outcome::Lose => return false,
        Outcome::Continue => {}
    }

    let origin = (start, TriggerState::default().apply(first.delta));
    let mut visited = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);

    while let Some((block, triggers)) = queue.pop_front() {
        for dir in Direction::ALL {
            let next = roll(block, dir);
            let verdict = judge(next, grid, triggers);
            match verdict.outcome {
                Outcome::Win => return true,
                Outcome::Lose => {}
                Outcome::Continue => {
                    let state = (next, triggers.apply(verdict.delta));
                    if visited.insert(state) {
                        queue.push_back(state);
                    }
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OFF: TriggerState = TriggerState { a: false, b: false };

    fn at(o: Orientation, col: i32, row: i32) -> BlockState {
        BlockState::new(o, Cell::new(col, row))
    }

    // ── transition ──

    #[test]
    fn standing_tips_over_sideways() {
        assert_eq!(roll(at(Orientation::Y, 5, 5), Direction::Right), at(Orientation::X, 6, 5));
        assert_eq!(roll(at(Orientation::Y, 5, 5), Direction::Left), at(Orientation::X, 3, 5));
        assert_eq!(roll(at(Orientation::Y, 5, 5), Direction::Down), at(Orientation::Z, 5, 7));
        assert_eq!(roll(at(Orientation::Y, 5, 5), Direction::Up), at(Orientation::Z, 5, 4));
    }

    #[test]
    fn lying_along_axis_stands_up() {
        assert_eq!(roll(at(Orientation::X, 5, 5), Direction::Right), at(Orientation::Y, 7, 5));
        assert_eq!(roll(at(Orientation::X, 5, 5), Direction::Left), at(Orientation::Y, 4, 5));
        assert_eq!(roll(at(Orientation::Z, 5, 5), Direction::Down), at(Orientation::Y, 5, 6));
        assert_eq!(roll(at(Orientation::Z, 5, 5), Direction::Up), at(Orientation::Y, 5, 3));
    }

    #[test]
    fn lying_across_axis_slides() {
        assert_eq!(roll(at(Orientation::Z, 5, 5), Direction::Right), at(Orientation::Z, 6, 5));
        assert_eq!(roll(at(Orientation::Z, 5, 5), Direction::Left), at(Orientation::Z, 4, 5));
        assert_eq!(roll(at(Orientation::X, 5, 5), Direction::Down), at(Orientation::X, 5, 6));
        assert_eq!(roll(at(Orientation::X, 5, 5), Direction::Up), at(Orientation::X, 5, 4));
    }

    #[test]
    fn standing_block_lands_next_to_itself() {
        // Tipping right from (0,0) covers (1,0) and (2,0): the block never overlaps its old cell.
        let b = roll(at(Orientation::Y, 0, 0), Direction::Right);
        assert_eq!(b.footprint().as_slice(), &[Cell::new(1, 0), Cell::new(2, 0)]);
        let b = roll(at(Orientation::Y, 4, 4), Direction::Up);
        assert_eq!(b.footprint().as_slice(), &[Cell::new(4, 2), Cell::new(4, 3)]);
    }

    // ── evaluate ──

    #[test]
    fn standing_on_exit_wins() {
        let g = Grid::from_codes(&[vec![1u8, 2]]);
        let b = at(Orientation::Y, 1, 0);
        assert_eq!(evaluate(b.orientation, &b.footprint(), &g, OFF), Outcome::Win);
    }

    #[test]
    fn lying_over_exit_does_not_win() {
        let g = Grid::from_codes(&[vec![2u8, 1]]);
        let b = at(Orientation::X, 0, 0);
        assert_eq!(evaluate(b.orientation, &b.footprint(), &g, OFF), Outcome::Continue);
    }

    #[test]
    fn any_lethal_cell_loses() {
        let g = Grid::from_codes(&[vec![1u8, 0, 1]]);
        assert_eq!(judge(at(Orientation::X, 0, 0), &g, OFF).outcome, Outcome::Lose);
        assert_eq!(judge(at(Orientation::X, 1, 0), &g, OFF).outcome, Outcome::Lose);
        // half off the edge
        assert_eq!(judge(at(Orientation::X, 2, 0), &g, OFF).outcome, Outcome::Lose);
        assert_eq!(judge(at(Orientation::Z, 0, 0), &g, OFF).outcome, Outcome::Lose);
    }

    #[test]
    fn closed_gate_is_lethal_open_gate_is_not() {
        let g = Grid::from_codes(&[vec![1u8, 4]]);
        let b = at(Orientation::X, 0, 0);
        assert_eq!(judge(b, &g, OFF).outcome, Outcome::Lose);
        assert_eq!(judge(b, &g, TriggerState { a: true, b: false }).outcome, Outcome::Continue);
    }

    #[test]
    fn only_continue_carries_toggles() {
        let g = Grid::from_codes(&[vec![3u8, 0]]);
        let v = judge(at(Orientation::Y, 0, 0), &g, OFF);
        assert_eq!(v.outcome, Outcome::Continue);
        assert!(v.delta.a);

        // trigger under one half, hole under the other
        let v = judge(at(Orientation::X, 0, 0), &g, OFF);
        assert_eq!(v.outcome, Outcome::Lose);
        assert!(v.delta.is_empty());
    }

    // ── exit_reachable ──

    #[test]
    fn straight_run_to_exit_is_reachable() {
        let g = Grid::from_codes(&[vec![1u8, 1, 1, 2]]);
        assert!(exit_reachable(at(Orientation::Y, 0, 0), &g));
    }

    #[test]
    fn gap_before_exit_is_unreachable() {
        let g = Grid::from_codes(&[vec![1u8, 0, 0, 2]]);
        assert!(!exit_reachable(at(Orientation::Y, 0, 0), &g));
        // the exit exists but a standing block can never land on it
        let g = Grid::from_codes(&[vec![1u8, 2]]);
        assert!(!exit_reachable(at(Orientation::Y, 0, 0), &g));
    }

    #[test]
    fn exit_behind_gate_needs_its_trigger() {
        let open = Grid::from_codes(&[vec![1u8, 3, 1], vec![0u8, 4, 4, 2]]);
        assert!(exit_reachable(at(Orientation::Y, 0, 0), &open));
        // same board with the trigger replaced by plain floor
        let shut = Grid::from_codes(&[vec![1u8, 1, 1], vec![0u8, 4, 4, 2]]);
        assert!(!exit_reachable(at(Orientation::Y, 0, 0), &shut));
    }

    #[test]
    fn start_is_judged_before_searching() {
        let g = Grid::from_codes(&[vec![4u8, 1, 1, 2]]);
        assert!(!exit_reachable(at(Orientation::Y, 0, 0), &g));
        let g = Grid::from_codes(&[vec![1u8, 2]]);
        assert!(exit_reachable(at(Orientation::Y, 1, 0), &g));
    }

    fn any_orientation() -> impl Strategy<Value = Orientation> {
        prop_oneof![Just(Orientation::X), Just(Orientation::Y), Just(Orientation::Z)]
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Left),
            Just(Direction::Right),
            Just(Direction::Up),
            Just(Direction::Down),
        ]
    }

    proptest! {
        #[test]
        fn inverse_roll_restores_block(
            o in any_orientation(),
            d in any_direction(),
            col in -100i32..100,
            row in -100i32..100,
        ) {
            let start = at(o, col, row);
            let back = roll(roll(start, d), d.inverse());
            prop_assert_eq!(back, start);
        }

        #[test]
        fn roll_moves_footprint_off_or_along(
            o in any_orientation(),
            d in any_direction(),
            col in -100i32..100,
            row in -100i32..100,
        ) {
            // Every roll changes the covered cells.
            let start = at(o, col, row);
            let next = roll(start, d);
            prop_assert_ne!(start.footprint(), next.footprint());
        }
    }
}
