/// Level grid: jagged rows of tile kinds.
///
/// ## Bounds
///
/// Rows may have different lengths. Any `(col, row)` outside the grid,
/// including negative coordinates and columns past the end of a short row,
/// reads as `TileKind::Empty`. Out of bounds is never an error.
///
/// ## Extents
///
/// `extents()` derives a bounding box used only for centering the grid on
/// screen. It carries no gameplay meaning.

use super::tile::TileKind;

/// A grid coordinate. `col` is the first axis (Left/Right),
/// `row` the second (Up/Down). Signed so that a roll past the
/// top or left edge is representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Cell { col, row }
    }

    pub const fn offset(self, dcol: i32, drow: i32) -> Self {
        Cell { col: self.col + dcol, row: self.row + drow }
    }
}

/// Presentation bounding box of a grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Extents {
    pub width: usize,
    pub depth: usize,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Grid {
    rows: Vec<Vec<TileKind>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<TileKind>>) -> Self {
        Grid { rows }
    }

    /// Build from numeric tile codes. Unknown codes read as `Empty`.
    pub fn from_codes<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let rows = rows
            .iter()
            .map(|r| {
                r.as_ref()
                    .iter()
                    .map(|&c| TileKind::from_code(c).unwrap_or_default())
                    .collect()
            })
            .collect();
        Grid { rows }
    }

    pub fn rows(&self) -> &[Vec<TileKind>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Tile at `(col, row)`; `Empty` for anything off the grid.
    #[inline]
    pub fn tile_at(&self, col: i32, row: i32) -> TileKind {
        if row < 0 || col < 0 {
            return TileKind::Empty;
        }
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(TileKind::Empty)
    }

    #[inline]
    pub fn tile(&self, cell: Cell) -> TileKind {
        self.tile_at(cell.col, cell.row)
    }

    /// Is `cell` inside the jagged grid (regardless of its kind)?
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && self
                .rows
                .get(cell.row as usize)
                .is_some_and(|r| (cell.col as usize) < r.len())
    }

    /// Every in-bounds cell with its kind, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, TileKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, &kind)| (Cell::new(c as i32, r as i32), kind))
        })
    }

    pub fn contains(&self, kind: TileKind) -> bool {
        self.rows.iter().any(|r| r.contains(&kind))
    }

    /// Bounding extents keyed on the last `Regular` tile.
    ///
    /// `depth` = index of the last row holding a `Regular` + 1, or the row
    /// count when no row does. `width` = max over rows of (index of that
    /// row's last `Regular` + 1), using the row's own length for rows
    /// without one.
    pub fn extents(&self) -> Extents {
        let depth = self
            .rows
            .iter()
            .rposition(|r| r.contains(&TileKind::Regular))
            .map(|i| i + 1)
            .unwrap_or(self.rows.len());

        let width = self
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .rposition(|&t| t == TileKind::Regular)
                    .map(|i| i + 1)
                    .unwrap_or(r.len())
            })
            .max()
            .unwrap_or(0);

        Extents { width, depth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_empty() {
        let g = Grid::from_codes(&[vec![1u8, 1, 1], vec![1u8]]);
        assert_eq!(g.tile_at(-1, 0), TileKind::Empty);
        assert_eq!(g.tile_at(0, -1), TileKind::Empty);
        assert_eq!(g.tile_at(3, 0), TileKind::Empty);
        assert_eq!(g.tile_at(0, 2), TileKind::Empty);
        // jagged: second row is only one wide
        assert_eq!(g.tile_at(1, 1), TileKind::Empty);
        assert_eq!(g.tile_at(0, 1), TileKind::Regular);
    }

    #[test]
    fn in_bounds_respects_row_length() {
        let g = Grid::from_codes(&[vec![0u8, 0, 1], vec![1u8]]);
        assert!(g.in_bounds(Cell::new(0, 0)));
        assert!(g.in_bounds(Cell::new(2, 0)));
        assert!(!g.in_bounds(Cell::new(1, 1)));
        assert!(!g.in_bounds(Cell::new(-1, 0)));
    }

    #[test]
    fn extents_track_last_regular_tile() {
        let g = Grid::from_codes(&[
            vec![1u8, 1, 0, 0],
            vec![0, 1, 1, 2, 0],
            vec![0, 0, 0],
        ]);
        // last row with a Regular is index 1
        // row 0 → 2, row 1 → 3, row 2 has none → its length 3
        assert_eq!(g.extents(), Extents { width: 3, depth: 2 });
    }

    #[test]
    fn extents_without_regular_fall_back_to_lengths() {
        let g = Grid::from_codes(&[vec![2u8, 0], vec![0u8, 0, 0, 0]]);
        assert_eq!(g.extents(), Extents { width: 4, depth: 2 });
        assert_eq!(Grid::default().extents(), Extents { width: 0, depth: 0 });
    }

    #[test]
    fn cells_iterates_row_major() {
        let g = Grid::from_codes(&[vec![1u8, 2], vec![3u8]]);
        let cells: Vec<_> = g.cells().collect();
        assert_eq!(cells, vec![
            (Cell::new(0, 0), TileKind::Regular),
            (Cell::new(1, 0), TileKind::Exit),
            (Cell::new(0, 1), TileKind::TriggerA),
        ]);
    }
}
