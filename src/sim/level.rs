/// Level definitions, validation, and loading.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by file name)
///   2. Built-in embedded levels
///
/// ## Level format (`.txt`):
///   ```text
///   # Level 1 - Name
///   @ Y 1,1
///   111
///   111111
///   0111111112
///   ```
///
///   Line `# ...`: level name (first one wins; later `#` lines are comments)
///   Line `@ <X|Y|Z> col,row`: initial orientation and anchor
///   Other lines: grid rows, one digit per cell (see `TileKind` codes).
///   ` ` and `.` also read as Empty. Rows may be jagged; trailing
///   whitespace and trailing blank rows are dropped.
///
/// ## Validation
///
/// A level must have at least one Exit and one Regular tile. The initial
/// footprint must lie on non-Empty cells that are solid with both latches
/// off, and some sequence of rolls must reach the Exit standing. A
/// sequence must hold at least one level. Violations are configuration
/// errors surfaced to the caller, never recovered from silently.

use std::path::Path;

use log::{debug, error, warn};

use crate::domain::block::{footprint, BlockState, Orientation};
use crate::domain::grid::{Cell, Grid};
use crate::domain::rules;
use crate::domain::tile::TileKind;
use crate::domain::trigger::{self, TriggerState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level sequence is empty")]
    EmptySequence,

    #[error("level '{level}' has no exit tile")]
    NoExit { level: String },

    #[error("level '{level}' has no regular tile")]
    NoRegular { level: String },

    #[error("level '{level}' starts off the grid at ({col},{row})")]
    InitialTileOffGrid { level: String, col: i32, row: i32 },

    #[error("level '{level}' starts on a closed gate at ({col},{row})")]
    InitialTileClosed { level: String, col: i32, row: i32 },

    #[error("level '{level}' has no reachable exit")]
    UnreachableExit { level: String },

    #[error("level index {index} out of range (sequence has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Static, immutable level definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub name: String,
    pub initial_orientation: Orientation,
    pub initial_tile: Cell,
    pub grid: Grid,
}

impl Level {
    pub fn new(name: &str, initial_orientation: Orientation, initial_tile: Cell, grid: Grid) -> Self {
        Level {
            name: name.to_string(),
            initial_orientation,
            initial_tile,
            grid,
        }
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if !self.grid.contains(TileKind::Exit) {
            return Err(LevelError::NoExit { level: self.name.clone() });
        }
        if !self.grid.contains(TileKind::Regular) {
            return Err(LevelError::NoRegular { level: self.name.clone() });
        }
        let start = footprint(self.initial_orientation, self.initial_tile);
        if let Some(cell) = start.iter().find(|&c| self.grid.tile(c).is_empty()) {
            return Err(LevelError::InitialTileOffGrid {
                level: self.name.clone(),
                col: cell.col,
                row: cell.row,
            });
        }
        let closed = start
            .iter()
            .find(|&c| trigger::is_lethal_cell(&self.grid, c, TriggerState::default()));
        if let Some(cell) = closed {
            return Err(LevelError::InitialTileClosed {
                level: self.name.clone(),
                col: cell.col,
                row: cell.row,
            });
        }
        let block = BlockState::new(self.initial_orientation, self.initial_tile);
        if !rules::exit_reachable(block, &self.grid) {
            return Err(LevelError::UnreachableExit { level: self.name.clone() });
        }
        Ok(())
    }
}

/// Ordered, cyclic list of validated levels.
#[derive(Clone, Debug)]
pub struct LevelSequence {
    levels: Vec<Level>,
}

impl LevelSequence {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptySequence);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(LevelSequence { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn get(&self, index: usize) -> Result<&Level, LevelError> {
        self.levels.get(index).ok_or(LevelError::IndexOutOfRange {
            index,
            len: self.levels.len(),
        })
    }

    /// Level at an index already known to be valid.
    pub(crate) fn level(&self, index: usize) -> &Level {
        &self.levels[index]
    }

    /// Index after `index`, wrapping to 0 past the last level.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|l| l.name.as_str())
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build the level sequence: `levels_dir` if it holds valid levels,
/// the embedded set otherwise.
pub fn load_sequence(levels_dir: &Path) -> Result<LevelSequence, LevelError> {
    if levels_dir.is_dir() {
        let mut found = load_from_directory(levels_dir);
        found.sort_by(|a, b| a.0.cmp(&b.0));
        let levels: Vec<Level> = found.into_iter().map(|(_, level)| level).collect();
        if !levels.is_empty() {
            match LevelSequence::new(levels) {
                Ok(seq) => return Ok(seq),
                Err(e) => warn!("{}: {e}; using built-in levels", levels_dir.display()),
            }
        }
    }
    embedded_sequence()
}

/// The built-in levels as a sequence, validated like any other.
pub fn embedded_sequence() -> Result<LevelSequence, LevelError> {
    let seq = embedded_levels().and_then(LevelSequence::new);
    if let Err(e) = &seq {
        error!("built-in levels are broken: {e}");
    }
    seq
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level(content: &str) -> Result<Level, LevelError> {
    let mut name = String::new();
    let mut start: Option<(Orientation, Cell)> = None;
    let mut rows: Vec<Vec<TileKind>> = vec![];

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();

        if let Some(rest) = line.strip_prefix('#') {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
        } else if let Some(rest) = line.strip_prefix('@') {
            start = Some(parse_start(rest, line_no)?);
        } else if line.is_empty() && rows.is_empty() {
            // leading blank lines
        } else {
            rows.push(parse_row(line, line_no)?);
        }
    }

    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }

    let (initial_orientation, initial_tile) = start.ok_or_else(|| LevelError::Parse {
        line: content.lines().count(),
        reason: "missing '@ <orientation> col,row' start line".to_string(),
    })?;

    if rows.is_empty() {
        return Err(LevelError::Parse {
            line: content.lines().count(),
            reason: "no grid rows".to_string(),
        });
    }

    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }

    Ok(Level {
        name,
        initial_orientation,
        initial_tile,
        grid: Grid::new(rows),
    })
}

fn parse_start(rest: &str, line: usize) -> Result<(Orientation, Cell), LevelError> {
    let bad = |reason: &str| LevelError::Parse { line, reason: reason.to_string() };

    let mut parts = rest.split_whitespace();
    let orientation = parts
        .next()
        .and_then(Orientation::from_name)
        .ok_or_else(|| bad("expected orientation X, Y or Z"))?;
    let pos = parts.next().ok_or_else(|| bad("expected col,row"))?;
    let (col, row) = pos.split_once(',').ok_or_else(|| bad("expected col,row"))?;
    let col = col.trim().parse::<i32>().map_err(|_| bad("bad column"))?;
    let row = row.trim().parse::<i32>().map_err(|_| bad("bad row"))?;
    if parts.next().is_some() {
        return Err(bad("trailing text after start position"));
    }
    Ok((orientation, Cell::new(col, row)))
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<TileKind>, LevelError> {
    line.chars()
        .map(|ch| match ch {
            ' ' | '.' => Ok(TileKind::Empty),
            _ => ch
                .to_digit(10)
                .and_then(|d| TileKind::from_code(d as u8))
                .ok_or_else(|| LevelError::Parse {
                    line: line_no,
                    reason: format!("unknown tile '{ch}'"),
                }),
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, Level)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("could not read {}: {e}", dir.display());
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                    continue;
                }
            };
            match parse_level(&content).and_then(|l| l.validate().map(|_| l)) {
                Ok(level) => {
                    let filename = path.file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    debug!("loaded level '{}' from {}", level.name, filename);
                    results.push((filename, level));
                }
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[&str] = &[
    "# Level 1 - First Steps
@ Y 1,1
111
111111
111111111
0111111111
000001121
000000111
",
    "# Level 2 - Drawbridge
@ Y 1,1
1111
1111444411111
1111000011121
1131000001111
",
    "# Level 3 - Crosswired
@ Y 1,2
0000000011
111100001161
111155551111
111100001111
131100001111000111
000000001111777121
000000000000000111
",
    "# Level 4 - Switchback
@ Y 0,0
111
131444111
111000161
000000111
000000888
000000111
000000111777112
000000000000111
",
];

fn embedded_levels() -> Result<Vec<Level>, LevelError> {
    EMBEDDED
        .iter()
        .enumerate()
        .map(|(i, src)| {
            parse_level(src).map_err(|e| {
                error!("built-in level {}: {e}", i + 1);
                e
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_start_and_jagged_rows() {
        let level = parse_level("# Tiny\n@ X 0,1\n12\n113\n").unwrap();
        assert_eq!(level.name, "Tiny");
        assert_eq!(level.initial_orientation, Orientation::X);
        assert_eq!(level.initial_tile, Cell::new(0, 1));
        assert_eq!(level.grid.rows().len(), 2);
        assert_eq!(level.grid.rows()[0].len(), 2);
        assert_eq!(level.grid.tile_at(2, 1), TileKind::TriggerA);
        assert_eq!(level.grid.tile_at(2, 0), TileKind::Empty);
    }

    #[test]
    fn spaces_and_dots_are_empty_and_trailing_rows_drop() {
        let level = parse_level("@ Y 0,0\n1 .2   \n\n\n").unwrap();
        assert_eq!(level.grid.rows(), &[vec![
            TileKind::Regular, TileKind::Empty, TileKind::Empty, TileKind::Exit,
        ]]);
        assert_eq!(level.name, "Unnamed Level");
    }

    #[test]
    fn later_hash_lines_are_comments() {
        let level = parse_level("# Name\n# comment\n@ Y 0,0\n12\n").unwrap();
        assert_eq!(level.name, "Name");
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let err = parse_level("# A\n@ Y 0,0\n12\n1x\n").unwrap_err();
        assert_eq!(err, LevelError::Parse { line: 4, reason: "unknown tile 'x'".into() });

        let err = parse_level("# A\n@ Q 0,0\n12\n").unwrap_err();
        assert!(matches!(err, LevelError::Parse { line: 2, .. }));

        let err = parse_level("# A\n@ Y 0;0\n12\n").unwrap_err();
        assert!(matches!(err, LevelError::Parse { line: 2, .. }));

        assert!(matches!(parse_level("# A\n12\n"), Err(LevelError::Parse { .. })));
        assert!(matches!(parse_level("# A\n@ Y 0,0\n"), Err(LevelError::Parse { .. })));
    }

    #[test]
    fn validation_rejects_missing_exit_and_regular() {
        let no_exit = Level::new("a", Orientation::Y, Cell::new(0, 0), Grid::from_codes(&[vec![1u8, 1]]));
        assert_eq!(no_exit.validate(), Err(LevelError::NoExit { level: "a".into() }));

        let no_regular = Level::new("b", Orientation::Y, Cell::new(0, 0), Grid::from_codes(&[vec![3u8, 2]]));
        assert_eq!(no_regular.validate(), Err(LevelError::NoRegular { level: "b".into() }));
    }

    #[test]
    fn validation_rejects_start_off_grid() {
        let grid = Grid::from_codes(&[vec![1u8, 1, 2]]);
        let off = Level::new("c", Orientation::Y, Cell::new(-1, 0), grid.clone());
        assert!(matches!(off.validate(), Err(LevelError::InitialTileOffGrid { col: -1, row: 0, .. })));

        // second half of a lying block hangs off the end
        let half = Level::new("d", Orientation::X, Cell::new(2, 0), grid.clone());
        assert!(matches!(half.validate(), Err(LevelError::InitialTileOffGrid { col: 3, row: 0, .. })));

        let hole = Level::new("e", Orientation::Y, Cell::new(0, 0), Grid::from_codes(&[vec![0u8, 1, 2]]));
        assert!(matches!(hole.validate(), Err(LevelError::InitialTileOffGrid { .. })));

        let ok = Level::new("f", Orientation::X, Cell::new(0, 0), grid);
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_start_on_closed_gate() {
        let gate = Level::new("g", Orientation::Y, Cell::new(0, 0), Grid::from_codes(&[vec![4u8, 1, 2]]));
        assert_eq!(
            gate.validate(),
            Err(LevelError::InitialTileClosed { level: "g".into(), col: 0, row: 0 })
        );
        assert!(LevelSequence::new(vec![gate]).is_err());

        // a gate that is open while A is off is fine to start on
        let open = Level::new("h", Orientation::Y, Cell::new(0, 0), Grid::from_codes(&[vec![5u8, 1, 1, 2]]));
        assert_eq!(open.validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_unreachable_exit() {
        let gap = Level::new("u", Orientation::Y, Cell::new(0, 0), Grid::from_codes(&[vec![1u8, 0, 0, 2]]));
        assert_eq!(gap.validate(), Err(LevelError::UnreachableExit { level: "u".into() }));

        // parsed levels go through the same check
        let err = parse_level("# Short\n@ Y 0,0\n12\n").and_then(|l| l.validate()).unwrap_err();
        assert_eq!(err, LevelError::UnreachableExit { level: "Short".into() });
    }

    #[test]
    fn sequence_wraps_and_bounds_checks() {
        assert_eq!(LevelSequence::new(vec![]).unwrap_err(), LevelError::EmptySequence);

        let seq = embedded_sequence().unwrap();
        assert_eq!(seq.next_index(0), 1);
        assert_eq!(seq.next_index(seq.len() - 1), 0);
        assert_eq!(
            seq.get(seq.len()).unwrap_err(),
            LevelError::IndexOutOfRange { index: seq.len(), len: seq.len() }
        );
    }

    #[test]
    fn embedded_levels_all_parse_and_validate() {
        let levels = embedded_levels().unwrap();
        assert_eq!(levels.len(), EMBEDDED.len());
        let seq = LevelSequence::new(levels).unwrap();
        assert_eq!(seq.names().next(), Some("Level 1 - First Steps"));
    }

    #[test]
    fn missing_directory_falls_back_to_embedded() {
        let seq = load_sequence(Path::new("/nonexistent/blockroll/levels")).unwrap();
        assert_eq!(seq.len(), EMBEDDED.len());
    }
}
