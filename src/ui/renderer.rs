/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The board is drawn top-down, row 0 at the top, two terminal columns
/// per grid cell, centered on the level's extents. Extents only position
/// the board: every row is drawn in full, so exits and gates past the
/// last Regular tile still show. The renderer only reads the controller;
/// it never drives it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use blockroll::domain::block::{BlockState, Orientation};
use blockroll::domain::grid::{Cell, Extents};
use blockroll::domain::tile::{TileKind, TriggerId};
use blockroll::sim::controller::{LevelController, Mode};

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// gap between rows matches on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Glyph::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Glyph { ch, fg, bg }
    }
}

// ── Palette ──

const FLOOR_BG: Color = Color::Rgb { r: 78, g: 80, b: 104 };
const FLOOR_FG: Color = Color::Rgb { r: 110, g: 112, b: 140 };
const EXIT_FG: Color = Color::Rgb { r: 255, g: 196, b: 64 };
const A_FG: Color = Color::Rgb { r: 255, g: 140, b: 60 };
const B_FG: Color = Color::Rgb { r: 80, g: 200, b: 255 };
const GATE_BG: Color = Color::Rgb { r: 52, g: 56, b: 72 };
const BLOCK_FG: Color = Color::Rgb { r: 214, g: 110, b: 70 };
const BLOCK_WIN_FG: Color = EXIT_FG;
const BLOCK_DEAD_FG: Color = Color::Rgb { r: 230, g: 40, b: 40 };
const GHOST_FG: Color = Color::Rgb { r: 150, g: 100, b: 80 };
const DIM_FG: Color = Color::Rgb { r: 120, g: 120, b: 140 };

fn trigger_color(id: TriggerId) -> Color {
    match id {
        TriggerId::A => A_FG,
        TriggerId::B => B_FG,
    }
}

/// The two-column glyph for a tile, or `None` where nothing is drawn
/// (empty cells and closed gates).
fn tile_glyphs(kind: TileKind, open: bool) -> Option<[Glyph; 2]> {
    let pair = |l: char, r: char, fg: Color, bg: Color| Some([Glyph::new(l, fg, bg), Glyph::new(r, fg, bg)]);
    match kind {
        TileKind::Empty => None,
        TileKind::Regular => pair('▪', ' ', FLOOR_FG, FLOOR_BG),
        TileKind::Exit => pair('▒', '▒', EXIT_FG, Glyph::BASE_BG),
        TileKind::TriggerA | TileKind::TriggerB => {
            let id = kind.trigger_source()?;
            pair('(', ')', trigger_color(id), FLOOR_BG)
        }
        _ => {
            let (id, _) = kind.gate()?;
            if open {
                pair('═', '═', trigger_color(id), GATE_BG)
            } else {
                None
            }
        }
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Loading => "LOADING",
        Mode::Playing => "PLAY",
        Mode::Exploded => "CRASHED",
        Mode::Finished => "CLEAR",
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, glyphs: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.glyphs = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.glyphs.fill(Glyph::BLANK);
    }

    fn invalidate(&mut self) {
        self.glyphs.fill(Glyph::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Glyph::new(ch, fg, Glyph::BASE_BG));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        self.put_str(self.width.saturating_sub(len) / 2, y, s, fg);
    }
}

// ── Renderer ──

/// Each grid cell is two terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Where the board lands on screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Layout {
    origin_x: usize,
    rows: usize,
}

impl Layout {
    /// Center on `extents`; `rows` is the grid's real row count.
    fn centered(extents: Extents, rows: usize, term_w: usize) -> Self {
        let map_w = extents.width * CELL_W;
        Layout {
            origin_x: term_w.saturating_sub(map_w) / 2,
            rows: rows.max(extents.depth),
        }
    }

    /// Screen column/row of a grid cell; `None` above or left of the
    /// board. The frame buffer clips anything past the screen edge.
    fn place(&self, cell: Cell) -> Option<(usize, usize)> {
        let col = usize::try_from(cell.col).ok()?;
        let row = usize::try_from(cell.row).ok()?;
        Some((self.origin_x + col * CELL_W, MAP_ROW + row))
    }

    fn bottom(&self) -> usize {
        MAP_ROW + self.rows
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_scene: Option<(usize, Mode)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_scene: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.invalidate();

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, ctl: &LevelController) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        // New level or new mode → clean slate
        let scene = (ctl.level_index(), ctl.mode());
        if self.last_scene != Some(scene) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
            self.last_scene = Some(scene);
        }

        self.front.clear();
        self.compose(ctl);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Glyph::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }
                queue!(self.writer, Print(g.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, ctl: &LevelController) {
        let layout = Layout::centered(ctl.extents(), ctl.grid().row_count(), self.front.width);

        self.compose_hud(ctl);
        self.compose_board(ctl, &layout);
        self.compose_block(ctl, &layout);
        self.compose_footer(ctl, &layout);
    }

    fn compose_hud(&mut self, ctl: &LevelController) {
        let t = ctl.triggers();
        let lamp = |on: bool| if on { '●' } else { '○' };
        let left = format!(
            " LEVEL {}/{}  {}  [{}]",
            ctl.level_index() + 1,
            ctl.level_count(),
            ctl.level_name(),
            mode_label(ctl.mode())
        );
        let right = format!(
            "MOVES {:>3}  TRY {:>2}  A{} B{} ",
            ctl.moves(),
            ctl.attempts(ctl.level_index()),
            lamp(t.a),
            lamp(t.b)
        );
        self.front.put_str(0, HUD_ROW, &left, Color::White);
        let x = self.front.width.saturating_sub(right.chars().count());
        self.front.put_str(x, HUD_ROW, &right, DIM_FG);
    }

    fn compose_board(&mut self, ctl: &LevelController, layout: &Layout) {
        // Fixed tiles straight from the grid, gates as the controller sees them
        let fixed = ctl
            .grid()
            .cells()
            .filter(|(_, kind)| !kind.is_gated())
            .map(|(cell, kind)| (cell, kind, true));
        let gates = ctl.gated_tiles().into_iter().map(|g| (g.cell, g.kind, g.visible));

        for (cell, kind, open) in fixed.chain(gates) {
            let Some((x, y)) = layout.place(cell) else { continue };
            if let Some([l, r]) = tile_glyphs(kind, open) {
                self.front.set(x, y, l);
                self.front.set(x + 1, y, r);
            }
        }
    }

    fn compose_block(&mut self, ctl: &LevelController, layout: &Layout) {
        // Destination ghost first so the block itself stays on top
        if let Some(flight) = ctl.in_flight() {
            self.paint_block(flight.to, layout, '░', GHOST_FG);
        }
        let (ch, fg) = match ctl.mode() {
            Mode::Exploded => ('✶', BLOCK_DEAD_FG),
            Mode::Finished => ('█', BLOCK_WIN_FG),
            Mode::Loading | Mode::Playing => ('█', BLOCK_FG),
        };
        self.paint_block(ctl.block(), layout, ch, fg);
    }

    fn paint_block(&mut self, block: BlockState, layout: &Layout, ch: char, fg: Color) {
        // A standing block is a single cell; mark it so it reads as "upright"
        let standing = block.orientation == Orientation::Y;
        for cell in block.footprint().iter() {
            let Some((x, y)) = layout.place(cell) else { continue };
            let bg = self.front.get(x, y).bg;
            let right = if standing && ch == '█' { '▌' } else { ch };
            self.front.set(x, y, Glyph::new(ch, fg, bg));
            self.front.set(x + 1, y, Glyph::new(right, fg, bg));
        }
    }

    fn compose_footer(&mut self, ctl: &LevelController, layout: &Layout) {
        let msg_row = layout.bottom() + 1;
        match ctl.mode() {
            Mode::Exploded => self.front.put_centered(msg_row, "*** CRASH! retrying ***", BLOCK_DEAD_FG),
            Mode::Finished => {
                let msg = format!("LEVEL CLEAR in {} moves", ctl.moves());
                self.front.put_centered(msg_row, &msg, EXIT_FG);
            }
            Mode::Loading | Mode::Playing => {}
        }

        let help = "←↑↓→/WASD roll   R restart   N skip   Q quit";
        let help_row = (msg_row + 2).min(self.front.height.saturating_sub(1));
        self.front.put_centered(help_row, help, DIM_FG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockroll::domain::grid::Grid;
    use blockroll::sim::controller::Delays;
    use blockroll::sim::level::{Level, LevelSequence};
    use blockroll::Direction;

    fn controller(rows: &[&[u8]]) -> LevelController {
        let level = Level::new("t", Orientation::Y, Cell::new(0, 0), Grid::from_codes(rows));
        LevelController::new(LevelSequence::new(vec![level]).unwrap(), Delays::default(), 0)
    }

    fn composed(ctl: &LevelController, w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.compose(ctl);
        r
    }

    #[test]
    fn layout_centers_on_extents_without_clipping_to_them() {
        let l = Layout::centered(Extents { width: 4, depth: 2 }, 3, 20);
        assert_eq!(l.place(Cell::new(0, 0)), Some((6, MAP_ROW)));
        assert_eq!(l.place(Cell::new(3, 1)), Some((12, MAP_ROW + 1)));
        // past the extents but still on the grid
        assert_eq!(l.place(Cell::new(5, 2)), Some((16, MAP_ROW + 2)));
        assert_eq!(l.place(Cell::new(0, -1)), None);
        assert_eq!(l.bottom(), MAP_ROW + 3);
    }

    #[test]
    fn exit_past_the_last_regular_tile_is_drawn() {
        let ctl = controller(&[&[1, 1, 1, 2]]);
        assert_eq!(ctl.extents(), Extents { width: 3, depth: 1 });
        let r = composed(&ctl, 40, 10);
        let l = Layout::centered(ctl.extents(), 1, 40);

        let (x, y) = l.place(Cell::new(3, 0)).unwrap();
        assert_eq!(r.front.get(x, y).ch, '▒');
        assert_eq!(r.front.get(x, y).fg, EXIT_FG);
    }

    #[test]
    fn gates_follow_the_controller() {
        let mut ctl = controller(&[&[1, 3, 1], &[0, 4, 4, 2]]);
        let l = Layout::centered(ctl.extents(), 2, 40);
        let (x, y) = l.place(Cell::new(1, 1)).unwrap();

        let r = composed(&ctl, 40, 10);
        assert_eq!(r.front.get(x, y), Glyph::BLANK);

        ctl.submit_move(Direction::Right);
        ctl.on_move_animation_complete();
        assert!(ctl.gated_tiles().iter().all(|g| g.visible));
        let r = composed(&ctl, 40, 10);
        assert_eq!(r.front.get(x, y).ch, '═');
    }

    #[test]
    fn closed_gates_are_not_drawn() {
        assert!(tile_glyphs(TileKind::VisibleWhenA, false).is_none());
        assert!(tile_glyphs(TileKind::VisibleWhenA, true).is_some());
        assert!(tile_glyphs(TileKind::Empty, true).is_none());
    }

    #[test]
    fn block_and_ghost_are_painted() {
        let mut ctl = controller(&[&[1, 1, 1, 2]]);
        ctl.submit_move(Direction::Right);
        let r = composed(&ctl, 20, 10);
        let l = Layout::centered(ctl.extents(), 1, 20);

        let (x, y) = l.place(Cell::new(0, 0)).unwrap();
        assert_eq!(r.front.get(x, y).ch, '█');
        let (x, y) = l.place(Cell::new(2, 0)).unwrap();
        assert_eq!(r.front.get(x, y).ch, '░');
    }

    #[test]
    fn hud_shows_level_and_moves() {
        let ctl = controller(&[&[1, 1, 1, 2]]);
        let r = composed(&ctl, 60, 10);
        let row: String = (0..60).map(|x| r.front.get(x, HUD_ROW).ch).collect();
        assert!(row.contains("LEVEL 1/1  t  [PLAY]"));
        assert!(row.contains("MOVES   0"));
    }
}
