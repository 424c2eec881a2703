/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Japanese text is drawn as wide cells: the glyph cell is followed by a
/// continuation cell that is never printed.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::app::{AppState, Feedback, Phase};
use crate::domain::entity::{Direction, Position};
use crate::domain::tile::{DoorState, Tile};
use crate::sim::commands::{Availability, COMMANDS};
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // true = this char occupies 2 terminal columns
    cont: bool, // true = right half of the previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells. Using the
    /// same RGB for `Clear` and every cell keeps VTE row gaps invisible.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("?")
    }
}

/// East Asian wide ranges used by the game's text: kana, CJK ideographs,
/// CJK punctuation and fullwidth forms.
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

/// Terminal columns needed for `s`.
fn text_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write text at (x, y). Wide characters take two columns; one that
    /// would straddle the right edge is dropped. Returns the column after
    /// the last character written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if is_wide(ch) {
                if cx + 1 >= self.width {
                    break;
                }
                self.set(cx, y, Cell::from_char_wide(ch, fg, bg));
                let mut cont = Cell::WIDE_CONT;
                cont.bg = Cell::norm_bg(bg);
                self.set(cx + 1, y, cont);
                cx += 2;
            } else {
                if cx >= self.width {
                    break;
                }
                self.set(cx, y, Cell::from_char(ch, fg, bg));
                cx += 1;
            }
        }
        cx
    }

    fn fill_row(&mut self, y: usize, x0: usize, x1: usize, bg: Color) {
        for x in x0..x1.min(self.width) {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const TITLE: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const OK_GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const WRONG_RED: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const TRAIL_BG: Color = Color::Rgb { r: 40, g: 50, b: 80 };
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };
const ACTIVE_BG: Color = Color::Rgb { r: 60, g: 60, b: 20 };
const DIM: Color = Color::DarkGrey;

// ── Layout ──

/// Each grid cell is two terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const DESC_ROW: usize = 1;
const MAP_ROW: usize = 3;
const MAP_COL: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

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

    pub fn render(&mut self, app: &AppState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(app.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(app.phase);
        }

        self.compose(app);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    fn compose(&mut self, app: &AppState) {
        self.front.clear();
        match app.phase {
            Phase::LevelSelect => self.compose_level_select(app),
            Phase::Playing => {
                self.compose_game(app);
                if app.is_cleared() && !app.anims.is_animating() {
                    self.compose_clear_overlay(app);
                }
            }
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Do NOT use ResetColor here: the terminal default may differ from
        // BASE_BG and leave line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev {
                        need_move = true;
                    }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: game screen ──

    fn compose_game(&mut self, app: &AppState) {
        let w = app.session.world();
        let buf_w = self.front.width;

        // HUD
        let level_name = app.session.level().map_or("-", |l| l.name.as_str());
        let hud = format!(
            " かなグリッド  {}  てかず:{}  [{}] ",
            level_name,
            app.session.move_count(),
            app.difficulty.label(),
        );
        self.front.fill_row(HUD_ROW, 0, buf_w, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
        if let Some(level) = app.session.level() {
            self.front.put_str(1, DESC_ROW, &level.description, TITLE, Color::Reset);
        }

        self.compose_grid(app, w);

        let grid_cols = w.grid_size.max(0) as usize * CELL_W;
        let palette_col = MAP_COL + grid_cols + 4;
        self.compose_palette(app, palette_col, MAP_ROW);

        let below = MAP_ROW + w.grid_size.max(0) as usize + 3;
        self.compose_typing(app, below);

        let msg_row = below + 5;
        if !app.message.is_empty() {
            self.front.put_str(2, msg_row, &app.message, WRONG_RED, Color::Reset);
        }
        self.compose_help(app, msg_row + 2);
    }

    /// Key help. The undo/redo hints light up only when there is
    /// something to undo or redo.
    fn compose_help(&mut self, app: &AppState, row: usize) {
        let hints = [
            (" 1-6/↑↓+Enter: えらぶ", true),
            ("Esc: やめる", true),
            ("F2: リセット", true),
            ("F3: もどす", app.session.can_undo()),
            ("F4: やりなおす", app.session.can_redo()),
            ("F5: ステージ", true),
            ("F6: むずかしさ", true),
            ("Ctrl+C: おわる", true),
        ];
        let mut x = 0;
        for (text, enabled) in hints {
            let fg = if enabled { Color::Grey } else { DIM };
            x = self.front.put_str(x, row, text, fg, Color::Reset) + 2;
        }
    }

    fn compose_grid(&mut self, app: &AppState, w: &WorldState) {
        let size = w.grid_size.max(0) as usize;
        let border = Color::Rgb { r: 90, g: 90, b: 120 };
        let inner = size * CELL_W;

        // frame
        let top = format!("┌{}┐", "─".repeat(inner));
        let bottom = format!("└{}┘", "─".repeat(inner));
        self.front.put_str(MAP_COL - 1, MAP_ROW - 1, &top, border, Color::Reset);
        self.front.put_str(MAP_COL - 1, MAP_ROW + size, &bottom, border, Color::Reset);
        for gy in 0..size {
            self.front.put_str(MAP_COL - 1, MAP_ROW + gy, "│", border, Color::Reset);
            self.front.put_str(MAP_COL + inner, MAP_ROW + gy, "│", border, Color::Reset);
        }

        for gy in 0..size {
            for gx in 0..size {
                let pos = Position::new(gx as i32, gy as i32);
                let bg = if w.trail.contains(&pos) { TRAIL_BG } else { Color::Reset };
                let (glyph, fg) = tile_glyph(w, pos);
                self.front.put_str(MAP_COL + gx * CELL_W, MAP_ROW + gy, &glyph, fg, bg);
            }
        }

        // character: interpolated while animating, else the live pose
        let (fx, fy, facing) = match app.anim_frame {
            Some(frame) => {
                let (x, y) = frame.position();
                (x, y, Direction::nearest(frame.angle()))
            }
            None => {
                let c = w.character;
                (c.pos.x as f64, c.pos.y as f64, c.direction)
            }
        };
        let col = MAP_COL + (fx * CELL_W as f64).round().max(0.0) as usize;
        let row = MAP_ROW + fy.round().max(0.0) as usize;
        let arrow = match facing {
            Direction::Up => "^ ",
            Direction::Down => "v ",
            Direction::Left => "< ",
            Direction::Right => "> ",
        };
        let bg = Color::Rgb { r: 0, g: 120, b: 160 };
        self.front.put_str(col, row, arrow, Color::White, bg);
    }

    fn compose_palette(&mut self, app: &AppState, col: usize, top: usize) {
        self.front.put_str(col, top, "コマンド", TITLE, Color::Reset);
        let suggested = app.session.suggested_next();
        let busy = app.is_busy() || app.is_cleared();
        let active = app.typing.as_ref().map(|t| t.command.action);

        for (i, cmd) in COMMANDS.iter().enumerate() {
            let row = top + 2 + i;
            let state = app.availability(cmd);
            let is_cursor = i == app.palette_cursor;
            let is_active = active == Some(cmd.action);

            let bg = if is_active {
                ACTIVE_BG
            } else if is_cursor && !busy {
                CURSOR_BG
            } else {
                Color::Reset
            };
            self.front.fill_row(row, col, col + 46, bg);

            let marker = if is_cursor { ">" } else { " " };
            self.front.put_str(col, row, marker, OK_GREEN, bg);
            self.front.put_str(col + 1, row, &format!("{}", i + 1), DIM, bg);

            if state == Availability::Hidden {
                self.front.put_str(col + 3, row, "？？？", DIM, bg);
                continue;
            }
            let fg = match state {
                Availability::Enabled if !busy => Color::White,
                _ => DIM,
            };
            if suggested == Some(cmd.action) {
                self.front.put_str(col + 2, row, "*", TITLE, bg);
            }
            let end = self.front.put_str(col + 3, row, cmd.label, fg, bg);
            self.front.put_str(end.max(col + 14), row, cmd.kana, fg, bg);
            if app.show_guide {
                self.front.put_str(col + 30, row, &cmd.romaji(), DIM, bg);
            }
        }
    }

    fn compose_typing(&mut self, app: &AppState, top: usize) {
        let Some(panel) = app.typing.as_ref() else {
            if !app.is_cleared() {
                self.front.put_str(2, top, "← コマンドをえらんでね", DIM, Color::Reset);
            }
            return;
        };

        self.front.put_str(2, top, panel.command.kana, Color::White, Color::Reset);

        let m = &panel.matcher;
        if app.show_guide {
            let done = m.guide_position();
            for (i, ch) in m.guide().chars().enumerate() {
                let (fg, bg) = if i < done {
                    (OK_GREEN, Color::Reset)
                } else if i == done {
                    (Color::Black, TITLE)
                } else {
                    (DIM, Color::Reset)
                };
                self.front.set(2 + i, top + 1, Cell::from_char(ch, fg, bg));
            }
        }

        let typed: String = m.current_buffer().iter().collect();
        let input = format!("にゅうりょく: {typed}_");
        self.front.put_str(2, top + 2, &input, Color::White, Color::Reset);

        if panel.is_confirming() {
            self.front.put_str(2, top + 3, "OK！", OK_GREEN, Color::Reset);
        } else if panel.feedback == Feedback::Wrong {
            self.front.put_str(2, top + 3, "ちがうよ！もういちど", WRONG_RED, Color::Reset);
        }
    }

    fn compose_clear_overlay(&mut self, app: &AppState) {
        let name = app.session.level().map_or("", |l| l.name.as_str());
        let lines = [
            "クリア！".to_string(),
            format!("{name}をクリアしたよ！"),
            format!("{}てでクリア", app.session.move_count()),
            String::new(),
            if app.has_next_level() {
                "Enter/N: つぎのステージへ   F2: もういちど".to_string()
            } else {
                "Enter: ステージをえらぶ   F2: もういちど".to_string()
            },
        ];
        let inner = lines.iter().map(|l| text_width(l)).max().unwrap_or(0) + 4;
        let left = MAP_COL + 2;
        let top = MAP_ROW + 1;
        let bg = Color::Rgb { r: 40, g: 40, b: 10 };

        for (i, line) in lines.iter().enumerate() {
            let row = top + 1 + i;
            self.front.fill_row(row, left, left + inner, bg);
            let fg = if i == 0 { TITLE } else { Color::White };
            self.front.put_str(left + 2, row, line, fg, bg);
        }
        self.front.fill_row(top, left, left + inner, bg);
        self.front.fill_row(top + lines.len() + 1, left, left + inner, bg);
    }

    // ── Compose: level select ──

    fn compose_level_select(&mut self, app: &AppState) {
        self.front.put_str(2, 1, "ステージをえらんでね", TITLE, Color::Reset);

        let list_top = 3;
        for (i, level) in app.levels.iter().enumerate() {
            let row = list_top + i * 2;
            if row + 1 >= self.front.height {
                break;
            }
            let selected = i == app.select_cursor;
            let bg = if selected { CURSOR_BG } else { Color::Reset };
            if selected {
                self.front.fill_row(row, 2, 60, bg);
                self.front.put_str(2, row, ">", OK_GREEN, bg);
            }
            let fg = if selected { OK_GREEN } else { Color::White };
            let label = format!("{:>2}. {}", i + 1, level.name);
            self.front.put_str(4, row, &label, fg, bg);
            self.front.put_str(8, row + 1, &level.description, DIM, Color::Reset);
        }

        let footer = list_top + app.levels.len() * 2 + 1;
        let help = if app.session.level().is_some() {
            " ↑↓: えらぶ   Enter: スタート   Esc: とじる   Q: おわる"
        } else {
            " ↑↓: えらぶ   Enter: スタート   Q: おわる"
        };
        self.front.put_str(2, footer, help, DIM, Color::Reset);
    }
}

/// Two-column glyph for a grid cell, ignoring the character. Items show
/// the first character of their label.
fn tile_glyph(w: &WorldState, pos: Position) -> (String, Color) {
    let (glyph, fg) = match w.tile_at(pos) {
        Tile::Empty => (". ", DIM),
        Tile::Wall | Tile::Obstacle => ("##", Color::Grey),
        Tile::Goal => ("<>", TITLE),
        Tile::Item => {
            let first = w.item_at(pos).and_then(|i| i.label.chars().next());
            let glyph = match first {
                Some(c) if is_wide(c) => c.to_string(),
                Some(c) => format!("{c} "),
                None => "* ".to_string(),
            };
            return (glyph, TITLE);
        }
        Tile::Door(DoorState::Locked) => ("][", WRONG_RED),
        Tile::Door(DoorState::Unlocked) => ("][", TITLE),
        Tile::Door(DoorState::Open) => ("[]", OK_GREEN),
    };
    (glyph.to_string(), fg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::level::embedded_levels;

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width)
            .map(|x| buf.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.as_str().to_string())
            .collect()
    }

    #[test]
    fn widths() {
        assert!(is_wide('ま'));
        assert!(is_wide('前'));
        assert!(is_wide('！'));
        assert!(!is_wide('m'));
        assert_eq!(text_width("ab"), 2);
        assert_eq!(text_width("まえ1"), 5);
    }

    #[test]
    fn wide_text_uses_continuation_cells() {
        let mut buf = FrameBuffer::new(10, 1);
        let end = buf.put_str(0, 0, "かa", Color::White, Color::Reset);
        assert_eq!(end, 3);
        assert!(buf.get(0, 0).wide);
        assert!(buf.get(1, 0).cont);
        assert_eq!(buf.get(2, 0).as_str(), "a");
    }

    #[test]
    fn wide_char_at_edge_is_dropped() {
        let mut buf = FrameBuffer::new(2, 1);
        let end = buf.put_str(0, 0, "aか", Color::White, Color::Reset);
        assert_eq!(end, 1);
        assert_eq!(buf.get(1, 0), Cell::BLANK);

        // か fits in columns 1-2; き has no room left
        let mut buf = FrameBuffer::new(3, 1);
        let end = buf.put_str(0, 0, "aかき", Color::White, Color::Reset);
        assert_eq!(end, 3);
        assert_eq!(buf.get(1, 0).as_str(), "か");
        assert!(buf.get(2, 0).cont);
        assert!((0..3).all(|x| buf.get(x, 0).as_str() != "き"));
    }

    #[test]
    fn items_show_their_own_label() {
        let mut levels = embedded_levels();
        levels[6].items[0].label = "ほし".into();
        let mut app = AppState::new(&GameConfig::default(), levels);
        app.start_level(6);
        let mut r = renderer(140, 30);
        r.compose(&app);

        // stage 7: the item lies at (3,4)
        let cell = r.front.get(MAP_COL + 3 * CELL_W, MAP_ROW + 4);
        assert_eq!(cell.as_str(), "ほ");
        assert!(cell.wide);
        assert!(row_text(&r.front, MAP_ROW + 4).contains('ほ'));
    }

    #[test]
    fn ascii_item_label_pads_to_two_columns() {
        let mut levels = embedded_levels();
        levels[6].items[0].label = "key".into();
        let mut app = AppState::new(&GameConfig::default(), levels);
        app.start_level(6);
        let (glyph, _) = tile_glyph(app.session.world(), Position::new(3, 4));
        assert_eq!(glyph, "k ");
    }

    #[test]
    fn undo_hint_lit_only_with_history() {
        let mut app = AppState::new(&GameConfig::default(), embedded_levels());
        app.start_level(0);
        let mut r = renderer(160, 30);
        r.compose_help(&app, 0);
        let undo_col = (0..r.front.width)
            .find(|&x| r.front.get(x, 0).as_str() == "F" && r.front.get(x + 1, 0).as_str() == "3")
            .unwrap();
        assert_eq!(r.front.get(undo_col + 4, 0).fg, DIM);
        assert_eq!(r.front.get(0, 0).fg, Color::Grey);
        assert_eq!(r.front.get(undo_col, 0).fg, DIM);

        assert!(app.session.execute_action(crate::domain::action::ActionKind::MoveForward));
        r.front.clear();
        r.compose_help(&app, 0);
        assert_eq!(r.front.get(undo_col, 0).fg, Color::Grey);
    }

    #[test]
    fn game_screen_shows_character_and_goal() {
        let mut app = AppState::new(&GameConfig::default(), embedded_levels());
        app.start_level(0);
        let mut r = renderer(140, 30);
        r.compose(&app);

        // stage 1: character at (0,4) facing right, goal at (4,4)
        let row = row_text(&r.front, MAP_ROW + 4);
        assert!(row.contains("> "));
        assert!(row.contains("<>"));
        assert!(row_text(&r.front, HUD_ROW).contains("てかず:0"));
        assert!(row_text(&r.front, MAP_ROW).contains("コマンド"));
    }

    #[test]
    fn level_select_lists_levels() {
        let app = AppState::new(&GameConfig::default(), embedded_levels());
        let mut r = renderer(80, 30);
        r.compose(&app);
        assert!(row_text(&r.front, 3).contains("ステージ 1"));
    }
}
